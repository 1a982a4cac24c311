//! API-side policy gate.
//!
//! Maps evaluator results onto what a guarded route should do, keeping the
//! auth crate HTTP-agnostic.

use chrono::{DateTime, Utc};

use claimgate_auth::{AuthzError, PolicyEvaluator, Principal};

/// What the gate does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Denied; the principal did not satisfy the policy or its claims were
    /// unusable.
    Deny,
    /// The route names a policy that does not exist.
    UnknownPolicy(String),
}

/// Check `policy` for `principal` before serving a guarded resource.
///
/// Malformed claims deny access like any other failure, but are logged as a
/// data-integrity problem so they are not mistaken for ordinary denials.
pub fn authorize_request(
    evaluator: &PolicyEvaluator,
    principal: &Principal,
    policy: &str,
    now: DateTime<Utc>,
) -> GateDecision {
    match evaluator.authorize(principal, policy, now) {
        Ok(verdict) if verdict.is_authorized() => GateDecision::Allow,
        Ok(_) => GateDecision::Deny,
        Err(err @ AuthzError::MalformedClaim { .. }) => {
            tracing::warn!(
                principal_id = %principal.id(),
                policy,
                error = %err,
                "denying access: malformed claim"
            );
            GateDecision::Deny
        }
        Err(AuthzError::PolicyNotFound(name)) => {
            tracing::error!(policy = %name, "guarded route references unknown policy");
            GateDecision::UnknownPolicy(name)
        }
    }
}
