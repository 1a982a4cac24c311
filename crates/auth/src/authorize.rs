use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::handler::{HandlerRegistry, Outcome};
use crate::policy::{Policy, PolicyRegistry};
use crate::principal::Principal;
use crate::requirement::Requirement;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The requested policy was never registered. Callers must deny.
    #[error("policy '{0}' is not registered")]
    PolicyNotFound(String),

    /// A claim a handler depends on could not be interpreted.
    ///
    /// Distinct from a denial: the principal's data is corrupt, not merely
    /// insufficient.
    #[error("malformed claim '{claim_type}' = '{value}': {reason}")]
    MalformedClaim {
        claim_type: String,
        value: String,
        reason: String,
    },
}

/// Final decision for one policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Authorized,
    /// Requirements no handler succeeded, in policy order.
    Forbidden { unsatisfied: Vec<Requirement> },
}

impl Verdict {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Verdict::Authorized)
    }

    pub fn unsatisfied(&self) -> &[Requirement] {
        match self {
            Verdict::Authorized => &[],
            Verdict::Forbidden { unsatisfied } => unsatisfied,
        }
    }
}

/// Per-requirement result, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementCheck {
    pub requirement: Requirement,
    pub satisfied: bool,
    /// Number of handlers registered for the requirement's kind.
    pub handlers_consulted: usize,
}

/// Detailed explanation of a policy evaluation.
///
/// Answers "which requirements held and which did not" for a principal; the
/// verdict is derived from it and never diverges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationExplanation {
    pub policy: String,
    pub granted: bool,
    pub requirements: Vec<RequirementCheck>,
}

impl AuthorizationExplanation {
    pub fn verdict(&self) -> Verdict {
        if self.granted {
            return Verdict::Authorized;
        }
        Verdict::Forbidden {
            unsatisfied: self
                .requirements
                .iter()
                .filter(|c| !c.satisfied)
                .map(|c| c.requirement.clone())
                .collect(),
        }
    }
}

/// Evaluates named policies against principals.
///
/// Holds only read-only state; clones share the same registries and may be
/// used from any number of request tasks at once.
///
/// - No IO
/// - No panics
/// - No clock reads (`now` is always supplied by the caller)
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    policies: Arc<PolicyRegistry>,
    handlers: HandlerRegistry,
}

impl PolicyEvaluator {
    /// Evaluator over `policies` using the built-in handlers.
    pub fn new(policies: PolicyRegistry) -> Self {
        Self::with_handlers(policies, HandlerRegistry::with_builtin_handlers())
    }

    pub fn with_handlers(policies: PolicyRegistry, handlers: HandlerRegistry) -> Self {
        Self {
            policies: Arc::new(policies),
            handlers,
        }
    }

    pub fn policies(&self) -> &PolicyRegistry {
        &self.policies
    }

    /// Decide whether `principal` satisfies the policy named `policy_name`.
    ///
    /// A failed requirement yields `Ok(Verdict::Forbidden)`; `Err` is reserved
    /// for unknown policies and malformed claims.
    pub fn authorize(
        &self,
        principal: &Principal,
        policy_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Verdict, AuthzError> {
        let explanation = self.explain(principal, policy_name, now)?;
        let verdict = explanation.verdict();

        tracing::info!(
            principal_id = %principal.id(),
            policy = policy_name,
            authorized = verdict.is_authorized(),
            unsatisfied = verdict.unsatisfied().len(),
            "policy evaluated"
        );

        Ok(verdict)
    }

    /// Evaluate every requirement of the policy and report each result.
    pub fn explain(
        &self,
        principal: &Principal,
        policy_name: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthorizationExplanation, AuthzError> {
        let policy = self.resolve(policy_name)?;

        // Every requirement is checked even after a malformed claim; the first
        // error in policy order is the one returned.
        let mut requirements = Vec::with_capacity(policy.requirements().len());
        let mut first_error = None;
        for requirement in policy.requirements() {
            match self.check(principal, requirement, now) {
                Ok(check) => requirements.push(check),
                Err(err) => {
                    tracing::debug!(%requirement, error = %err, "requirement could not be evaluated");
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        Ok(AuthorizationExplanation {
            policy: policy.name().to_string(),
            granted: requirements.iter().all(|c| c.satisfied),
            requirements,
        })
    }

    fn resolve(&self, policy_name: &str) -> Result<&Policy, AuthzError> {
        self.policies
            .get(policy_name)
            .ok_or_else(|| AuthzError::PolicyNotFound(policy_name.to_string()))
    }

    fn check(
        &self,
        principal: &Principal,
        requirement: &Requirement,
        now: DateTime<Utc>,
    ) -> Result<RequirementCheck, AuthzError> {
        let handlers = self.handlers.handlers_for(requirement.kind());
        if handlers.is_empty() {
            tracing::warn!(kind = %requirement.kind(), "no handler registered for requirement kind");
        }

        // Every handler runs, even after a success, so a malformed claim is
        // reported regardless of what other handlers decided.
        let mut satisfied = false;
        for handler in handlers {
            if handler.evaluate(principal, requirement, now)? == Outcome::Success {
                satisfied = true;
            }
        }

        tracing::debug!(%requirement, satisfied, "requirement evaluated");

        Ok(RequirementCheck {
            requirement: requirement.clone(),
            satisfied,
            handlers_consulted: handlers.len(),
        })
    }
}
