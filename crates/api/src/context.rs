use chrono::{DateTime, Utc};

use claimgate_auth::{AuthTicket, Principal};

/// Authenticated principal for a request, derived from a valid ticket.
///
/// Inserted into request extensions by the authentication middleware; absent
/// for anonymous requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
    scheme: String,
    expires_at: DateTime<Utc>,
}

impl PrincipalContext {
    pub fn from_ticket(ticket: &AuthTicket) -> Self {
        Self {
            principal: ticket.principal(),
            scheme: ticket.scheme.clone(),
            expires_at: ticket.expires_at,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Display name for pages; falls back to the principal id.
    pub fn display_name(&self) -> String {
        self.principal
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| self.principal.id().to_string())
    }
}
