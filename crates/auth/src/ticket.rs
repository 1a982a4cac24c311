use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ClaimSet, Principal, PrincipalId};

/// Authentication ticket (transport-agnostic).
///
/// This is what the session cookie carries once decrypted: who signed in,
/// with which claims, and for how long the sign-in is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTicket {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Authentication scheme that issued the ticket.
    pub scheme: String,

    /// Claims captured at sign-in.
    pub claims: ClaimSet,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,

    /// Whether the client was asked to keep the cookie across browser sessions.
    #[serde(default)]
    pub persistent: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    #[error("ticket has expired")]
    Expired,

    #[error("ticket not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid ticket time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl AuthTicket {
    pub fn issue(
        principal: &Principal,
        scheme: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
        persistent: bool,
    ) -> Self {
        Self {
            sub: principal.id(),
            scheme: scheme.into(),
            claims: principal.claims().clone(),
            issued_at: now,
            expires_at: now + lifetime,
            persistent,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.claims.clone())
    }

    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    /// Sliding expiration: renew once more than half the lifetime has passed.
    pub fn should_renew(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > self.lifetime() / 2
    }

    /// Same sign-in, fresh validity window of the original length.
    pub fn renewed(&self, now: DateTime<Utc>) -> Self {
        let lifetime = self.lifetime();
        Self {
            issued_at: now,
            expires_at: now + lifetime,
            ..self.clone()
        }
    }
}

/// Deterministically validate a ticket's time window.
///
/// Note: this validates the *window* only. Integrity of the ticket is the
/// cookie layer's job.
pub fn validate_ticket(ticket: &AuthTicket, now: DateTime<Utc>) -> Result<(), TicketValidationError> {
    if ticket.expires_at <= ticket.issued_at {
        return Err(TicketValidationError::InvalidTimeWindow);
    }
    if now < ticket.issued_at {
        return Err(TicketValidationError::NotYetValid);
    }
    if now >= ticket.expires_at {
        return Err(TicketValidationError::Expired);
    }
    Ok(())
}
