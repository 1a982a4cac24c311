//! Cookie transport for [`AuthTicket`]s.
//!
//! The ticket is serialized to JSON and stored in an encrypted, authenticated
//! private cookie; tampered or foreign cookies simply fail to decrypt.

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use claimgate_auth::{AuthTicket, validate_ticket};

/// Cookie name and authentication scheme of the demo.
pub const AUTH_COOKIE: &str = "ClaimGateAuth";

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub secure: bool,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to encode ticket: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What the auth cookie held on an incoming request.
#[derive(Debug)]
pub enum TicketRead {
    Missing,
    Valid(AuthTicket),
    /// Undecodable payload or an invalid time window.
    Rejected(String),
}

pub fn read_ticket(jar: &PrivateCookieJar, now: DateTime<Utc>) -> TicketRead {
    let Some(cookie) = jar.get(AUTH_COOKIE) else {
        return TicketRead::Missing;
    };
    let ticket: AuthTicket = match serde_json::from_str(cookie.value()) {
        Ok(ticket) => ticket,
        Err(e) => return TicketRead::Rejected(format!("undecodable ticket: {e}")),
    };
    match validate_ticket(&ticket, now) {
        Ok(()) => TicketRead::Valid(ticket),
        Err(e) => TicketRead::Rejected(e.to_string()),
    }
}

/// Store `ticket` in the jar. Persistent tickets outlive the browser session.
pub fn write_ticket(
    jar: PrivateCookieJar,
    settings: &SessionSettings,
    ticket: &AuthTicket,
) -> Result<PrivateCookieJar, SessionError> {
    let payload = serde_json::to_string(ticket)?;
    let mut cookie = Cookie::build((AUTH_COOKIE, payload))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if ticket.persistent {
        cookie = cookie.max_age(time::Duration::seconds(ticket.lifetime().num_seconds()));
    }
    Ok(jar.add(cookie))
}

pub fn clear_ticket(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build((AUTH_COOKIE, "")).path("/"))
}
