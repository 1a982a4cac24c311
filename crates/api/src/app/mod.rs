//! HTTP application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `directory.rs`: the fixed demo user directory
//! - `errors.rs`: consistent error responses

use axum::{Router, extract::FromRef};
use axum_extra::extract::cookie::Key;
use tower::ServiceBuilder;

use claimgate_auth::PolicyEvaluator;

use crate::config::AppConfig;
use crate::middleware;
use crate::session::SessionSettings;

pub mod directory;
pub mod errors;
pub mod routes;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: PolicyEvaluator,
    pub cookie_key: Key,
    pub session: SessionSettings,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let policies = config.policy_registry()?;
        tracing::info!(policies = ?policies.names(), "policy registry built");

        Ok(Self {
            evaluator: PolicyEvaluator::new(policies),
            cookie_key: config.cookie_key.clone(),
            session: SessionSettings {
                ttl: config.session_ttl,
                secure: config.secure_cookies,
            },
        })
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(config)?;
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    routes::router(&state)
        .layer(
            ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::authenticate,
            )),
        )
        .with_state(state)
}
