use axum::{
    Router,
    routing::{MethodRouter, get, post},
};

use claimgate_auth::policy::{ADMIN_ONLY, HR_MANAGER_ONLY, MUST_BELONG_TO_HR_DEPARTMENT};

use crate::app::AppState;
use crate::middleware::{PolicyGuard, require_policy};

pub mod account;
pub mod pages;
pub mod system;

/// Router for every endpoint; authentication is layered on by the caller.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(system::health))
        .route("/account/login", get(account::login_form).post(account::login))
        .route("/account/logout", post(account::logout))
        .route("/account/access-denied", get(account::access_denied))
        .route("/account/whoami", get(account::whoami))
        .route("/account/policies/:name", get(account::explain_policy))
        .route("/settings", guarded(state, ADMIN_ONLY, get(pages::settings)))
        .route(
            "/human-resource",
            guarded(state, MUST_BELONG_TO_HR_DEPARTMENT, get(pages::human_resource)),
        )
        .route("/hr-manager", guarded(state, HR_MANAGER_ONLY, get(pages::hr_manager)))
}

fn guarded(
    state: &AppState,
    policy: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let guard = PolicyGuard {
        app: state.clone(),
        policy,
    };
    route.layer(axum::middleware::from_fn_with_state(guard, require_policy))
}
