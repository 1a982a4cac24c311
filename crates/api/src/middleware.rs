use axum::{
    extract::{Request, State},
    http::{Uri, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;

use crate::app::AppState;
use crate::app::errors::json_error;
use crate::authz::{GateDecision, authorize_request};
use crate::context::PrincipalContext;
use crate::session::{self, AUTH_COOKIE, TicketRead};

pub const LOGIN_PATH: &str = "/account/login";
pub const ACCESS_DENIED_PATH: &str = "/account/access-denied";

/// Resolve the auth cookie into a [`PrincipalContext`] request extension.
///
/// Rejected cookies are cleared; tickets past half their lifetime are
/// reissued (sliding expiration). Handlers that set the auth cookie
/// themselves (login/logout) take precedence.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let now = Utc::now();

    let jar = match session::read_ticket(&jar, now) {
        TicketRead::Missing => jar,
        TicketRead::Rejected(reason) => {
            tracing::debug!(%reason, "discarding auth cookie");
            session::clear_ticket(jar)
        }
        TicketRead::Valid(ticket) => {
            req.extensions_mut().insert(PrincipalContext::from_ticket(&ticket));
            if ticket.should_renew(now) {
                let renewed = ticket.renewed(now);
                match session::write_ticket(jar.clone(), &state.session, &renewed) {
                    Ok(jar) => jar,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to renew auth ticket");
                        jar
                    }
                }
            } else {
                jar
            }
        }
    };

    let response = next.run(req).await;
    if sets_auth_cookie(&response) {
        return response;
    }
    (jar, response).into_response()
}

fn sets_auth_cookie(response: &Response) -> bool {
    let prefix = format!("{AUTH_COOKIE}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().is_ok_and(|s| s.starts_with(&prefix)))
}

/// State for [`require_policy`]: the app plus the policy guarding the route.
#[derive(Clone)]
pub struct PolicyGuard {
    pub app: AppState,
    pub policy: &'static str,
}

/// Gate a route behind a named policy.
///
/// Anonymous → login redirect; forbidden → access-denied redirect; unknown
/// policy → 500, never served.
pub async fn require_policy(State(guard): State<PolicyGuard>, req: Request, next: Next) -> Response {
    let Some(ctx) = req.extensions().get::<PrincipalContext>().cloned() else {
        return redirect_to_login(req.uri());
    };

    match authorize_request(&guard.app.evaluator, ctx.principal(), guard.policy, Utc::now()) {
        GateDecision::Allow => next.run(req).await,
        GateDecision::Deny => Redirect::to(ACCESS_DENIED_PATH).into_response(),
        GateDecision::UnknownPolicy(name) => json_error(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "policy_not_found",
            format!("policy '{name}' is not registered"),
        ),
    }
}

pub fn redirect_to_login(original: &Uri) -> Response {
    Redirect::to(&login_url(original.path())).into_response()
}

/// Login path carrying `return_url` as a percent-encoded query parameter.
pub fn login_url(return_url: &str) -> String {
    match serde_urlencoded::to_string(&[("return_url", return_url)]) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_percent_encodes_return_path() {
        assert_eq!(login_url("/settings"), "/account/login?return_url=%2Fsettings");
        assert_eq!(
            login_url("/a b\"<c>"),
            "/account/login?return_url=%2Fa+b%22%3Cc%3E"
        );
    }

    #[test]
    fn redirect_to_login_keeps_only_the_path() {
        let uri: Uri = "/hr-manager?tab=1".parse().unwrap();
        let res = redirect_to_login(&uri);
        assert_eq!(res.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()["location"],
            "/account/login?return_url=%2Fhr-manager"
        );
    }
}
