use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use serde::Deserialize;

use claimgate_auth::{AuthTicket, Principal, PrincipalId};

use crate::app::AppState;
use crate::app::directory;
use crate::app::errors::{authz_error_to_response, json_error};
use crate::context::PrincipalContext;
use crate::middleware::{LOGIN_PATH, login_url, redirect_to_login};
use crate::session::{self, AUTH_COOKIE};

#[derive(Debug, Deserialize)]
pub struct ReturnTo {
    pub return_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginCredential {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub password: String,
    /// HTML checkboxes post `on`; absent means unchecked.
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginCredential {
    fn remember_me(&self) -> bool {
        self.remember_me
            .as_deref()
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    }
}

pub async fn login_form(Query(q): Query<ReturnTo>) -> Html<String> {
    render_login(q.return_url.as_deref(), None)
}

pub async fn login(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(q): Query<ReturnTo>,
    Form(credential): Form<LoginCredential>,
) -> Response {
    let return_url = q.return_url.as_deref();

    if credential.user_name.trim().is_empty() || credential.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            render_login(return_url, Some("User name and password are required.")),
        )
            .into_response();
    }

    let now = Utc::now();
    let Some(claims) = directory::authenticate(&credential.user_name, &credential.password, now.date_naive())
    else {
        tracing::info!(user_name = %credential.user_name, "sign-in rejected");
        return (
            StatusCode::UNAUTHORIZED,
            render_login(return_url, Some("Invalid user name or password.")),
        )
            .into_response();
    };

    let principal = Principal::new(PrincipalId::new(), claims);
    let ticket = AuthTicket::issue(
        &principal,
        AUTH_COOKIE,
        now,
        state.session.ttl,
        credential.remember_me(),
    );

    let jar = match session::write_ticket(jar, &state.session, &ticket) {
        Ok(jar) => jar,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue auth cookie");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", e.to_string());
        }
    };

    tracing::info!(principal_id = %principal.id(), user_name = %credential.user_name, "signed in");
    (jar, Redirect::to(safe_return_url(return_url))).into_response()
}

pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (session::clear_ticket(jar), Redirect::to("/"))
}

pub async fn access_denied() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::FORBIDDEN,
        Html("<h1>Access denied</h1><p>You do not have access to this resource.</p>"),
    )
}

pub async fn whoami(principal: Option<Extension<PrincipalContext>>, uri: axum::http::Uri) -> Response {
    let Some(Extension(ctx)) = principal else {
        return redirect_to_login(&uri);
    };
    Json(serde_json::json!({
        "principal_id": ctx.principal().id().to_string(),
        "scheme": ctx.scheme(),
        "expires_at": ctx.expires_at(),
        "claims": ctx.principal().claims(),
    }))
    .into_response()
}

/// Per-requirement explanation of `name` for the signed-in principal.
pub async fn explain_policy(
    State(state): State<AppState>,
    principal: Option<Extension<PrincipalContext>>,
    Path(name): Path<String>,
    uri: axum::http::Uri,
) -> Response {
    let Some(Extension(ctx)) = principal else {
        return redirect_to_login(&uri);
    };
    match state.evaluator.explain(ctx.principal(), &name, Utc::now()) {
        Ok(explanation) => Json(explanation).into_response(),
        Err(err) => authz_error_to_response(err),
    }
}

/// Only local absolute paths that are valid `Location` values are followed
/// after sign-in.
fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.contains('\\')
                && HeaderValue::from_str(url).is_ok() =>
        {
            url
        }
        _ => "/",
    }
}

fn render_login(return_url: Option<&str>, error: Option<&str>) -> Html<String> {
    // Percent-encoded, so the attribute never holds quotes or angle brackets.
    let action = match return_url {
        Some(url) => login_url(safe_return_url(Some(url))),
        None => LOGIN_PATH.to_string(),
    };
    let error = error
        .map(|e| format!(r#"<p class="error">{e}</p>"#))
        .unwrap_or_default();
    Html(format!(
        r#"<h1>Sign in</h1>{error}
<form method="post" action="{action}">
  <label>User Name <input name="user_name" required></label>
  <label>Password <input name="password" type="password" required></label>
  <label><input name="remember_me" type="checkbox" value="true"> Remember me</label>
  <button type="submit">Sign in</button>
</form>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_url_must_be_local() {
        assert_eq!(safe_return_url(Some("/settings")), "/settings");
        assert_eq!(safe_return_url(Some("https://evil.example")), "/");
        assert_eq!(safe_return_url(Some("//evil.example")), "/");
        assert_eq!(safe_return_url(Some("/\\evil.example")), "/");
        assert_eq!(safe_return_url(None), "/");
    }

    #[test]
    fn return_url_with_control_characters_falls_back_to_root() {
        assert_eq!(safe_return_url(Some("/x\ny")), "/");
        assert_eq!(safe_return_url(Some("/x\r\nSet-Cookie: a=b")), "/");
        assert_eq!(safe_return_url(Some("/caf\u{e9}")), "/");
    }

    #[test]
    fn login_form_encodes_return_url() {
        let Html(body) = render_login(Some("/\"><script>alert(1)</script>"), None);
        assert!(!body.contains("<script>"));
        assert!(!body.contains("\"><"));
        assert!(body.contains(r#"action="/account/login?return_url=%2F%22%3E%3Cscript%3E"#));
    }

    #[test]
    fn remember_me_follows_checkbox() {
        let mut c = LoginCredential {
            user_name: "admin".into(),
            password: "password".into(),
            remember_me: None,
        };
        assert!(!c.remember_me());
        c.remember_me = Some("on".into());
        assert!(c.remember_me());
        c.remember_me = Some("false".into());
        assert!(!c.remember_me());
    }
}
