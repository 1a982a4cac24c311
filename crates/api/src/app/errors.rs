use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use claimgate_auth::AuthzError;

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::PolicyNotFound(name) => json_error(
            StatusCode::NOT_FOUND,
            "policy_not_found",
            format!("policy '{name}' is not registered"),
        ),
        err @ AuthzError::MalformedClaim { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "malformed_claim", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
