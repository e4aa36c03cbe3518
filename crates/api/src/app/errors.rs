use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use scopegate_auth::VerifyError;

pub fn verify_error_to_response(err: &VerifyError) -> axum::response::Response {
    match err {
        VerifyError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "authentication required")
        }
        // Missing actions stay in the logs, not in the response body.
        VerifyError::Forbidden { .. } => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "insufficient scope")
        }
        VerifyError::Hook(rejection) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", rejection.to_string())
        }
        VerifyError::Store(e) => {
            tracing::error!(error = %e, "permission lookup failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "permission store unavailable",
            )
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
