use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::context::CallerContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(caller): Extension<CallerContext>) -> impl IntoResponse {
    let principal = caller.principal();
    Json(serde_json::json!({
        "principal_id": caller.principal_id().map(|id| id.to_string()),
        "username": principal.and_then(|p| p.username.clone()),
        "role": principal.map(|p| p.role.kind.as_str().to_string()),
        "public": caller.is_public(),
    }))
}
