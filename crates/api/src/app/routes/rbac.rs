//! Authorization audit endpoint: "why would this scope be denied for me?"

use axum::{
    Extension, Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use scopegate_auth::AccessConfig;

use crate::app::errors;
use crate::context::CallerContext;
use crate::middleware::GateState;

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    /// Comma-separated actions; absent means "unscoped".
    pub scope: Option<String>,
}

impl ExplainQuery {
    fn access(&self) -> Result<AccessConfig, scopegate_auth::InvalidAction> {
        match self.scope.as_deref() {
            None => Ok(AccessConfig::unscoped()),
            Some(raw) => AccessConfig::parse_scope(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
        }
    }
}

/// GET /explain?scope=a,b - evaluate the caller against a scope without enforcing it.
pub async fn explain(
    Extension(gate): Extension<GateState>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<ExplainQuery>,
) -> Response {
    let access = match query.access() {
        Ok(access) => access,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_scope", e.to_string()),
    };

    match gate.verifier.explain(caller.auth(), &access).await {
        Ok(explanation) => (StatusCode::OK, Json(explanation)).into_response(),
        Err(e) => errors::verify_error_to_response(&e),
    }
}
