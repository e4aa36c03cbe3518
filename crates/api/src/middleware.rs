use std::sync::Arc;

use axum::{extract::State, http::StatusCode, middleware::Next, response::Response};

use scopegate_auth::{AccessConfig, Authenticator, Verifier};

use crate::app::errors;
use crate::context::CallerContext;

/// Shared gate wiring (one per process).
#[derive(Clone, Debug)]
pub struct GateState {
    pub authenticator: Authenticator,
    pub verifier: Verifier,
}

impl GateState {
    pub fn new(authenticator: Authenticator, verifier: Verifier) -> Self {
        Self {
            authenticator,
            verifier,
        }
    }

    /// Bind this gate to one route's access declaration.
    pub fn guard(&self, access: AccessConfig) -> RouteGate {
        RouteGate {
            state: self.clone(),
            access: Arc::new(access),
        }
    }
}

/// Gate state plus the access declaration of the route it protects.
#[derive(Clone, Debug)]
pub struct RouteGate {
    state: GateState,
    access: Arc<AccessConfig>,
}

/// Authenticate, then verify the route's scope; only then run the handler.
///
/// 401 when there is no usable identity (or an anonymous caller hits an
/// unscoped route), 403 when the caller's role lacks a required action.
pub async fn gate(
    State(route): State<RouteGate>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth = route.state.authenticator.authenticate(req.headers()).await;

    if !auth.is_authenticated() {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "authentication required",
        );
    }

    if let Err(err) = route.state.verifier.verify(&auth, &route.access).await {
        return errors::verify_error_to_response(&err);
    }

    req.extensions_mut().insert(CallerContext::new(auth));
    next.run(req).await
}
