use axum::{Router, routing::{get, post}};

use scopegate_auth::{AccessConfig, Action, InvalidAction};

use crate::app::services::{ARTICLE_CREATE, ARTICLE_FIND};
use crate::middleware::{self, GateState};

pub mod articles;
pub mod rbac;
pub mod system;

/// Router for all gated endpoints. Each route declares its own access.
pub fn router(gate: &GateState) -> Result<Router, InvalidAction> {
    let guard = |access: AccessConfig| {
        axum::middleware::from_fn_with_state(gate.guard(access), middleware::gate)
    };

    let find = AccessConfig::require(Action::new(ARTICLE_FIND)?);
    let create = AccessConfig::require(Action::new(ARTICLE_CREATE)?);

    Ok(Router::new()
        .route(
            "/whoami",
            get(system::whoami).route_layer(guard(AccessConfig::unscoped())),
        )
        .route(
            "/explain",
            get(rbac::explain).route_layer(guard(AccessConfig::unscoped())),
        )
        .route(
            "/articles",
            get(articles::list)
                .route_layer(guard(find))
                .merge(post(articles::create).route_layer(guard(create))),
        ))
}
