//! HTTP application wiring (Axum router + collaborator wiring).
//!
//! - `services.rs`: seed data and collaborator wiring
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router, routing::get};

use scopegate_auth::InvalidAction;

use crate::middleware::GateState;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(gate: GateState) -> Result<Router, InvalidAction> {
    let articles = routes::articles::ArticleStore::default();

    let protected = routes::router(&gate)?
        .layer(Extension(articles))
        .layer(Extension(gate));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected))
}
