//! HTTP adapter: axum middleware that puts the gate in front of routes.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
