//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (customer store, calculator client)
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: response DTOs and JSON mapping helpers
//! - `errors.rs`: the shared error body and status mapping

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use loanapi_infra::config::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, services::StartupError> {
    let services = services::build_services(config).await?;
    Ok(build_app_with(services))
}

/// Build the router around already wired services.
pub fn build_app_with(services: services::AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_span)))
}
