//! Route registration for the summation HTTP adapter

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use summation_errors::{Problem, ValidationViolation};
use utoipa::OpenApi;

use super::dto::{HealthDto, SumRequestDto, SumResponseDto};
use super::handlers::{self, ServiceId};
use crate::domain::Service;

pub const SUM_PATH: &str = "/sum";

#[derive(OpenApi)]
#[openapi(
    info(title = "Summation API", description = "Adds two 32-bit integers"),
    paths(handlers::calculate_sum, handlers::health),
    components(schemas(SumRequestDto, SumResponseDto, HealthDto, Problem, ValidationViolation)),
    tags(
        (name = "summation", description = "Summation operations"),
        (name = "health", description = "Liveness endpoints"),
    )
)]
pub struct ApiDoc;

/// Build the router of the HTTP adapter, without the host middleware stack.
#[must_use]
pub fn router(service: Arc<Service>, service_id: ServiceId) -> Router {
    Router::new()
        .route(SUM_PATH, post(handlers::calculate_sum))
        .route("/health", get(handlers::health))
        .route("/healthz", get(|| async { "ok" }))
        .route("/openapi.json", get(handlers::openapi))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .layer(Extension(service))
        .layer(Extension(service_id))
}
