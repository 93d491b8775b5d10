use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, Uri};
use axum::{Extension, Json};
use serde_json::Value;
use summation_errors::{Problem, catalog};
use utoipa::OpenApi;

use super::dto::{HealthDto, SumResponseDto};
use super::error::from_json_rejection;
use super::routes::{ApiDoc, SUM_PATH};
use crate::domain::{Service, SumRequest};

/// Identifier of this instance, echoed in `x-service-id` and `/health`.
#[derive(Debug, Clone)]
pub struct ServiceId(pub Arc<str>);

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// POST /sum
#[utoipa::path(
    post,
    path = "/sum",
    tag = "summation",
    operation_id = "summation.calculate_sum",
    request_body = super::dto::SumRequestDto,
    responses(
        (status = 200, description = "Sum of the two numbers", body = SumResponseDto),
        (status = 400, description = "Malformed body, missing or non-integer operand, or overflow",
            body = Problem, content_type = "application/problem+json"),
        (status = 415, description = "Missing JSON content type",
            body = Problem, content_type = "application/problem+json"),
        (status = 502, description = "Remote summation backend unavailable",
            body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn calculate_sum(
    Extension(service): Extension<Arc<Service>>,
    headers: HeaderMap,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SumResponseDto>, Problem> {
    let rid = request_id(&headers);
    let finalize = |p: Problem| summation_errors::finalize(p, SUM_PATH, rid.clone());

    let Json(body) = payload.map_err(|r| finalize(from_json_rejection(&r)))?;
    let request = SumRequest::from_json(&body).map_err(|e| finalize(e.into()))?;
    let response = service.sum(request).await.map_err(|e| finalize(e.into()))?;

    Ok(Json(response.into()))
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is up", body = HealthDto))
)]
pub async fn health(Extension(id): Extension<ServiceId>) -> Json<HealthDto> {
    Json(HealthDto {
        status: "healthy".to_owned(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service_id: id.0.to_string(),
    })
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn not_found(uri: Uri, headers: HeaderMap) -> Problem {
    let problem = catalog::NOT_FOUND.as_problem(format!("no route for {}", uri.path()));
    summation_errors::finalize(problem, uri.path(), request_id(&headers))
}

pub async fn method_not_allowed(uri: Uri, headers: HeaderMap) -> Problem {
    let problem = catalog::METHOD_NOT_ALLOWED
        .as_problem(format!("method not allowed on {}", uri.path()));
    summation_errors::finalize(problem, uri.path(), request_id(&headers))
}
