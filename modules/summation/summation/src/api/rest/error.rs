//! Mapping of domain and extractor errors to RFC 9457 Problems.

use axum::extract::rejection::JsonRejection;
use http::StatusCode;
use summation_errors::{Problem, ValidationViolation, catalog};

use crate::domain::{InvalidInput, ServiceError};

impl From<InvalidInput> for Problem {
    fn from(err: InvalidInput) -> Self {
        let detail = err.to_string();
        let problem = catalog::INVALID_INPUT.as_problem(detail.clone());
        match err.field() {
            Some(field) => problem.with_violation(ValidationViolation {
                field: field.to_owned(),
                message: detail,
                code: Some(err.kind().to_owned()),
            }),
            None => problem,
        }
    }
}

impl From<ServiceError> for Problem {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(msg) => catalog::INVALID_INPUT.as_problem(msg),
            ServiceError::Unavailable(msg) => {
                tracing::warn!(error = %msg, "summation backend unavailable");
                catalog::BACKEND_UNAVAILABLE.as_problem("the summation backend is unavailable")
            }
            ServiceError::Internal(msg) => {
                tracing::error!(error = %msg, "summation failed");
                catalog::INTERNAL.as_problem("an internal error occurred")
            }
        }
    }
}

/// Map a failed `Json` extraction: 415 for a missing JSON content type, 413 for an
/// oversized body, 400 for everything else.
#[must_use]
pub fn from_json_rejection(rejection: &JsonRejection) -> Problem {
    match rejection.status() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => catalog::UNSUPPORTED_MEDIA_TYPE
            .as_problem("expected request with `Content-Type: application/json`"),
        StatusCode::PAYLOAD_TOO_LARGE => {
            catalog::PAYLOAD_TOO_LARGE.as_problem("request body exceeds the configured limit")
        }
        _ => InvalidInput::MalformedBody(rejection.body_text()).into(),
    }
}
