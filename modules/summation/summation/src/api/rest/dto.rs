//! REST DTOs for the summation endpoint
//!
//! These types are transport-specific (serde + utoipa for REST/OpenAPI).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SumResponse;

/// Request to add two numbers.
///
/// Documentation only: the handler validates the raw JSON itself so that every
/// malformed body maps to the same 400 Problem.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SumRequestDto {
    /// First operand
    pub a: i32,
    /// Second operand
    pub b: i32,
}

/// Response containing the sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SumResponseDto {
    /// The sum of a and b
    pub result: i32,
}

impl From<SumResponse> for SumResponseDto {
    fn from(response: SumResponse) -> Self {
        Self {
            result: response.result(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    pub status: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub service_id: String,
}
