//! Problem Details payload (RFC 9457) returned by every failing HTTP route.

use http::StatusCode;
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Error body of the HTTP API.
///
/// `code` is stable and meant for machines; `title` and `detail` are for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(with = "status_as_u16")]
    #[cfg_attr(feature = "utoipa", schema(value_type = u16, example = 400))]
    pub status: StatusCode,
    pub detail: String,
    /// Request path, e.g. `/sum`.
    pub instance: String,
    #[cfg_attr(feature = "utoipa", schema(example = "INVALID_INPUT"))]
    pub code: String,
    /// Value of `x-request-id` for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

/// Operand that made the request invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct ValidationViolation {
    #[cfg_attr(feature = "utoipa", schema(example = "b"))]
    pub field: String,
    pub message: String,
    /// e.g. `MISSING_FIELD`, `NOT_AN_INTEGER`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Problem {
    /// Append a per-field violation.
    pub fn with_violation(mut self, violation: ValidationViolation) -> Self {
        self.errors.get_or_insert_with(Vec::new).push(violation);
        self
    }
}

mod status_as_u16 {
    use http::StatusCode;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<StatusCode, D::Error> {
        StatusCode::from_u16(u16::deserialize(d)?).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        let status = self.status;
        (
            status,
            [(http::header::CONTENT_TYPE, APPLICATION_PROBLEM_JSON)],
            axum::Json(self),
        )
            .into_response()
    }
}
