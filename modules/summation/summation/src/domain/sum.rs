//! Pure summation core: input validation and checked addition.

use serde_json::Value;
use tracing::debug;

/// Rejected input. Surfaced as HTTP 400 and gRPC `INVALID_ARGUMENT`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("field `{field}` must be an integer")]
    NotAnInteger { field: &'static str },

    #[error("field `{field}` is out of range for a 32-bit signed integer: {value}")]
    OutOfRange { field: &'static str, value: String },

    #[error("sum of {a} and {b} overflows a 32-bit signed integer")]
    Overflow { a: i32, b: i32 },

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl InvalidInput {
    /// Name of the offending field, when the error is tied to one.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field }
            | Self::NotAnInteger { field }
            | Self::OutOfRange { field, .. } => Some(*field),
            Self::NotAnObject | Self::Overflow { .. } | Self::MalformedBody(_) => None,
        }
    }

    /// Stable machine-readable kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::NotAnObject => "NOT_AN_OBJECT",
            Self::NotAnInteger { .. } => "NOT_AN_INTEGER",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::Overflow { .. } => "OVERFLOW",
            Self::MalformedBody(_) => "MALFORMED_BODY",
        }
    }
}

/// Two operands of a summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SumRequest {
    a: i32,
    b: i32,
}

impl SumRequest {
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    #[must_use]
    pub const fn a(&self) -> i32 {
        self.a
    }

    #[must_use]
    pub const fn b(&self) -> i32 {
        self.b
    }

    /// Build a request from optional wide operands, checking presence and range.
    ///
    /// # Errors
    /// `MissingField` if an operand is absent, `OutOfRange` if it does not fit in `i32`.
    pub fn from_operands(a: Option<i64>, b: Option<i64>) -> Result<Self, InvalidInput> {
        let a = narrow("a", a.ok_or(InvalidInput::MissingField { field: "a" })?)?;
        let b = narrow("b", b.ok_or(InvalidInput::MissingField { field: "b" })?)?;
        Ok(Self { a, b })
    }

    /// Build a request from a decoded JSON body such as `{"a": 3, "b": 4}`.
    ///
    /// Fields are checked in order `a`, `b`; the first failure wins. Unknown fields are ignored.
    ///
    /// # Errors
    /// Any `InvalidInput` except `Overflow` and `MalformedBody`.
    pub fn from_json(value: &Value) -> Result<Self, InvalidInput> {
        let object = value.as_object().ok_or(InvalidInput::NotAnObject)?;
        let a = json_operand(object.get("a"), "a")?;
        let b = json_operand(object.get("b"), "b")?;
        Self::from_operands(Some(a), Some(b))
    }
}

/// Result of a summation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SumResponse {
    result: i32,
}

impl SumResponse {
    #[must_use]
    pub const fn new(result: i32) -> Self {
        Self { result }
    }

    #[must_use]
    pub const fn result(&self) -> i32 {
        self.result
    }
}

/// Compute `a + b`.
///
/// # Errors
/// `InvalidInput::Overflow` if the sum does not fit in `i32`.
pub fn calculate_sum(request: SumRequest) -> Result<SumResponse, InvalidInput> {
    let SumRequest { a, b } = request;
    debug!(a, b, "performing addition");
    a.checked_add(b)
        .map(|result| SumResponse { result })
        .ok_or(InvalidInput::Overflow { a, b })
}

fn narrow(field: &'static str, value: i64) -> Result<i32, InvalidInput> {
    i32::try_from(value).map_err(|_| InvalidInput::OutOfRange {
        field,
        value: value.to_string(),
    })
}

fn json_operand(value: Option<&Value>, field: &'static str) -> Result<i64, InvalidInput> {
    match value {
        None => Err(InvalidInput::MissingField { field }),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                Ok(v)
            } else if n.is_u64() {
                Err(InvalidInput::OutOfRange {
                    field,
                    value: n.to_string(),
                })
            } else {
                Err(InvalidInput::NotAnInteger { field })
            }
        }
        Some(_) => Err(InvalidInput::NotAnInteger { field }),
    }
}
