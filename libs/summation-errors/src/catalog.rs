//! Static error catalog of the summation HTTP API

use crate::problem::Problem;
use http::StatusCode;

/// Static error definition from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        Problem {
            type_url: self.type_url.to_owned(),
            title: self.title.to_owned(),
            status: StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            detail: detail.into(),
            instance: String::new(),
            code: self.code.to_owned(),
            trace_id: None,
            errors: None,
        }
    }
}

pub const INVALID_INPUT: ErrDef = ErrDef {
    status: 400,
    title: "Bad Request",
    code: "INVALID_INPUT",
    type_url: "urn:summation:error:invalid-input",
};

pub const NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Not Found",
    code: "NOT_FOUND",
    type_url: "urn:summation:error:not-found",
};

pub const METHOD_NOT_ALLOWED: ErrDef = ErrDef {
    status: 405,
    title: "Method Not Allowed",
    code: "METHOD_NOT_ALLOWED",
    type_url: "urn:summation:error:method-not-allowed",
};

pub const PAYLOAD_TOO_LARGE: ErrDef = ErrDef {
    status: 413,
    title: "Payload Too Large",
    code: "PAYLOAD_TOO_LARGE",
    type_url: "urn:summation:error:payload-too-large",
};

pub const UNSUPPORTED_MEDIA_TYPE: ErrDef = ErrDef {
    status: 415,
    title: "Unsupported Media Type",
    code: "UNSUPPORTED_MEDIA_TYPE",
    type_url: "urn:summation:error:unsupported-media-type",
};

pub const INTERNAL: ErrDef = ErrDef {
    status: 500,
    title: "Internal Server Error",
    code: "INTERNAL",
    type_url: "urn:summation:error:internal",
};

pub const BACKEND_UNAVAILABLE: ErrDef = ErrDef {
    status: 502,
    title: "Bad Gateway",
    code: "BACKEND_UNAVAILABLE",
    type_url: "urn:summation:error:backend-unavailable",
};

pub const TIMEOUT: ErrDef = ErrDef {
    status: 504,
    title: "Gateway Timeout",
    code: "TIMEOUT",
    type_url: "urn:summation:error:timeout",
};
