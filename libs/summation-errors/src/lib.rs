//! Error payloads for the summation service
//!
//! Pure data types, no HTTP framework required unless the `axum` feature is on:
//! - RFC 9457 Problem Details (`Problem`)
//! - Static error catalog (`ErrDef`, `catalog::*`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};

/// Attach the request path and request id to a Problem before it is returned.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    instance.clone_into(&mut p.instance);
    p.trace_id = trace_id;
    p
}
