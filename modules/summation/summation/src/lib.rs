//! Summation service
//!
//! Computes `a + b` for two 32-bit integers and exposes it over HTTP (`POST /sum`)
//! and gRPC (`summation.SummationService/CalculateSum`).
//!
//! ## Architecture
//!
//! - `domain/sum.rs` - pure core: validation and checked addition
//! - `domain/service.rs` - delegates to a `SummationClientV1` backend
//! - `backend.rs` - local (in-process) and remote (gRPC) backends
//! - `api/rest` - HTTP adapter, `api/grpc` - gRPC adapter
//! - `hosts` - HTTP, gRPC and metrics listeners
//! - `runtime.rs` - starts the enabled hosts under one cancellation token
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod backend;
pub mod config;
pub mod domain;
pub mod hosts;
pub mod metrics;
pub mod runtime;

pub use config::AppConfig;
pub use domain::{InvalidInput, SumRequest, SumResponse, calculate_sum};
pub use runtime::{RunningServer, start};
