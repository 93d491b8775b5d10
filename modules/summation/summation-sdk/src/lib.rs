//! Summation SDK
//!
//! This crate provides everything needed to consume or host the summation service:
//! - Client trait (`SummationClientV1`)
//! - Error types (`SummationError`)
//! - gRPC client (`SummationGrpcClient`) with connect and call retries
//! - Proto stubs for the server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use summation_sdk::{GrpcClientConfig, SummationClientV1, SummationGrpcClient};
//!
//! let cfg = GrpcClientConfig::new(summation_sdk::SERVICE_NAME);
//! let client = SummationGrpcClient::connect("http://localhost:50051", &cfg).await?;
//! let result = client.calculate_sum(10, 20).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// === CLIENT TRAIT AND TYPES ===
mod api;
pub use api::{SummationClientV1, SummationError};

// === GRPC CLIENT ===
mod client;
pub use client::SummationGrpcClient;

pub mod transport;
pub use transport::{GrpcClientConfig, RpcRetryConfig};

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for `SummationService`
#[allow(clippy::pedantic, clippy::derive_partial_eq_without_eq)]
pub mod proto {
    tonic::include_proto!("summation");

    /// Encoded file descriptor set, used by the reflection service.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("summation_descriptor");
}

// Re-export proto types needed by the server
pub use proto::summation_service_server::{SummationService, SummationServiceServer};
pub use proto::{SummationRequest, SummationResponse};

/// Fully-qualified gRPC service name (`package.Service`).
pub const SERVICE_NAME: &str = "summation.SummationService";
