//! Summation client trait and types
//!
//! Contract trait and error type shared by every summation backend.

use async_trait::async_trait;

/// Summation API trait.
///
/// Implemented by the in-process backend and by the gRPC client, so the
/// HTTP adapter does not care where the addition actually happens.
#[async_trait]
pub trait SummationClientV1: Send + Sync {
    /// Add two numbers and return the sum.
    async fn calculate_sum(&self, a: i32, b: i32) -> Result<i32, SummationError>;
}

/// Error type for summation operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SummationError {
    /// The backend rejected the operands.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("gRPC transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tonic::Status> for SummationError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::InvalidArgument | tonic::Code::OutOfRange => {
                Self::InvalidArgument(status.message().to_owned())
            }
            tonic::Code::Unavailable
            | tonic::Code::DeadlineExceeded
            | tonic::Code::Cancelled
            | tonic::Code::Unknown => Self::Transport(status.message().to_owned()),
            _ => Self::Internal(format!("{}: {}", status.code(), status.message())),
        }
    }
}
