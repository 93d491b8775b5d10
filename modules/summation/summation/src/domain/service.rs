//! Domain service shared by the HTTP and gRPC adapters.
//!
//! Holds the backend the request is delegated to: the in-process core or a
//! remote `SummationService`.

use std::sync::Arc;

use summation_sdk::{SummationClientV1, SummationError};
use tracing::{debug, instrument};

use super::sum::{SumRequest, SumResponse};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The backend refused the operands (e.g. the sum overflows).
    #[error("{0}")]
    Rejected(String),

    /// The remote backend could not be reached.
    #[error("summation backend unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SummationError> for ServiceError {
    fn from(err: SummationError) -> Self {
        match err {
            SummationError::InvalidArgument(msg) => Self::Rejected(msg),
            SummationError::Transport(msg) => Self::Unavailable(msg),
            SummationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[derive(Clone)]
pub struct Service {
    backend: Arc<dyn SummationClientV1>,
}

impl Service {
    #[must_use]
    pub fn new(backend: Arc<dyn SummationClientV1>) -> Self {
        Self { backend }
    }

    /// Sum a validated request through the configured backend.
    ///
    /// # Errors
    /// See [`ServiceError`].
    #[instrument(skip(self, request), fields(a = request.a(), b = request.b()))]
    pub async fn sum(&self, request: SumRequest) -> Result<SumResponse, ServiceError> {
        let result = self
            .backend
            .calculate_sum(request.a(), request.b())
            .await?;
        debug!(result, "summation completed");
        Ok(SumResponse::new(result))
    }
}
