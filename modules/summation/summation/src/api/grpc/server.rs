//! gRPC Server implementation for summation
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain Service for business logic.

use std::sync::Arc;

use summation_sdk::{SummationRequest, SummationResponse, SummationService};
use tonic::{Code, Request, Response, Status};
use tracing::debug;

use crate::domain::{InvalidInput, Service, ServiceError, SumRequest};
use crate::metrics::Metrics;

const CALCULATE_SUM: &str = "CalculateSum";

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct SummationServiceImpl {
    service: Arc<Service>,
    metrics: Option<Arc<Metrics>>,
}

impl SummationServiceImpl {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn handle(&self, req: SummationRequest) -> Result<SummationResponse, Status> {
        debug!(a = ?req.a, b = ?req.b, "CalculateSum called");

        let request = SumRequest::from_operands(req.a.map(i64::from), req.b.map(i64::from))
            .map_err(|e| invalid_input_status(&e))?;
        let response = self.service.sum(request).await.map_err(service_status)?;

        Ok(SummationResponse {
            result: response.result(),
        })
    }
}

#[tonic::async_trait]
impl SummationService for SummationServiceImpl {
    async fn calculate_sum(
        &self,
        request: Request<SummationRequest>,
    ) -> Result<Response<SummationResponse>, Status> {
        let result = self.handle(request.into_inner()).await;

        if let Some(metrics) = &self.metrics {
            let code = result.as_ref().map_or_else(Status::code, |_| Code::Ok);
            metrics.observe_grpc(CALCULATE_SUM, code);
        }

        result.map(Response::new)
    }
}

fn invalid_input_status(err: &InvalidInput) -> Status {
    Status::invalid_argument(err.to_string())
}

fn service_status(err: ServiceError) -> Status {
    match err {
        ServiceError::Rejected(msg) => Status::invalid_argument(msg),
        ServiceError::Unavailable(msg) => Status::unavailable(msg),
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "CalculateSum failed");
            Status::internal("internal error")
        }
    }
}
