//! Prometheus metrics of the summation service.
//!
//! Collected metrics (prefix is `server.app_name`, default: `summation`):
//! - `<prefix>_http_request_total`: Total HTTP requests (counter)
//! - `<prefix>_http_requests_duration_seconds`: Request latency (histogram)
//! - `<prefix>_http_requests_pending`: Current in-flight requests (gauge)
//! - `<prefix>_grpc_requests_total`: Total gRPC calls by method and status code (counter)

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use tonic::Code;

const UNMATCHED_ENDPOINT: &str = "unmatched";

pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
    http_pending: IntGaugeVec,
    grpc_requests: IntCounterVec,
}

impl Metrics {
    /// Create a registry whose metric names start with `<prefix>_`.
    ///
    /// # Errors
    /// Returns an error if the prefix is empty.
    pub fn new(prefix: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some(prefix.to_owned()), None)?;

        let http_requests = IntCounterVec::new(
            Opts::new("http_request_total", "Total HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        let http_duration = HistogramVec::new(
            HistogramOpts::new("http_requests_duration_seconds", "HTTP request latency"),
            &["method", "endpoint", "status"],
        )?;
        let http_pending = IntGaugeVec::new(
            Opts::new("http_requests_pending", "HTTP requests currently in flight"),
            &["method", "endpoint"],
        )?;
        let grpc_requests = IntCounterVec::new(
            Opts::new("grpc_requests_total", "Total gRPC calls"),
            &["method", "code"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_duration.clone()))?;
        registry.register(Box::new(http_pending.clone()))?;
        registry.register(Box::new(grpc_requests.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_duration,
            http_pending,
            grpc_requests,
        })
    }

    pub fn observe_grpc(&self, method: &str, code: Code) {
        self.grpc_requests
            .with_label_values(&[method, code_label(code)])
            .inc();
    }

    /// Render every registered metric in the Prometheus text format.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Axum middleware recording the HTTP metrics of every routed request.
pub async fn track_http(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().as_str().to_owned();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(UNMATCHED_ENDPOINT, MatchedPath::as_str)
        .to_owned();

    let pending = PendingGuard::enter(
        metrics
            .http_pending
            .with_label_values(&[method.as_str(), endpoint.as_str()]),
    );
    let started = Instant::now();

    let response = next.run(request).await;

    drop(pending);
    let status = response.status().as_u16().to_string();
    let labels = [method.as_str(), endpoint.as_str(), status.as_str()];
    metrics.http_requests.with_label_values(&labels).inc();
    metrics
        .http_duration
        .with_label_values(&labels)
        .observe(started.elapsed().as_secs_f64());

    response
}

/// Holds one unit of the pending gauge until dropped.
struct PendingGuard(IntGauge);

impl PendingGuard {
    fn enter(gauge: IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.dec();
    }
}

fn code_label(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "CANCELLED",
        Code::Unknown => "UNKNOWN",
        Code::InvalidArgument => "INVALID_ARGUMENT",
        Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
        Code::NotFound => "NOT_FOUND",
        Code::AlreadyExists => "ALREADY_EXISTS",
        Code::PermissionDenied => "PERMISSION_DENIED",
        Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
        Code::FailedPrecondition => "FAILED_PRECONDITION",
        Code::Aborted => "ABORTED",
        Code::OutOfRange => "OUT_OF_RANGE",
        Code::Unimplemented => "UNIMPLEMENTED",
        Code::Internal => "INTERNAL",
        Code::Unavailable => "UNAVAILABLE",
        Code::DataLoss => "DATA_LOSS",
        Code::Unauthenticated => "UNAUTHENTICATED",
    }
}
