//! gRPC client transport: endpoint tuning, connection retries and unary call retries.
//!
//! Retries are only applied to transient, network-like failures
//! (`UNAVAILABLE`, `DEADLINE_EXCEEDED`). Summation is idempotent, so replaying a
//! unary call is always safe here.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::Instrument;

fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Transport-level configuration for a gRPC client.
#[derive(Debug, Clone)]
pub struct GrpcClientConfig {
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,
    /// Timeout applied to every RPC on the channel.
    pub rpc_timeout: Duration,
    /// Retry policy shared by connection attempts and unary calls.
    pub retry: RpcRetryConfig,
    /// Service name used in logs and spans.
    pub service_name: &'static str,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(10),
            retry: RpcRetryConfig::default(),
            service_name: "grpc_client",
        }
    }
}

impl GrpcClientConfig {
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.retry.max_retries = retries;
        self
    }
}

/// Backoff policy: `base_backoff * attempt`, capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RpcRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RpcRetryConfig {
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_base_backoff(mut self, duration: Duration) -> Self {
        self.base_backoff = duration;
        self
    }

    #[must_use]
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        (self.base_backoff * attempt).min(self.max_backoff)
    }
}

/// Build a tonic `Endpoint` with timeouts and keepalive.
///
/// # Errors
/// Returns an error if `uri` is not a valid URI.
pub fn build_endpoint(uri: String, cfg: &GrpcClientConfig) -> anyhow::Result<Endpoint> {
    let endpoint = Endpoint::from_shared(uri)
        .context("invalid gRPC endpoint URI")?
        .connect_timeout(cfg.connect_timeout)
        .timeout(cfg.rpc_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);
    Ok(endpoint)
}

/// Connect to a gRPC service, retrying with backoff on failure.
///
/// # Errors
/// Returns an error if the URI is invalid or every connection attempt fails.
pub async fn connect_with_retry(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<Channel> {
    let uri = uri.into();
    let endpoint = build_endpoint(uri.clone(), cfg)?;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let span = tracing::debug_span!("grpc_connect", service = cfg.service_name, %uri, attempt);

        match endpoint.connect().instrument(span).await {
            Ok(channel) => {
                tracing::info!(
                    service = cfg.service_name,
                    %uri,
                    attempt,
                    "gRPC client connected"
                );
                return Ok(channel);
            }
            Err(e) if attempt <= cfg.retry.max_retries => {
                let backoff = cfg.retry.backoff_for(attempt);
                tracing::warn!(
                    service = cfg.service_name,
                    attempt,
                    max_retries = cfg.retry.max_retries,
                    error = %e,
                    backoff_ms = duration_to_u64_ms(backoff),
                    "gRPC connection failed, retrying..."
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!(
                        "failed to connect to {} at {uri} after {attempt} attempts",
                        cfg.service_name
                    )
                });
            }
        }
    }
}

/// Run a unary gRPC call, retrying on `UNAVAILABLE` and `DEADLINE_EXCEEDED`.
///
/// `call` receives the request by value on every attempt, so it should clone
/// the (cheap) tonic client it needs.
///
/// # Errors
/// Returns the last `Status` once a non-retryable code is seen or retries run out.
pub async fn call_with_retry<F, Fut, Req, Res>(
    cfg: &RpcRetryConfig,
    req: Req,
    call: F,
    op_name: &'static str,
) -> Result<Res, Status>
where
    F: Fn(Req) -> Fut,
    Fut: Future<Output = Result<Res, Status>>,
    Req: Clone,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        let span = tracing::debug_span!("grpc_call", op = op_name, attempt);

        match call(req.clone()).instrument(span).await {
            Ok(res) => {
                if attempt > 1 {
                    tracing::info!(op = op_name, attempt, "gRPC call succeeded after retries");
                }
                return Ok(res);
            }
            Err(status) => {
                let retryable = matches!(status.code(), Code::Unavailable | Code::DeadlineExceeded);
                if !retryable || attempt > cfg.max_retries {
                    tracing::debug!(
                        op = op_name,
                        attempt,
                        code = ?status.code(),
                        message = %status.message(),
                        "gRPC call giving up"
                    );
                    return Err(status);
                }

                let backoff = cfg.backoff_for(attempt);
                tracing::warn!(
                    op = op_name,
                    attempt,
                    code = ?status.code(),
                    backoff_ms = duration_to_u64_ms(backoff),
                    "gRPC call failed, retrying after backoff"
                );
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_retries: u32) -> RpcRetryConfig {
        RpcRetryConfig::new(max_retries)
            .with_base_backoff(Duration::from_millis(1))
            .with_max_backoff(Duration::from_millis(5))
    }

    #[test]
    fn backoff_is_linear_and_capped() {
        let cfg = RpcRetryConfig::new(5)
            .with_base_backoff(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(250));
        assert_eq!(cfg.backoff_for(1), Duration::from_millis(100));
        assert_eq!(cfg.backoff_for(2), Duration::from_millis(200));
        assert_eq!(cfg.backoff_for(3), Duration::from_millis(250));
    }

    #[test]
    fn build_endpoint_rejects_empty_uri() {
        let cfg = GrpcClientConfig::default();
        assert!(build_endpoint(String::new(), &cfg).is_err());
        assert!(build_endpoint("http://localhost:50051".to_owned(), &cfg).is_ok());
    }

    #[tokio::test]
    async fn call_with_retry_does_not_retry_invalid_argument() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), Status> = call_with_retry(
            &fast_retry(3),
            (),
            |()| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(Status::invalid_argument("missing field `b`")) }
            },
            "test.op",
        )
        .await;

        assert_eq!(result.unwrap_err().code(), Code::InvalidArgument);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn call_with_retry_recovers_from_unavailable() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = call_with_retry(
            &fast_retry(3),
            7,
            |req: i32| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(Status::unavailable("warming up"))
                    } else {
                        Ok(req * 2)
                    }
                }
            },
            "test.op",
        )
        .await;

        assert_eq!(result.unwrap(), 14);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn call_with_retry_gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<(), Status> = call_with_retry(
            &fast_retry(2),
            (),
            |()| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(Status::unavailable("down")) }
            },
            "test.op",
        )
        .await;

        assert_eq!(result.unwrap_err().code(), Code::Unavailable);
        // first attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
