//! HTTP host: middleware stack and server loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Request, Response, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response as AxumResponse};
use summation_errors::{APPLICATION_PROBLEM_JSON, catalog};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;

use crate::api::rest::handlers::REQUEST_ID_HEADER;
use crate::config::HttpConfig;
use crate::metrics::{Metrics, track_http};

pub const SERVICE_ID_HEADER: &str = "x-service-id";

/// Wrap the adapter router with the host middleware stack.
///
/// Runtime order (outermost -> innermost):
/// `SetRequestId` -> `PropagateRequestId` -> Trace -> `x-service-id` -> Metrics ->
/// bare status to Problem -> Timeout -> `BodyLimit` -> Router.
///
/// # Errors
/// Returns an error if `service_id` is not a valid header value.
pub fn apply_middleware_stack(
    mut router: Router,
    cfg: &HttpConfig,
    service_id: &str,
    metrics: Option<Arc<Metrics>>,
) -> anyhow::Result<Router> {
    let service_id = HeaderValue::from_str(service_id)
        .with_context(|| format!("server.instance_id '{service_id}' is not a valid header value"))?;

    // 8) Body limit
    router = router.layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes));
    router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));

    // 7) Timeout
    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        cfg.request_timeout,
    ));

    // 6) Layers below answer with bare statuses; turn those into Problems
    router = router.layer(axum::middleware::from_fn(bare_status_to_problem));

    // 5) Metrics, outside the timeout so the pending gauge is always decremented
    if let Some(metrics) = metrics {
        router = router.layer(axum::middleware::from_fn_with_state(metrics, track_http));
    }

    // 4) Identify the answering instance
    router = router.layer(SetResponseHeaderLayer::overriding(
        HeaderName::from_static(SERVICE_ID_HEADER),
        service_id,
    ));

    // 3) Trace
    router = apply_trace_layer(router);

    // 2) PropagateRequestId
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

    // 1) SetRequestId (registered last, runs first)
    router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    Ok(router)
}

/// Replace the empty 504/413 bodies produced by the timeout and body-limit layers
/// with catalog Problems. Responses that already carry a Problem pass through.
async fn bare_status_to_problem(request: axum::extract::Request, next: Next) -> AxumResponse {
    let path = request.uri().path().to_owned();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    let response = next.run(request).await;

    let (def, detail) = match response.status() {
        StatusCode::GATEWAY_TIMEOUT => (catalog::TIMEOUT, "request did not complete in time"),
        StatusCode::PAYLOAD_TOO_LARGE => {
            (catalog::PAYLOAD_TOO_LARGE, "request body exceeds the configured limit")
        }
        _ => return response,
    };
    let is_problem = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == APPLICATION_PROBLEM_JSON.as_bytes());
    if is_problem {
        return response;
    }

    summation_errors::finalize(def.as_problem(detail), &path, request_id).into_response()
}

fn apply_trace_layer(router: Router) -> Router {
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &Request<Body>| {
                let rid = req
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    request_id = %rid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(|res: &Response<Body>, latency: Duration, span: &tracing::Span| {
                span.record("status", res.status().as_u16());
                span.record("latency_ms", latency.as_millis());
            }),
    )
}

/// Serve `router` on `listener` until `cancel` fires, then drain in-flight requests.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn serve(
    host: &'static str,
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!(host, "server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .with_context(|| format!("{host} server failed"))
}
