//! Process runtime: binds and runs the enabled hosts under one cancellation token.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::api::grpc::SummationServiceImpl;
use crate::api::rest::{self, handlers::ServiceId};
use crate::backend::build_backend;
use crate::config::{AppConfig, parse_addr};
use crate::domain::{LocalSummationClient, Service};
use crate::hosts;
use crate::metrics::Metrics;

type HostResult = (&'static str, anyhow::Result<()>);

/// Hosts started by [`start`].
pub struct RunningServer {
    pub http_addr: Option<SocketAddr>,
    pub grpc_addr: Option<SocketAddr>,
    pub metrics_addr: Option<SocketAddr>,
    pub service_id: String,
    cancel: CancellationToken,
    tasks: JoinSet<HostResult>,
}

impl RunningServer {
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait until every host has stopped.
    ///
    /// A failing host cancels the others.
    ///
    /// # Errors
    /// Returns the first host failure.
    pub async fn wait(mut self) -> anyhow::Result<()> {
        let mut first_err: Option<anyhow::Error> = None;

        while let Some(joined) = self.tasks.join_next().await {
            let failure = match joined {
                Ok((host, Ok(()))) => {
                    tracing::info!(host, "host stopped");
                    continue;
                }
                Ok((host, Err(e))) => e.context(format!("{host} host failed")),
                Err(join_err) => anyhow::Error::new(join_err).context("host task panicked"),
            };
            tracing::error!(error = ?failure, "host terminated with an error, shutting down");
            self.cancel.cancel();
            first_err.get_or_insert(failure);
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Cancel every host and wait for them to drain.
    ///
    /// # Errors
    /// Returns the first host failure.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.cancel.cancel();
        self.wait().await
    }
}

/// Validate `config`, bind every enabled listener and spawn the hosts.
///
/// All listeners are bound before any host starts, so a bind failure aborts startup.
///
/// # Errors
/// Returns an error if the configuration is invalid or a listener cannot be bound.
pub async fn start(config: &AppConfig, cancel: CancellationToken) -> anyhow::Result<RunningServer> {
    config.validate()?;

    let service_id = config
        .server
        .instance_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(app = %config.server.app_name, %service_id, "starting summation service");

    let metrics = if config.metrics.enabled {
        Some(Arc::new(
            Metrics::new(&config.server.app_name).context("failed to create metrics registry")?,
        ))
    } else {
        None
    };

    let http = if config.http.enabled {
        let addr = parse_addr("http.bind_addr", &config.http.bind_addr)?;
        Some(hosts::bind("http", addr).await?)
    } else {
        None
    };
    let grpc = if config.grpc.enabled {
        let addr = parse_addr("grpc.listen_addr", &config.grpc.listen_addr)?;
        Some(hosts::bind("grpc", addr).await?)
    } else {
        None
    };
    let metrics_listener = match &metrics {
        Some(_) => {
            let addr = parse_addr("metrics.bind_addr", &config.metrics.bind_addr)?;
            Some(hosts::bind("metrics", addr).await?)
        }
        None => None,
    };

    let mut tasks = JoinSet::new();

    let http_addr = match http {
        Some((listener, addr)) => {
            let app = http_app(config, &service_id, metrics.clone())?;
            let cancel = cancel.clone();
            tasks.spawn(async move { ("http", hosts::http::serve("http", listener, app, cancel).await) });
            tracing::info!(%addr, backend = ?config.backend.kind, "HTTP adapter listening");
            Some(addr)
        }
        None => None,
    };

    let grpc_addr = match grpc {
        Some((listener, addr)) => {
            let routes = grpc_routes(config, metrics.as_ref()).await?;
            let cancel = cancel.clone();
            tasks.spawn(async move { ("grpc", hosts::grpc::serve(listener, routes, cancel).await) });
            tracing::info!(%addr, reflection = config.grpc.reflection, "gRPC adapter listening");
            Some(addr)
        }
        None => None,
    };

    let metrics_addr = match (metrics_listener, metrics) {
        (Some((listener, addr)), Some(metrics)) => {
            let router = hosts::metrics::router(metrics);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                ("metrics", hosts::http::serve("metrics", listener, router, cancel).await)
            });
            tracing::info!(%addr, "metrics endpoint listening");
            Some(addr)
        }
        _ => None,
    };

    Ok(RunningServer {
        http_addr,
        grpc_addr,
        metrics_addr,
        service_id,
        cancel,
        tasks,
    })
}

/// HTTP adapter delegating to the configured backend.
fn http_app(
    config: &AppConfig,
    service_id: &str,
    metrics: Option<Arc<Metrics>>,
) -> anyhow::Result<axum::Router> {
    let service = Arc::new(Service::new(build_backend(&config.backend)));
    let router = rest::router(service, ServiceId(Arc::from(service_id)));
    hosts::http::apply_middleware_stack(router, &config.http, service_id, metrics)
}

/// gRPC adapter, always backed by the in-process core.
async fn grpc_routes(
    config: &AppConfig,
    metrics: Option<&Arc<Metrics>>,
) -> anyhow::Result<hosts::grpc::GrpcRoutes> {
    let service = Arc::new(Service::new(Arc::new(LocalSummationClient)));
    let mut server = SummationServiceImpl::new(service);
    if let Some(metrics) = metrics {
        server = server.with_metrics(Arc::clone(metrics));
    }
    hosts::grpc::build_routes(server, config.grpc.reflection).await
}
