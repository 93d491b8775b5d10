//! gRPC host: summation service, `grpc.health.v1` and optional server reflection.

use anyhow::Context;
use summation_sdk::SummationServiceServer;
use summation_sdk::proto::FILE_DESCRIPTOR_SET;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::{Routes, RoutesBuilder};
use tonic::transport::Server;
use tonic_health::server::HealthReporter;

use crate::api::grpc::SummationServiceImpl;

type SummationServer = SummationServiceServer<SummationServiceImpl>;

/// Assembled gRPC routes plus the reporter that flips health on shutdown.
pub struct GrpcRoutes {
    routes: Routes,
    health: HealthReporter,
}

/// Build the routes served by the gRPC host.
///
/// # Errors
/// Returns an error if the reflection service cannot decode the descriptor set.
pub async fn build_routes(
    service: SummationServiceImpl,
    reflection: bool,
) -> anyhow::Result<GrpcRoutes> {
    let (health, health_service) = tonic_health::server::health_reporter();
    health.set_serving::<SummationServer>().await;

    let mut builder = RoutesBuilder::default();
    builder.add_service(health_service);
    builder.add_service(SummationServiceServer::new(service));

    if reflection {
        let reflection_service = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .context("failed to build gRPC reflection service")?;
        builder.add_service(reflection_service);
    }

    Ok(GrpcRoutes {
        routes: builder.routes(),
        health,
    })
}

/// Serve gRPC on `listener` until `cancel` fires.
///
/// # Errors
/// Returns an error if the transport fails.
pub async fn serve(
    listener: TcpListener,
    routes: GrpcRoutes,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let GrpcRoutes { routes, health } = routes;
    let incoming = TcpListenerStream::new(listener);

    Server::builder()
        .add_routes(routes)
        .serve_with_incoming_shutdown(incoming, async move {
            cancel.cancelled().await;
            health.set_not_serving::<SummationServer>().await;
            tracing::info!("gRPC server shutting down gracefully (cancellation)");
        })
        .await
        .context("gRPC server failed")
}
