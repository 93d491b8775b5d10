//! Network hosts: HTTP adapter, gRPC adapter and metrics listener.

pub mod grpc;
pub mod http;
pub mod metrics;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

/// Bind a TCP listener for `host`, returning it with the address actually bound.
///
/// # Errors
/// Returns an error if the address cannot be bound.
pub async fn bind(host: &'static str, addr: SocketAddr) -> anyhow::Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {host} listener on {addr}"))?;
    let bound = listener.local_addr()?;
    tracing::info!(host, %bound, "listener bound");
    Ok((listener, bound))
}
