use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Wait for Ctrl+C or, on unix, SIGTERM.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> Result<()> {
    tokio::select! {
        result = signal::ctrl_c() => {
            result.inspect_err(|e| tracing::error!(%e, "Error handling Ctrl+C signal"))?;
            tracing::info!("Received Ctrl+C signal");
        }
        result = wait_sigterm() => {
            result?;
            tracing::info!("Received SIGTERM signal");
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .inspect_err(|e| tracing::error!(%e, "Failed to install SIGTERM handler"))?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<()> {
    std::future::pending::<Result<()>>().await
}

/// Cancel `cancel` once a termination signal arrives.
///
/// Falls back to plain Ctrl+C when the signal handlers cannot be installed.
#[must_use]
pub fn cancel_on_shutdown_signal(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => return,
            result = wait_for_shutdown() => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "shutdown: signal waiter failed, falling back to ctrl_c()");
                    if let Err(e) = signal::ctrl_c().await {
                        tracing::error!(%e, "shutdown: ctrl_c() fallback failed");
                    }
                }
            }
        }
        tracing::info!("Shutdown signal received, initiating graceful shutdown");
        cancel.cancel();
    })
}
