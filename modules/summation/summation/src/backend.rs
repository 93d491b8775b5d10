//! Backend selection for the HTTP adapter.
//!
//! `local` runs the core in-process; `grpc` forwards to a remote `SummationService`
//! through a lazily connected client.

use std::sync::Arc;

use async_trait::async_trait;
use summation_sdk::{
    GrpcClientConfig, SERVICE_NAME, SummationClientV1, SummationError, SummationGrpcClient,
};
use tokio::sync::RwLock;

use crate::config::{BackendConfig, BackendKind};
use crate::domain::LocalSummationClient;

/// Build the backend described by `cfg`. Never connects eagerly.
#[must_use]
pub fn build_backend(cfg: &BackendConfig) -> Arc<dyn SummationClientV1> {
    match cfg.kind {
        BackendKind::Local => {
            tracing::info!("Using in-process summation backend");
            Arc::new(LocalSummationClient)
        }
        BackendKind::Grpc => {
            tracing::info!(endpoint = %cfg.endpoint, "Using remote gRPC summation backend");
            Arc::new(RemoteSummationClient::new(cfg))
        }
    }
}

/// Remote `SummationClientV1` that connects on first use and caches the client.
///
/// A failed connection is not cached; the next call tries again.
pub struct RemoteSummationClient {
    endpoint: String,
    config: GrpcClientConfig,
    client: RwLock<Option<SummationGrpcClient>>,
}

impl RemoteSummationClient {
    #[must_use]
    pub fn new(cfg: &BackendConfig) -> Self {
        let config = GrpcClientConfig::new(SERVICE_NAME)
            .with_connect_timeout(cfg.connect_timeout)
            .with_rpc_timeout(cfg.rpc_timeout)
            .with_max_retries(cfg.max_retries);
        Self {
            endpoint: cfg.endpoint.clone(),
            config,
            client: RwLock::new(None),
        }
    }

    async fn get_client(&self) -> Result<SummationGrpcClient, SummationError> {
        {
            let guard = self.client.read().await;
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }

        let mut guard = self.client.write().await;
        // another caller may have connected while we waited
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = SummationGrpcClient::connect(self.endpoint.clone(), &self.config)
            .await
            .map_err(|e| {
                SummationError::Transport(format!(
                    "failed to connect to summation service at {}: {e:#}",
                    self.endpoint
                ))
            })?;
        *guard = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl SummationClientV1 for RemoteSummationClient {
    async fn calculate_sum(&self, a: i32, b: i32) -> Result<i32, SummationError> {
        let client = self.get_client().await?;
        client.calculate_sum(a, b).await
    }
}
