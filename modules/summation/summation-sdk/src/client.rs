//! gRPC client implementation of `SummationClientV1`

use anyhow::Result;
use async_trait::async_trait;
use tonic::transport::Channel;

use crate::api::{SummationClientV1, SummationError};
use crate::proto::SummationRequest;
use crate::proto::summation_service_client::SummationServiceClient;
use crate::transport::{GrpcClientConfig, RpcRetryConfig, call_with_retry, connect_with_retry};

/// gRPC client for a remote `SummationService`.
///
/// Cheap to clone; all clones share one HTTP/2 channel.
#[derive(Clone)]
pub struct SummationGrpcClient {
    inner: SummationServiceClient<Channel>,
    retry: RpcRetryConfig,
}

impl SummationGrpcClient {
    /// Connect to the service at `uri`, retrying per `cfg`.
    ///
    /// # Errors
    /// Returns an error if the URI is invalid or the service cannot be reached.
    pub async fn connect(uri: impl Into<String>, cfg: &GrpcClientConfig) -> Result<Self> {
        let channel = connect_with_retry(uri, cfg).await?;
        Ok(Self::from_channel(channel, cfg.retry.clone()))
    }

    /// Wrap an already established channel.
    #[must_use]
    pub fn from_channel(channel: Channel, retry: RpcRetryConfig) -> Self {
        Self {
            inner: SummationServiceClient::new(channel),
            retry,
        }
    }
}

#[async_trait]
impl SummationClientV1 for SummationGrpcClient {
    async fn calculate_sum(&self, a: i32, b: i32) -> Result<i32, SummationError> {
        let request = SummationRequest {
            a: Some(a),
            b: Some(b),
        };

        let response = call_with_retry(
            &self.retry,
            request,
            |req| {
                let mut client = self.inner.clone();
                async move { client.calculate_sum(req).await.map(tonic::Response::into_inner) }
            },
            "summation.calculate_sum",
        )
        .await?;

        Ok(response.result)
    }
}
