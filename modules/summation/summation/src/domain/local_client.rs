//! In-process `SummationClientV1` backed by the pure core.

use async_trait::async_trait;
use summation_sdk::{SummationClientV1, SummationError};

use super::sum::{SumRequest, calculate_sum};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSummationClient;

#[async_trait]
impl SummationClientV1 for LocalSummationClient {
    async fn calculate_sum(&self, a: i32, b: i32) -> Result<i32, SummationError> {
        calculate_sum(SumRequest::new(a, b))
            .map(|response| response.result())
            .map_err(|e| SummationError::InvalidArgument(e.to_string()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_client_sums() {
        assert_eq!(LocalSummationClient.calculate_sum(10, 20).await, Ok(30));
    }

    #[tokio::test]
    async fn local_client_maps_overflow_to_invalid_argument() {
        let err = LocalSummationClient
            .calculate_sum(i32::MAX, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SummationError::InvalidArgument(msg) if msg.contains("overflows")));
    }
}
