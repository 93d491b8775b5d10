pub mod local_client;
pub mod service;
pub mod sum;

pub use local_client::LocalSummationClient;
pub use service::{Service, ServiceError};
pub use sum::{InvalidInput, SumRequest, SumResponse, calculate_sum};
