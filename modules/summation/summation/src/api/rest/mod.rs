//! HTTP adapter: `POST /sum` plus health and OpenAPI endpoints.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use routes::{ApiDoc, router};
