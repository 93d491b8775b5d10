//! Bootstrap helpers shared by the summation binaries
//!
//! - [`config`]: server/logging sections and the layered loader
//! - [`host`]: logging initialization and signal handling
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod host;

pub use config::{CliArgs, ENV_PREFIX, LogFormat, LoggingConfig, ServerConfig, load_layered, to_yaml};
