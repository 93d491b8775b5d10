//! Application configuration.
//!
//! Loaded in layers: defaults -> YAML -> `APP__*` env -> CLI overrides.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use summation_bootstrap::{CliArgs, LoggingConfig, ServerConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub grpc: GrpcConfig,
    pub metrics: MetricsConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub enabled: bool,
    pub bind_addr: String,
    pub body_limit_bytes: usize,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: "0.0.0.0:8090".to_owned(),
            body_limit_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrpcConfig {
    pub enabled: bool,
    pub listen_addr: String,
    /// Serve `grpc.reflection.v1` next to the summation service.
    pub reflection: bool,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: "0.0.0.0:50051".to_owned(),
            reflection: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub bind_addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: "0.0.0.0:9091".to_owned(),
        }
    }
}

/// Where `POST /sum` sends its work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process core.
    #[default]
    Local,
    /// Remote `SummationService` at `backend.endpoint`.
    Grpc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub endpoint: String,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub rpc_timeout: Duration,
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Local,
            endpoint: "http://127.0.0.1:50051".to_owned(),
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the YAML file at `path` (if any), then `APP__*` variables.
    ///
    /// # Errors
    /// Returns an error if the file is missing or a layer does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        summation_bootstrap::load_layered(path)
    }

    /// Apply the CLI layer on top of the loaded configuration.
    ///
    /// # Errors
    /// Returns an error if a port override targets an unparsable address.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(port) = args.http_port {
            self.http.bind_addr = replace_port(&self.http.bind_addr, port)?;
        }
        if let Some(port) = args.grpc_port {
            self.grpc.listen_addr = replace_port(&self.grpc.listen_addr, port)?;
        }
        self.logging.apply_verbosity(args.verbose);
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if !is_metric_name(&self.server.app_name) {
            bail!(
                "server.app_name '{}' must match [a-zA-Z_][a-zA-Z0-9_]*",
                self.server.app_name
            );
        }
        if !self.http.enabled && !self.grpc.enabled {
            bail!("at least one of http.enabled or grpc.enabled must be true");
        }
        if self.http.enabled {
            parse_addr("http.bind_addr", &self.http.bind_addr)?;
            if self.http.body_limit_bytes == 0 {
                bail!("http.body_limit_bytes must be greater than zero");
            }
            if self.http.request_timeout.is_zero() {
                bail!("http.request_timeout must be greater than zero");
            }
        }
        if self.grpc.enabled {
            parse_addr("grpc.listen_addr", &self.grpc.listen_addr)?;
        }
        if self.metrics.enabled {
            parse_addr("metrics.bind_addr", &self.metrics.bind_addr)?;
        }
        if self.backend.kind == BackendKind::Grpc && self.backend.endpoint.trim().is_empty() {
            bail!("backend.endpoint is required when backend.kind is grpc");
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_yaml(&self) -> Result<String> {
        summation_bootstrap::to_yaml(self)
    }
}

pub(crate) fn parse_addr(key: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .with_context(|| format!("invalid {key} '{value}'"))
}

fn replace_port(addr: &str, port: u16) -> Result<String> {
    let mut parsed: SocketAddr = addr
        .parse()
        .with_context(|| format!("cannot override port of '{addr}'"))?;
    parsed.set_port(port);
    Ok(parsed.to_string())
}

fn is_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    const APP_VARS: [&str; 4] = [
        "APP__HTTP__BIND_ADDR",
        "APP__HTTP__REQUEST_TIMEOUT",
        "APP__BACKEND__KIND",
        "APP__GRPC__ENABLED",
    ];

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.http.bind_addr, "0.0.0.0:8090");
        assert_eq!(cfg.grpc.listen_addr, "0.0.0.0:50051");
        assert_eq!(cfg.metrics.bind_addr, "0.0.0.0:9091");
        assert_eq!(cfg.backend.kind, BackendKind::Local);
    }

    #[test]
    fn yaml_durations_use_humantime() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"http:\n  request_timeout: 250ms\nbackend:\n  kind: grpc\n  rpc_timeout: 2s\n")
            .unwrap();

        temp_env::with_vars_unset(APP_VARS, || {
            let cfg = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(cfg.http.request_timeout, Duration::from_millis(250));
            assert_eq!(cfg.backend.kind, BackendKind::Grpc);
            assert_eq!(cfg.backend.rpc_timeout, Duration::from_secs(2));
            assert_eq!(cfg.backend.connect_timeout, Duration::from_secs(10));
        });
    }

    #[test]
    fn env_layer_overrides_nested_keys() {
        temp_env::with_vars(
            [
                ("APP__HTTP__BIND_ADDR", Some("127.0.0.1:8091")),
                ("APP__GRPC__ENABLED", Some("false")),
                ("APP__HTTP__REQUEST_TIMEOUT", None),
                ("APP__BACKEND__KIND", None),
            ],
            || {
                let cfg = AppConfig::load(None).unwrap();
                assert_eq!(cfg.http.bind_addr, "127.0.0.1:8091");
                assert!(!cfg.grpc.enabled);
            },
        );
    }

    #[test]
    fn cli_overrides_ports_and_verbosity() {
        let mut cfg = AppConfig::default();
        let args = CliArgs {
            http_port: Some(18090),
            grpc_port: Some(15051),
            verbose: 2,
            ..CliArgs::default()
        };
        cfg.apply_cli_overrides(&args).unwrap();
        assert_eq!(cfg.http.bind_addr, "0.0.0.0:18090");
        assert_eq!(cfg.grpc.listen_addr, "0.0.0.0:15051");
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn port_override_on_bad_address_fails() {
        let mut cfg = AppConfig::default();
        cfg.http.bind_addr = "localhost".to_owned();
        let args = CliArgs {
            http_port: Some(1),
            ..CliArgs::default()
        };
        assert!(cfg.apply_cli_overrides(&args).is_err());
    }

    #[test]
    fn validate_rejects_both_adapters_disabled() {
        let mut cfg = AppConfig::default();
        cfg.http.enabled = false;
        cfg.grpc.enabled = false;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn validate_rejects_bad_bind_addr() {
        let mut cfg = AppConfig::default();
        cfg.http.bind_addr = "not-an-address".to_owned();
        assert!(cfg.validate().is_err());

        cfg.http.enabled = false;
        cfg.validate().unwrap();
    }

    #[test]
    fn validate_rejects_grpc_backend_without_endpoint() {
        let mut cfg = AppConfig::default();
        cfg.backend.kind = BackendKind::Grpc;
        cfg.backend.endpoint = "  ".to_owned();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_body_limit() {
        let mut cfg = AppConfig::default();
        cfg.http.body_limit_bytes = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_metric_prefix() {
        let mut cfg = AppConfig::default();
        cfg.server.app_name = "sum-service".to_owned();
        assert!(cfg.validate().is_err());
        cfg.server.app_name = "sum_service".to_owned();
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_dump_round_trips_through_loader() {
        let cfg = AppConfig::default();
        let yaml = cfg.to_yaml().unwrap();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        temp_env::with_vars_unset(APP_VARS, || {
            let loaded = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(loaded, cfg);
        });
    }

    #[test]
    fn shipped_example_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../config/summation.yaml");
        temp_env::with_vars_unset(APP_VARS, || {
            let loaded = AppConfig::load(Some(&path)).unwrap();
            assert_eq!(loaded, AppConfig::default());
        });
    }
}
