//! Configuration sections shared by every summation host and the layered loader.
//!
//! Layering order: compiled defaults -> YAML file -> `APP__*` environment -> CLI overrides.
//! The last step is applied by the caller, which owns the concrete CLI flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Prefix of environment variables that override configuration values.
///
/// Nested keys are separated with `__`, e.g. `APP__HTTP__BIND_ADDR`.
pub const ENV_PREFIX: &str = "APP__";

/// Process-wide identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Used as the metrics prefix and as a log field.
    pub app_name: String,
    /// Reported in the `x-service-id` header; a fresh UUID is used when unset.
    pub instance_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "summation".to_owned(),
            instance_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `summation=debug,tower_http=info`.
    pub level: String,
    pub format: LogFormat,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Raise the level according to `-v` flags: 1 = info, 2 = debug, 3+ = trace.
    pub fn apply_verbosity(&mut self, verbose: u8) {
        let level = match verbose {
            0 => return,
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        level.clone_into(&mut self.level);
    }
}

/// CLI arguments that flow into the configuration merge.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub print_config: bool,
    pub verbose: u8,
    pub http_port: Option<u16>,
    pub grpc_port: Option<u16>,
}

/// Load a configuration of type `T` from defaults, an optional YAML file and the environment.
///
/// # Errors
/// Returns an error if `path` is given but is not a file, or if any layer fails to deserialize.
pub fn load_layered<T>(path: Option<&Path>) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    if let Some(path) = path {
        if !path.is_file() {
            bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .context("failed to load configuration")
}

/// Render a configuration value as YAML.
///
/// # Errors
/// Returns an error if the value cannot be serialized.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_saphyr::to_string(value).map_err(|e| anyhow::anyhow!("failed to render YAML: {e}"))
}
