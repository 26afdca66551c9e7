use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::server::ROUTES;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

/// Locations of the dataset and model artifacts shared by both front-ends
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/cleaned_data.csv"),
            model_path: PathBuf::from("data/charges_model.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

/// Load configuration from `path` (optional) layered with
/// `CHARGES_PREDICTOR__*` environment variables
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    load_config_with_env(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("CHARGES_PREDICTOR").separator("__")
}

fn load_config_with_env(path: &Path, env: config::Environment) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(env)
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.host.trim().is_empty() {
        anyhow::bail!("Server host cannot be empty");
    }

    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}' (expected 'text' or 'json')", other),
    }

    if cfg.artifacts.dataset_path.as_os_str().is_empty() {
        anyhow::bail!("Dataset path cannot be empty");
    }

    if cfg.artifacts.model_path.as_os_str().is_empty() {
        anyhow::bail!("Model path cannot be empty");
    }

    if cfg.metrics.enabled {
        if !cfg.metrics.endpoint.starts_with('/') {
            anyhow::bail!(
                "Metrics endpoint '{}' must start with '/'",
                cfg.metrics.endpoint
            );
        }
        if ROUTES.contains(&cfg.metrics.endpoint.as_str()) {
            anyhow::bail!(
                "Metrics endpoint '{}' collides with an application route",
                cfg.metrics.endpoint
            );
        }
    }

    Ok(())
}
