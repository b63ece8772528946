//! Application configuration.
//!
//! Defaults work out of the box; a `config.toml` next to the binary can
//! override them, and environment variables win over both.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming the model artifact location.
pub const MODEL_PATH_ENV: &str = "ANOMALY_MODEL_PATH";
/// Environment variable overriding the bind port.
pub const PORT_ENV: &str = "ANOMALY_PORT";
/// Environment variable for the allowed CORS origin.
pub const CORS_ORIGIN_ENV: &str = "CORS_ALLOW_ORIGIN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by the CORS layer.
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origin: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Location of the pre-trained outlier model artifact. Absence of the
    /// file is only reported when the statistical strategy is invoked.
    pub model_path: PathBuf,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/outlier_model.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub detection: DetectionConfig,
}

impl AppConfig {
    /// Load configuration: file (when present), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn apply_env(&mut self) {
        if let Ok(path) = env::var(MODEL_PATH_ENV) {
            self.detection.model_path = PathBuf::from(path);
        }
        if let Some(port) = env::var(PORT_ENV).ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(origin) = env::var(CORS_ORIGIN_ENV) {
            self.server.cors_origin = origin;
        }
    }
}
