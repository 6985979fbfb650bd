use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::model::{HealthChecks, HealthReport, HealthStatus};

pub const DEFAULT_REGION: &str = "us-central1";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Process-wide configuration, loaded once at startup and passed
/// immutably to the provider components.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cloud project id for the model provider.
    pub project_id: Option<String>,

    /// Cloud region for the model provider.
    pub region: String,

    /// Access token for the static-map imagery provider.
    pub map_token: Option<String>,

    /// API key for the model provider (alternative to a credentials file).
    pub api_key: Option<String>,

    /// Path to a file holding a bearer token for the model provider.
    pub credentials_path: Option<PathBuf>,

    /// Model id used for description generation.
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            region: DEFAULT_REGION.to_string(),
            map_token: None,
            api_key: None,
            credentials_path: None,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

// Credentials must never leak through Debug formatting.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("map_token", &self.map_token.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("credentials_path", &self.credentials_path)
            .field("model", &self.model)
            .finish()
    }
}

impl Config {
    /// Load the optional config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // No config file: everything comes from the environment.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file. `AERIAL_VIEW_CONFIG` overrides the
    /// platform default.
    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("AERIAL_VIEW_CONFIG") {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("dev", "aerial-view", "aerial-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Environment values win over file values; blank values count as
    /// unset.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        if let Some(v) = get("GOOGLE_CLOUD_PROJECT") {
            self.project_id = Some(v);
        }
        if let Some(v) = get("GOOGLE_CLOUD_REGION") {
            self.region = v;
        }
        if let Some(v) = get("MAPBOX_ACCESS_TOKEN") {
            self.map_token = Some(v);
        }
        if let Some(v) = get("GEMINI_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = get("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("AERIAL_VIEW_MODEL") {
            self.model = v;
        }
    }

    pub fn is_project_configured(&self) -> bool {
        self.project_id.is_some()
    }

    pub fn is_token_configured(&self) -> bool {
        self.map_token.is_some()
    }

    /// Readiness report from pure field inspection; never touches the
    /// network.
    pub fn health(&self) -> HealthReport {
        let checks = HealthChecks {
            project_configured: self.is_project_configured(),
            token_configured: self.is_token_configured(),
        };

        let status = if checks.project_configured && checks.token_configured {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        HealthReport { status, checks }
    }
}
