//! Configuration loader: defaults, then an optional TOML file, then
//! environment overrides.
//!
//! ```toml
//! endpoint = "http://localhost:8000/get_weather"
//! cache_dir = "/var/cache/weatherdash"
//! request_timeout_secs = 60
//! ```

use crate::cache::error::CacheError;
use crate::utils::get_cache_dir;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/get_weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const CONFIG_DIR_NAME: &str = "weatherdash";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_CONFIG: &str = "WEATHERDASH_CONFIG";
pub const ENV_ENDPOINT: &str = "WEATHERDASH_ENDPOINT";
pub const ENV_CACHE_DIR: &str = "WEATHERDASH_CACHE_DIR";
pub const ENV_TIMEOUT_SECS: &str = "WEATHERDASH_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] Box<toml::de::Error>),

    #[error("Invalid config:\n - {}", .0.join("\n - "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// URL the weather request is POSTed to.
    pub endpoint: String,
    /// Where saved queries live. `None` means the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_dir: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DashboardConfig {
    /// Loads configuration from `explicit`, `$WEATHERDASH_CONFIG` or the
    /// platform config directory (in that order), then applies environment
    /// overrides and validates the result.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |name| std::env::var(name).ok())
    }

    /// Same as [`DashboardConfig::load`] with a custom environment lookup.
    pub fn load_with<F>(explicit: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::locate(explicit, &env)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        let mut issues = config.apply_env(&env);
        issues.extend(config.issues());
        if issues.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    fn locate<F>(explicit: Option<&Path>, env: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| non_empty(env(ENV_CONFIG)).map(PathBuf::from));
        if let Some(path) = requested {
            if !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(path));
        }

        let fallback = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        Ok(fallback.filter(|p| p.exists()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), Box::new(e)))
    }

    // Returns the overrides that could not be applied.
    fn apply_env<F>(&mut self, env: &F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = non_empty(env(ENV_ENDPOINT)) {
            self.endpoint = endpoint;
        }
        if let Some(dir) = non_empty(env(ENV_CACHE_DIR)) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        let mut issues = Vec::new();
        if let Some(raw) = non_empty(env(ENV_TIMEOUT_SECS)) {
            match raw.parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => issues.push(format!(
                    "{} must be an integer > 0, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                )),
            }
        }
        issues
    }

    /// Reports every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    fn issues(&self) -> Vec<String> {
        let mut issues: Vec<String> = Vec::new();

        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            issues.push("endpoint must not be empty".into());
        } else if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            issues.push(format!("endpoint must be an http(s) URL, got '{}'", endpoint));
        }
        if self.request_timeout_secs == 0 {
            issues.push("request_timeout_secs must be > 0".into());
        }
        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().is_empty() {
                issues.push("cache_dir must not be empty".into());
            }
        }

        issues
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured cache directory, or the platform default.
    pub fn resolve_cache_dir(&self) -> Result<PathBuf, CacheError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_cache_dir(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
