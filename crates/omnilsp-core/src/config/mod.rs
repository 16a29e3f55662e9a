//! Configuration types and loading.
//!
//! The backend base URL is deliberately configuration-driven: it can come
//! from a TOML file, the `OMNILSP_BACKEND_URL` environment variable, or the
//! `--backend-url` CLI flag (the CLI applies the override).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default OmniSharp HTTP port.
const DEFAULT_BASE_URL: &str = "http://localhost:2000";

/// Default backend request deadline in seconds.
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Main configuration for the omnilsp server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Backend connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Connection settings for the OmniSharp backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the OmniSharp HTTP API, e.g. `http://localhost:2000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request deadline for backend calls, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// Default paths checked in order:
    /// 1. `$OMNILSP_CONFIG` environment variable
    /// 2. `./omnilsp.toml` (current directory)
    /// 3. `~/.config/omnilsp/omnilsp.toml` (Linux/macOS)
    ///
    /// Falls back to built-in defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing an existing config fails.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("OMNILSP_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        let local_config = PathBuf::from("omnilsp.toml");
        if local_config.exists() {
            return Self::load_from(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("omnilsp").join("omnilsp.toml");
            if user_config.exists() {
                return Self::load_from(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist or parsing fails.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty or non-HTTP base URL or a zero
    /// timeout.
    pub fn validate(&self) -> Result<()> {
        if self.backend.base_url.is_empty() {
            return Err(Error::Config("backend.base_url cannot be empty".to_string()));
        }
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                self.backend.base_url
            )));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(Error::Config(
                "backend.timeout_seconds must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
