//! Client Configuration
//!
//! API endpoint and grid defaults, read from a TOML file in the platform
//! config directory with environment overrides on top.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, ENV_BASE_URL, PAGE_SIZE_OPTIONS, REQUEST_TIMEOUT_SECS,
};
use crate::error::{Error, Result};

const CONFIG_FILE: &str = "config.toml";

/// Settings for the patients API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Deployment label (e.g. "development")
    pub environment: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Page size used before the user picks one
    pub default_page_size: usize,
    /// Page sizes offered by the paginator
    pub page_size_options: Vec<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            environment: "development".to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl ClientConfig {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(CONFIG_FILE);

        #[cfg(debug_assertions)]
        tracing::info!("Client config file: {}", path.display());

        let mut config = Self::load_from(&path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing or empty file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }
    }

    /// Reject settings the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.default_page_size == 0 {
            return Err(Error::Config {
                message: "default_page_size must be positive".to_string(),
            });
        }
        if self.page_size_options.contains(&0) {
            return Err(Error::Config {
                message: "page_size_options must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Join the base URL and an endpoint path
    pub fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.default_page_size).unwrap_or(NonZeroUsize::MIN)
    }
}

/// Platform config directory for this client
///
/// - **Linux**: `~/.config/patients-grid/`
/// - **macOS**: `~/Library/Application Support/org.patients.patients-grid/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\patients\patients-grid\config\`
pub fn config_dir() -> Result<PathBuf> {
    let Some(project_dirs) = ProjectDirs::from("org", "patients", "patients-grid") else {
        return Err(Error::Config {
            message: "Could not determine project directories".to_string(),
        });
    };
    Ok(project_dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ClientConfig::from_toml_str("  \n").expect("parse");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.page_size().get(), 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = ClientConfig::from_toml_str(
            "base_url = \"https://api.example.com/\"\ndefault_page_size = 25\n",
        )
        .expect("parse");
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.page_size_options, PAGE_SIZE_OPTIONS.to_vec());
        assert_eq!(config.build_url("patients"), "https://api.example.com/patients");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let config = ClientConfig {
            default_page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("patients-grid-does-not-exist.toml");
        let config = ClientConfig::load_from(&path).expect("load");
        assert_eq!(config, ClientConfig::default());
    }
}
