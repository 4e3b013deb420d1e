//! Configuration types for the SOAR MCP server.
//!
//! Configuration is loaded from an optional YAML file (`soar-mcp.yaml`),
//! then overlaid with environment variables and finally with command line
//! flags by the binary.
//!
//! ```yaml
//! soar:
//!   url: https://soar.example.com
//!   app_key_env: SOAR_APP_KEY
//! mcp:
//!   transport: http
//!   port: 3000
//! integrations: [CrowdStrikeFalcon, Slack]
//! catalog_dir: catalog
//! ```

pub mod mcp;
pub mod soar;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use mcp::{McpConfig, Transport};
pub use soar::SoarApiConfig;

/// Environment variable overriding `soar.url`.
pub const ENV_SOAR_URL: &str = "SOAR_URL";

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoarConfig {
    /// SOAR platform connection.
    #[serde(default)]
    pub soar: SoarApiConfig,

    /// MCP server configuration.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Integrations whose actions are exposed as tools.
    #[serde(default)]
    pub integrations: Vec<String>,

    /// Directory with additional integration catalogs.
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SoarConfig {
    /// Load configuration from a YAML file.
    ///
    /// Relative `catalog_dir` paths are resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        if let Some(catalog_dir) = &config.catalog_dir {
            if catalog_dir.is_relative() {
                let base_dir = path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));
                config.catalog_dir = Some(base_dir.join(catalog_dir));
            }
        }

        Ok(config)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// `SOAR_URL` replaces `soar.url`; the variable named by
    /// `soar.app_key_env` replaces `soar.app_key`. Empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SOAR_URL).filter(|v| !v.is_empty()) {
            self.soar.url = Some(url);
        }
        if let Some(key) = lookup(&self.soar.app_key_env).filter(|v| !v.is_empty()) {
            self.soar.app_key = Some(key);
        }
    }

    /// Check that the configuration is complete enough to serve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.soar.base_url().is_none() {
            return Err(ConfigError::Config(format!(
                "SOAR URL is not configured. Set soar.url in the config file or the {} environment variable",
                ENV_SOAR_URL
            )));
        }
        if self.mcp.is_http() && self.mcp.port == 0 {
            return Err(ConfigError::Config("mcp.port must not be 0".to_string()));
        }
        Ok(())
    }
}
