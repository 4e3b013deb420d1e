//! SOAR platform connection settings.

use serde::{Deserialize, Serialize};

/// Where the SOAR REST API lives and how to authenticate to it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoarApiConfig {
    /// Base URL of the SOAR platform, e.g. `https://soar.example.com`.
    #[serde(default)]
    pub url: Option<String>,

    /// Application key sent as the `AppKey` header.
    #[serde(default)]
    pub app_key: Option<String>,

    /// Environment variable holding the application key.
    #[serde(default = "default_app_key_env")]
    pub app_key_env: String,
}

// Keeps the app key out of logs.
impl std::fmt::Debug for SoarApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoarApiConfig")
            .field("url", &self.url)
            .field("app_key", &self.app_key.as_ref().map(|_| "<redacted>"))
            .field("app_key_env", &self.app_key_env)
            .finish()
    }
}

impl Default for SoarApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            app_key: None,
            app_key_env: default_app_key_env(),
        }
    }
}

impl SoarApiConfig {
    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

fn default_app_key_env() -> String {
    "SOAR_APP_KEY".to_string()
}
