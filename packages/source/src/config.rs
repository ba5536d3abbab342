//! Collaborator connection settings.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables:
//!
//! | Variable                    | Field          |
//! |-----------------------------|----------------|
//! | `VIOLENCE_API_URL`          | `api_base_url` |
//! | `VIOLENCE_API_TIMEOUT_SECS` | `timeout_secs` |
//! | `VIOLENCE_API_MAX_RETRIES`  | `max_retries`  |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SourceError;
use crate::retry::RetryPolicy;

/// Default collaborator endpoint.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/api/violencias";

const URL_VAR: &str = "VIOLENCE_API_URL";
const TIMEOUT_VAR: &str = "VIOLENCE_API_TIMEOUT_SECS";
const RETRIES_VAR: &str = "VIOLENCE_API_MAX_RETRIES";

/// Connection settings for [`crate::client::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the incident collection.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for transient failures.
    pub max_retries: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl DashboardConfig {
    /// Loads settings from `path` (if given), then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self, SourceError> {
        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses settings from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Toml`] if the text is not valid TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, SourceError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies overrides read through `lookup` (normally the process
    /// environment).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if a numeric override does not
    /// parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(value) = lookup(TIMEOUT_VAR) {
            self.timeout_secs = parse_var(TIMEOUT_VAR, &value)?;
        }
        if let Some(value) = lookup(RETRIES_VAR) {
            self.max_retries = parse_var(RETRIES_VAR, &value)?;
        }
        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy derived from [`Self::max_retries`].
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    fn validate(&self) -> Result<(), SourceError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(SourceError::Config {
                message: format!("api_base_url must be an http(s) URL: {}", self.api_base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(SourceError::Config {
                message: "timeout_secs must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, SourceError> {
    value.trim().parse().map_err(|_| SourceError::Config {
        message: format!("{name} must be a non-negative integer, got {value:?}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_point_at_local_collaborator() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_policy().max_retries, 3);
    }

    #[test]
    fn toml_keeps_defaults_for_missing_keys() {
        let config = DashboardConfig::from_toml_str(
            r#"
            api_base_url = "https://example.org/api/violencias/"
            max_retries = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://example.org/api/violencias");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn environment_overrides_file_values() {
        let vars: BTreeMap<&str, &str> = [
            (URL_VAR, "http://10.0.0.2:5000/api/violencias"),
            (TIMEOUT_VAR, " 5 "),
        ]
        .into_iter()
        .collect();

        let mut config = DashboardConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.2:5000/api/violencias");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn invalid_override_is_a_config_error() {
        let mut config = DashboardConfig::default();
        let result = config.apply_overrides(|name| (name == RETRIES_VAR).then(|| "many".to_string()));
        assert!(matches!(result, Err(SourceError::Config { .. })));
    }

    #[test]
    fn rejects_non_http_urls() {
        let config = DashboardConfig {
            api_base_url: "ftp://example.org".to_string(),
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
