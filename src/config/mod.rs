#[cfg(feature = "cli")]
pub mod cli;

use crate::core::community::LoaderSettings;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "halo.toml";
pub const ENV_SERVICE_URL: &str = "HALO_SERVICE_URL";
pub const ENV_SERVICE_KEY: &str = "HALO_SERVICE_KEY";
pub const ENV_ORDER_ENDPOINT: &str = "HALO_ORDER_ENDPOINT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub service: ServiceConfig,
    pub community: CommunityConfig,
    pub checkout: CheckoutConfig,
    pub background: BackgroundConfig,
    pub logging: LoggingConfig,
}

/// Endpoint and access key of the community data service. Either may be
/// absent; the loader reports that as "not configured".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    url: Option<String>,
    key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub post_limit: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub frame_rate: u32,
}

/// `RUST_LOG` still takes precedence over `filter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub show_target: bool,
}

impl ServiceConfig {
    pub fn new(url: Option<String>, key: Option<String>) -> Self {
        Self {
            url: present(url),
            key: present(key),
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| is_resolved(url))
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|key| is_resolved(key))
    }

    pub fn is_complete(&self) -> bool {
        self.url().is_some() && self.key().is_some()
    }
}

impl Default for CommunityConfig {
    fn default() -> Self {
        let defaults = LoaderSettings::default();
        Self {
            max_retries: defaults.max_retries,
            retry_delay_ms: defaults.retry_delay.as_millis() as u64,
            post_limit: defaults.post_limit,
        }
    }
}

impl CommunityConfig {
    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            post_limit: self.post_limit,
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self { frame_rate: 60 }
    }
}

/// An empty value or a `${VAR}` placeholder left by substitution counts as absent.
fn is_resolved(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && !(trimmed.starts_with("${") && trimmed.ends_with('}'))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| is_resolved(v))
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Explicit path, else `halo.toml` when present, else defaults. Values
    /// still missing afterwards are taken from the `HALO_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.apply_env_fallbacks();
        Ok(config)
    }

    pub fn apply_env_fallbacks(&mut self) {
        let env = |name: &str| present(std::env::var(name).ok());

        if self.service.url().is_none() {
            self.service.url = env(ENV_SERVICE_URL);
        }
        if self.service.key().is_none() {
            self.service.key = env(ENV_SERVICE_KEY);
        }
        if present(self.checkout.endpoint.clone()).is_none() {
            self.checkout.endpoint = env(ENV_ORDER_ENDPOINT);
        }
    }

    /// 替換環境變數 (例如 ${HALO_SERVICE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SiteError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn order_endpoint(&self) -> Option<&str> {
        self.checkout.endpoint.as_deref().filter(|e| is_resolved(e))
    }

    pub fn require_order_endpoint(&self) -> Result<&str> {
        let endpoint = self.order_endpoint();
        validate_required_field("checkout.endpoint", &endpoint).copied()
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = self.service.url() {
            validate_url("service.url", url)?;
        }
        if let Some(key) = self.service.key() {
            validate_non_empty_string("service.key", key)?;
        }

        validate_range("community.max_retries", self.community.max_retries, 0, 10)?;
        validate_range("community.retry_delay_ms", self.community.retry_delay_ms, 0, 60_000)?;
        validate_range("community.post_limit", self.community.post_limit, 1, 50)?;

        if let Some(endpoint) = self.order_endpoint() {
            validate_url("checkout.endpoint", endpoint)?;
        }

        validate_range("background.frame_rate", self.background.frame_rate, 1, 240)?;

        if let Some(filter) = &self.logging.filter {
            tracing_subscriber::EnvFilter::try_new(filter).map_err(|e| {
                SiteError::InvalidConfigValueError {
                    field: "logging.filter".to_string(),
                    value: filter.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
