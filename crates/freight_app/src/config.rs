use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use freight_core::ShipmentDefaults;
use freight_engine::{BatchSettings, QuoteSettings};
use freight_logging::{freight_info, LogDestination, LogLevel};

pub const DEFAULT_CONFIG_PATH: &str = "freight.ron";
const ENV_API_URL: &str = "FREIGHT_API_URL";
const ENV_API_TOKEN: &str = "FREIGHT_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_calls: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: freight_core::DEFAULT_MAX_CALLS,
            window_secs: freight_core::DEFAULT_WINDOW.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub destination: LogDestination,
    pub level: LogLevel,
}

/// Settings read from `freight.ron`; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    /// Sent verbatim as the `Authorization` header.
    pub api_token: String,
    pub contract_segment_id: String,
    pub default_origin_state: String,
    pub default_origin_city: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub rate_limit: RateLimitConfig,
    pub output_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let defaults = ShipmentDefaults::default();
        Self {
            api_url: String::new(),
            api_token: String::new(),
            contract_segment_id: defaults.contract_segment_id,
            default_origin_state: defaults.origin_state,
            default_origin_city: defaults.origin_city,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            rate_limit: RateLimitConfig::default(),
            output_dir: PathBuf::from("output"),
            poll_interval_ms: 500,
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("cannot read config {}", path.display()))
            }
        };
        ron::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// `load` followed by the process environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Ok(Self::load(path)?.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies `FREIGHT_API_URL` / `FREIGHT_API_TOKEN`; blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(url) = non_blank(ENV_API_URL) {
            freight_info!("api_url taken from {}", ENV_API_URL);
            self.api_url = url;
        }
        if let Some(token) = non_blank(ENV_API_TOKEN) {
            self.api_token = token;
        }
        self
    }

    pub fn quote_settings(&self) -> QuoteSettings {
        QuoteSettings {
            endpoint: self.api_url.clone(),
            credential: self.api_token.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..QuoteSettings::default()
        }
    }

    pub fn shipment_defaults(&self) -> ShipmentDefaults {
        ShipmentDefaults {
            contract_segment_id: self.contract_segment_id.clone(),
            origin_state: self.default_origin_state.clone(),
            origin_city: self.default_origin_city.clone(),
        }
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            defaults: self.shipment_defaults(),
            max_calls: self.rate_limit.max_calls,
            window: Duration::from_secs(self.rate_limit.window_secs),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    /// Pretty RON with the credential blanked out, for `freight config`.
    pub fn to_redacted_ron(&self) -> Result<String> {
        let mut shown = self.clone();
        if !shown.api_token.is_empty() {
            shown.api_token = "***".to_string();
        }
        ron::ser::to_string_pretty(&shown, ron::ser::PrettyConfig::new())
            .context("cannot serialize config")
    }
}
