//! Application configuration: JSON file with environment overrides

use crate::filter::DEFAULT_MAX_PRICE;
use crate::FlightError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const AMADEUS_AUTH_URL: &str = "https://test.api.amadeus.com/v1/security/oauth2/token";
pub const AMADEUS_FLIGHT_OFFERS_URL: &str = "https://test.api.amadeus.com/v2/shopping/flight-offers";

pub const CLIENT_ID_ENV: &str = "AMADEUS_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "AMADEUS_CLIENT_SECRET";

/// Amadeus endpoints and client credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmadeusConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub offers_url: String,
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            auth_url: AMADEUS_AUTH_URL.to_string(),
            offers_url: AMADEUS_FLIGHT_OFFERS_URL.to_string(),
        }
    }
}

/// Values sent with every search
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub currency_code: String,
    pub max_results: u32,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            currency_code: "USD".to_string(),
            max_results: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub default_max_price: f64,
    pub detail_delay_ms: u64,  // 0 opens flight details immediately
    pub notice_ttl_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_max_price: DEFAULT_MAX_PRICE,
            detail_delay_ms: 700,
            notice_ttl_ms: 5000,
        }
    }
}

impl SessionConfig {
    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub amadeus: AmadeusConfig,
    pub search: SearchDefaults,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Override credentials with the `AMADEUS_CLIENT_ID` /
    /// `AMADEUS_CLIENT_SECRET` environment variables when they are set.
    pub fn apply_env(mut self) -> Self {
        if let Some(id) = env_value(CLIENT_ID_ENV) {
            self.amadeus.client_id = Some(id);
        }
        if let Some(secret) = env_value(CLIENT_SECRET_ENV) {
            self.amadeus.client_secret = Some(secret);
        }
        self
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, FlightError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| FlightError::ConfigError(format!("{}: {}", path.display(), e)))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, FlightError> {
    serde_json::from_str(content).map_err(|e| FlightError::ConfigError(e.to_string()))
}
