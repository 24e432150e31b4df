use std::env;
use std::time::Duration;

use url::Url;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const FRONTEND_URL: &str = "http://localhost:3000";
const CURRENCY: &str = "usd";
const CATALOG_TIMEOUT_SECS: u64 = 10;
const VIEW_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Everything the service reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub catalog_api_url: Url,
    pub catalog_timeout: Duration,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: Option<String>,
    pub frontend_url: Url,
    pub currency: String,
    /// Idle time after which an itinerary view is evicted.
    pub view_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), e.to_string()))?,
            Err(_) => PORT,
        };

        let catalog_api_url = parse_url("CATALOG_API_URL", &required("CATALOG_API_URL")?)?;

        let catalog_timeout = match env::var("CATALOG_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ConfigError::InvalidValue("CATALOG_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            Err(_) => Duration::from_secs(CATALOG_TIMEOUT_SECS),
        };

        let view_ttl = match env::var("VIEW_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "VIEW_TTL_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    )
                })?,
            Err(_) => Duration::from_secs(VIEW_TTL_SECS),
        };

        let stripe_secret_key = required("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty());

        let frontend_url = parse_url(
            "FRONTEND_URL",
            &env::var("FRONTEND_URL").unwrap_or_else(|_| FRONTEND_URL.to_string()),
        )?;

        let currency = env::var("PAYMENT_CURRENCY")
            .unwrap_or_else(|_| CURRENCY.to_string())
            .to_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidValue(
                "PAYMENT_CURRENCY".to_string(),
                format!("'{}' is not an ISO 4217 code", currency),
            ));
        }

        Ok(Self {
            host,
            port,
            catalog_api_url,
            catalog_timeout,
            stripe_secret_key,
            stripe_webhook_secret,
            frontend_url,
            currency,
            view_ttl,
        })
    }

    /// The frontend origin without a trailing slash, as CORS expects it.
    pub fn frontend_origin(&self) -> String {
        self.frontend_url.origin().ascii_serialization()
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
