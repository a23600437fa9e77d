use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: Url,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Read settings from the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = get_or_default(&lookup, "CLINIC_API_URL", DEFAULT_API_URL);
        let api_url = Url::parse(&raw_url).map_err(|_| ConfigError::InvalidValue {
            name: "CLINIC_API_URL",
            value: raw_url.clone(),
        })?;

        let raw_timeout = get_or_default(&lookup, "CLINIC_HTTP_TIMEOUT_SECS", "");
        let http_timeout = if raw_timeout.is_empty() {
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        } else {
            raw_timeout
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    name: "CLINIC_HTTP_TIMEOUT_SECS",
                    value: raw_timeout.clone(),
                })?
        };

        let api_token = lookup("CLINIC_API_TOKEN").filter(|token| !token.trim().is_empty());

        Ok(ClientConfig {
            api_url,
            api_token,
            http_timeout,
        })
    }
}

fn get_or_default<F>(lookup: &F, name: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
