use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::header::HeaderValue;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::payment::MAX_LIST_LIMIT;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing processor secret (set {0})")]
    MissingSecret(&'static str),
    #[error("invalid processor base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("processor base URL must be http or https, got {0}")]
    UnsupportedScheme(String),
    #[error("processor API version {0:?} is not a valid header value")]
    InvalidApiVersion(String),
    #[error("default list limit must be between 1 and 100, got {got}")]
    InvalidListLimit { got: u32 },
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Values used when a caller leaves an operation argument out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayDefaults {
    pub currency: String,
    pub description: String,
    pub list_limit: u32,
}

impl Default for GatewayDefaults {
    fn default() -> Self {
        Self {
            currency: "AED".to_string(),
            description: "First Test Charge".to_string(),
            list_limit: 3,
        }
    }
}

#[derive(Debug)]
pub struct Config {
    pub secret_key: SecretString,
    pub api_base: Url,
    pub api_version: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub defaults: GatewayDefaults,
}

/// Shape shared by the environment and the TOML file before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    secret_key: Option<String>,
    api_base: Option<String>,
    api_version: Option<String>,
    timeout_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    currency: Option<String>,
    description: Option<String>,
    list_limit: Option<u32>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same keys as [`Config::from_env`], read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = RawConfig {
            secret_key: lookup("STRIPE_SECRET"),
            api_base: lookup("STRIPE_API_BASE"),
            api_version: lookup("STRIPE_API_VERSION"),
            timeout_ms: lookup("PROCESSOR_TIMEOUT_MS").and_then(|v| v.parse().ok()),
            connect_timeout_ms: lookup("PROCESSOR_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok()),
            currency: lookup("DEFAULT_CURRENCY"),
            description: lookup("DEFAULT_DESCRIPTION"),
            list_limit: lookup("DEFAULT_LIST_LIMIT").and_then(|v| v.parse().ok()),
        };
        Self::build(raw, "STRIPE_SECRET")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let raw: RawConfig = toml::from_str(&text)?;
        Self::build(raw, "secret_key")
    }

    fn build(raw: RawConfig, secret_source: &'static str) -> Result<Self, ConfigError> {
        let secret_key = raw
            .secret_key
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret(secret_source))?;

        let api_base = parse_base_url(raw.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))?;

        let api_version = raw.api_version.filter(|v| !v.trim().is_empty());
        if let Some(version) = &api_version {
            if HeaderValue::from_str(version).is_err() {
                return Err(ConfigError::InvalidApiVersion(version.clone()));
            }
        }

        let fallback = GatewayDefaults::default();
        let list_limit = raw.list_limit.unwrap_or(fallback.list_limit);
        if !(1..=MAX_LIST_LIMIT).contains(&list_limit) {
            return Err(ConfigError::InvalidListLimit { got: list_limit });
        }

        Ok(Self {
            secret_key: SecretString::new(secret_key),
            api_base,
            api_version,
            request_timeout: Duration::from_millis(raw.timeout_ms.unwrap_or(5000)),
            connect_timeout: Duration::from_millis(raw.connect_timeout_ms.unwrap_or(2000)),
            defaults: GatewayDefaults {
                currency: raw.currency.unwrap_or(fallback.currency),
                description: raw.description.unwrap_or(fallback.description),
                list_limit,
            },
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[("STRIPE_SECRET", "sk_test_123")])).unwrap();

        assert_eq!(config.secret_key.expose_secret(), "sk_test_123");
        assert_eq!(config.api_base.as_str(), "https://api.stripe.com/");
        assert_eq!(config.request_timeout, Duration::from_millis(5000));
        assert_eq!(config.defaults, GatewayDefaults::default());
        assert_eq!(config.api_version, None);
    }

    #[test]
    fn test_missing_secret() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret("STRIPE_SECRET")));

        let err = Config::from_lookup(lookup_from(&[("STRIPE_SECRET", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(_)));
    }

    #[test]
    fn test_overrides_from_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("STRIPE_SECRET", "sk_test_123"),
            ("STRIPE_API_BASE", "http://localhost:12111"),
            ("STRIPE_API_VERSION", "2023-10-16"),
            ("PROCESSOR_TIMEOUT_MS", "750"),
            ("DEFAULT_CURRENCY", "USD"),
            ("DEFAULT_LIST_LIMIT", "10"),
        ]))
        .unwrap();

        assert_eq!(config.api_base.as_str(), "http://localhost:12111/");
        assert_eq!(config.api_version.as_deref(), Some("2023-10-16"));
        assert_eq!(config.request_timeout, Duration::from_millis(750));
        assert_eq!(config.defaults.currency, "USD");
        assert_eq!(config.defaults.list_limit, 10);
        assert_eq!(config.defaults.description, "First Test Charge");
    }

    #[test]
    fn test_rejects_bad_base_url_and_limit() {
        let err = Config::from_lookup(lookup_from(&[
            ("STRIPE_SECRET", "sk_test_123"),
            ("STRIPE_API_BASE", "ftp://example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedScheme(_)));

        let err = Config::from_lookup(lookup_from(&[
            ("STRIPE_SECRET", "sk_test_123"),
            ("DEFAULT_LIST_LIMIT", "500"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListLimit { got: 500 }));
    }

    #[test]
    fn test_rejects_api_version_that_cannot_be_a_header() {
        let err = Config::from_lookup(lookup_from(&[
            ("STRIPE_SECRET", "sk_test_123"),
            ("STRIPE_API_VERSION", "2023-10-16\nX"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiVersion(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
secret_key = "sk_test_file"
api_base = "http://127.0.0.1:8080"
timeout_ms = 1500
description = "Order #42"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.secret_key.expose_secret(), "sk_test_file");
        assert_eq!(config.api_base.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.defaults.description, "Order #42");
        assert_eq!(config.defaults.currency, "AED");
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = Config::from_lookup(lookup_from(&[("STRIPE_SECRET", "sk_live_supersecret")])).unwrap();
        assert!(!format!("{:?}", config).contains("sk_live_supersecret"));
    }
}
