//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `VITRINE_API_BASE_URL` - Product API base URL (default: `http://localhost:8000/api`)
//! - `VITRINE_PRODUCTS_PATH` - Product list path under the base URL (default: `products`)
//! - `VITRINE_CATEGORIES_PATH` - Category list path under the base URL (default: `categories`)
//! - `VITRINE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `VITRINE_CACHE_TTL_SECS` - Response cache time-to-live (default: 300)
//! - `VITRINE_CACHE_CAPACITY` - Maximum cached responses (default: 1000)
//! - `VITRINE_PREFETCH_MARGIN_PX` - Load the next page this many pixels before
//!   the bottom of the document (default: 0)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_PRODUCTS_PATH: &str = "products";
const DEFAULT_CATEGORIES_PATH: &str = "categories";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront session configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote product API configuration
    pub api: ApiConfig,
    /// Pixels before the document end at which the next page is requested
    pub prefetch_margin: f64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote product API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Product list path relative to `base_url`
    pub products_path: String,
    /// Category list path relative to `base_url`
    pub categories_path: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time-to-live for cached responses
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let prefetch_margin = parse_or_default(&lookup, "VITRINE_PREFETCH_MARGIN_PX", 0.0_f64)?;
        if !prefetch_margin.is_finite() || prefetch_margin < 0.0 {
            return Err(ConfigError::InvalidEnvVar(
                "VITRINE_PREFETCH_MARGIN_PX".to_string(),
                "must be a non-negative number".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig::from_lookup(&lookup)?,
            prefetch_margin,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
        })
    }
}

impl ApiConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_base = lookup("VITRINE_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_base)
            .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_API_BASE_URL".to_string(), e))?;

        let timeout_secs = parse_or_default(lookup, "VITRINE_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "VITRINE_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            products_path: lookup("VITRINE_PRODUCTS_PATH")
                .unwrap_or_else(|| DEFAULT_PRODUCTS_PATH.to_string()),
            categories_path: lookup("VITRINE_CATEGORIES_PATH")
                .unwrap_or_else(|| DEFAULT_CATEGORIES_PATH.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            cache_ttl: Duration::from_secs(parse_or_default(
                lookup,
                "VITRINE_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?),
            cache_capacity: parse_or_default(lookup, "VITRINE_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
        })
    }

    /// API configuration pointing at `base_url` with every other setting at
    /// its default.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_API_BASE_URL".to_string(), e))?;
        Ok(Self {
            base_url,
            products_path: DEFAULT_PRODUCTS_PATH.to_string(),
            categories_path: DEFAULT_CATEGORIES_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        })
    }

    /// Absolute URL of the product list endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured path cannot be joined to the base URL.
    pub fn products_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(self.products_path.trim_start_matches('/'))
    }

    /// Absolute URL of the category list endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured path cannot be joined to the base URL.
    pub fn categories_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(self.categories_path.trim_start_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an absolute http(s) URL and make sure its path ends in `/` so that
/// relative endpoint paths are appended rather than replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8000/api/");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.api.cache_capacity, 1000);
        assert!(config.prefetch_margin.abs() < f64::EPSILON);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_endpoint_urls_keep_base_path() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.api.products_url().unwrap().as_str(),
            "http://localhost:8000/api/products"
        );
        assert_eq!(
            config.api.categories_url().unwrap().as_str(),
            "http://localhost:8000/api/categories"
        );
    }

    #[test]
    fn test_custom_paths() {
        let config = config_from(&[
            ("VITRINE_API_BASE_URL", "https://shop.example.com/api/v2/"),
            ("VITRINE_PRODUCTS_PATH", "/productos"),
            ("VITRINE_CATEGORIES_PATH", "categorias"),
        ])
        .unwrap();
        assert_eq!(
            config.api.products_url().unwrap().as_str(),
            "https://shop.example.com/api/v2/productos"
        );
        assert_eq!(
            config.api.categories_url().unwrap().as_str(),
            "https://shop.example.com/api/v2/categorias"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = config_from(&[("VITRINE_API_BASE_URL", "ftp://example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "VITRINE_API_BASE_URL"));

        assert!(config_from(&[("VITRINE_API_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(config_from(&[("VITRINE_HTTP_TIMEOUT_SECS", "ten")]).is_err());
        assert!(config_from(&[("VITRINE_HTTP_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("VITRINE_PREFETCH_MARGIN_PX", "-10")]).is_err());

        let config = config_from(&[("VITRINE_PREFETCH_MARGIN_PX", " 250 ")]).unwrap();
        assert!((config.prefetch_margin - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_sentry_dsn_is_ignored() {
        let config = config_from(&[("SENTRY_DSN", "  ")]).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
