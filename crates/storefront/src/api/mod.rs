//! Remote product API client.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, response bodies decoded with `serde_json`
//! - The remote API is the source of truth; nothing is persisted locally
//! - In-memory caching via `moka` for product pages and categories
//!   (5 minute TTL by default)
//!
//! # Endpoints
//!
//! - `GET {base}/products?page=N` - paginated product list
//! - `GET {base}/categories` - category list
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine_storefront::api::StorefrontApi;
//!
//! let api = StorefrontApi::new(&config.api)?;
//! let page = api.get_products_page(1).await?;
//! let categories = api.get_categories().await?;
//! ```

mod cache;
mod client;
pub mod conversions;
mod wire;

pub use client::StorefrontApi;

use thiserror::Error;
use vitrine_core::FetchError;

/// Errors that can occur when talking to the product API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but contained invalid values.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(_)
            | ApiError::Status { .. }
            | ApiError::RateLimited(_)
            | ApiError::InvalidUrl(_) => Self::Network(err.to_string()),
            ApiError::Parse(_) | ApiError::InvalidPayload(_) => Self::Decode(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");

        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_status_errors_are_network_failures() {
        let err = FetchError::from(ApiError::Status {
            status: 500,
            body: String::new(),
        });
        assert!(err.is_network());
        assert!(FetchError::from(ApiError::RateLimited(1)).is_network());
    }

    #[test]
    fn test_payload_errors_are_decode_failures() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(FetchError::from(ApiError::Parse(parse)).is_decode());

        let err = FetchError::from(ApiError::InvalidPayload("negative price".to_string()));
        assert_eq!(err, FetchError::Decode("Invalid payload: negative price".to_string()));
    }
}
