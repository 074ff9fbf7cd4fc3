//! Vitrine Storefront - product API client and browsing session.
//!
//! This crate connects the state engine in `vitrine-core` to the remote
//! product API:
//! - [`api`] - HTTP client with response caching, implements `CatalogSource`
//! - [`loader`] - async pagination over any `CatalogSource`
//! - [`session`] - the per-session state object used by a UI or the CLI
//! - [`config`] - environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod loader;
pub mod session;

#[cfg(test)]
mod testing;

pub use api::{ApiError, StorefrontApi};
pub use config::{ApiConfig, ConfigError, StorefrontConfig};
pub use loader::{CatalogLoader, CatalogSnapshot};
pub use session::Session;
