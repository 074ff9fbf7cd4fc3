//! CLI subcommands.

pub mod cart;
pub mod catalog;

use thiserror::Error;
use vitrine_core::{CatalogSource, FetchError, PageResult, ProductId};
use vitrine_storefront::{ApiError, ConfigError, Session};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// A catalog or category fetch failed.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Load pages until `max_pages` have been requested or the catalog is
/// exhausted. Returns the number of pages merged.
async fn load_pages<S: CatalogSource>(
    session: &Session<S>,
    max_pages: u32,
) -> Result<u32, CliError> {
    let mut loaded = 0;
    for _ in 0..max_pages {
        match session.load_next_page().await? {
            PageResult::Loaded(summary) => {
                loaded += 1;
                tracing::info!(
                    page = summary.page.page(),
                    appended = summary.appended,
                    "Loaded page"
                );
                if summary.exhausted {
                    break;
                }
            }
            PageResult::Skipped(_) => break,
        }
    }
    Ok(loaded)
}

/// Add `items` to the session cart. Items outside the loaded pages are
/// fetched individually. Returns the number of items that could not be added.
async fn add_items<S: CatalogSource>(
    session: &Session<S>,
    items: &[(ProductId, u32)],
) -> usize {
    let mut missing = 0;
    for &(id, quantity) in items {
        if session.add_to_cart(id, quantity) {
            continue;
        }
        match session.add_to_cart_fetching(id, quantity).await {
            Ok(true) => tracing::debug!(product_id = %id, "Added product outside loaded pages"),
            Ok(false) => missing += 1,
            Err(e) => {
                tracing::warn!(product_id = %id, error = %e, "Product could not be added");
                missing += 1;
            }
        }
    }
    missing
}
