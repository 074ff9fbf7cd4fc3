//! The fetch seam between the state engine and the remote catalog.
//!
//! The engine never performs transport itself. It asks a [`CatalogSource`]
//! for a page at a [`PageCursor`] and consumes the result.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Category, Product, ProductId};

/// Errors surfaced by a catalog fetch.
///
/// Both kinds are recoverable: the triggering action can simply be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request failed or the server answered with a non-OK status.
    #[error("network error: {0}")]
    Network(String),
    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Position of the next page to request.
///
/// Pages are numbered from 1, matching the remote `?page=N` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(u32);

impl PageCursor {
    /// Cursor for the first page.
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(page: u32) -> Self {
        Self(page)
    }

    /// Page number to send to the server.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.0
    }

    /// Cursor for the page after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.0)
    }
}

/// One page of products as delivered by a source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    /// Items in server-supplied order.
    pub items: Vec<Product>,
    /// Whether the server signalled a further page.
    pub has_next: bool,
}

impl Page {
    #[must_use]
    pub const fn new(items: Vec<Product>, has_next: bool) -> Self {
        Self { items, has_next }
    }

    /// A final page.
    #[must_use]
    pub const fn last(items: Vec<Product>) -> Self {
        Self::new(items, false)
    }
}

/// Remote catalog consumed by the engine.
///
/// Implemented over HTTP by the storefront crate and by in-memory fakes in
/// tests.
// Futures are polled on a single-threaded event loop, so no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Fetch the product page at `cursor`.
    async fn fetch_page(&self, cursor: PageCursor) -> Result<Page, FetchError>;

    /// Fetch the full category list.
    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError>;

    /// Fetch a single product by id, for product detail views.
    ///
    /// The result is never merged into the paginated catalog.
    async fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError>;
}
