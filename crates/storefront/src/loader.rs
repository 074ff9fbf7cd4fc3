//! Product catalog loader.
//!
//! Drives the [`Catalog`] state machine against a [`CatalogSource`]. All
//! methods take `&self`: the catalog lives in a `RefCell` that is borrowed
//! only around synchronous transitions, never across the fetch `.await`.
//! A second `load_next_page` issued while one is pending therefore sees
//! `Loading` and returns immediately.

use std::cell::{Cell, RefCell};

use tracing::{debug, instrument, warn};
use vitrine_core::{
    Catalog, CatalogSource, FetchError, LoadState, PageCursor, PageResult, Product, SkipReason,
};

/// Owned copy of the catalog at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub state: LoadState,
    /// Next page to be requested.
    pub cursor: PageCursor,
    pub pages_loaded: u32,
}

impl CatalogSnapshot {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, LoadState::Exhausted)
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&FetchError> {
        match &self.state {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<&Catalog> for CatalogSnapshot {
    fn from(catalog: &Catalog) -> Self {
        Self {
            products: catalog.products().to_vec(),
            state: catalog.state().clone(),
            cursor: catalog.cursor(),
            pages_loaded: catalog.pages_loaded(),
        }
    }
}

/// Paginated loader over a [`CatalogSource`].
pub struct CatalogLoader<S> {
    source: S,
    catalog: RefCell<Catalog>,
    closed: Cell<bool>,
}

impl<S: CatalogSource> CatalogLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            catalog: RefCell::new(Catalog::new()),
            closed: Cell::new(false),
        }
    }

    /// Fetch and merge the page at the current cursor.
    ///
    /// Returns `Ok(PageResult::Skipped(_))` without contacting the source
    /// when a fetch is already in flight, the catalog is exhausted, or the
    /// loader is closed.
    ///
    /// # Errors
    ///
    /// Returns the source's [`FetchError`]. The catalog keeps its products
    /// and cursor, so calling again retries the same page.
    #[instrument(skip(self))]
    pub async fn load_next_page(&self) -> Result<PageResult, FetchError> {
        if self.closed.get() {
            return Ok(PageResult::Skipped(SkipReason::Closed));
        }

        let begun = self.catalog.borrow_mut().begin_load();
        let cursor = match begun {
            Ok(cursor) => cursor,
            Err(reason) => {
                debug!(?reason, "Skipping page load");
                return Ok(PageResult::Skipped(reason));
            }
        };

        // Unwinds `Loading` if this future is dropped before completion.
        let _pending = PendingLoad {
            catalog: &self.catalog,
            cursor,
        };

        debug!(page = cursor.page(), "Fetching product page");
        let fetched = self.source.fetch_page(cursor).await;

        if self.closed.get() {
            debug!(page = cursor.page(), "Discarding page fetched after close");
            return Ok(PageResult::Skipped(SkipReason::Closed));
        }

        let outcome = self.catalog.borrow_mut().complete_load(cursor, fetched);
        match &outcome {
            Ok(PageResult::Loaded(summary)) => debug!(
                page = summary.page.page(),
                appended = summary.appended,
                duplicates = summary.duplicates,
                exhausted = summary.exhausted,
                "Merged product page"
            ),
            Ok(PageResult::Skipped(reason)) => debug!(?reason, "Page completion skipped"),
            Err(e) => warn!(page = cursor.page(), error = %e, "Product page failed to load"),
        }
        outcome
    }

    /// Tear the loader down. Fetches resolving afterwards are discarded and
    /// further loads are skipped.
    pub fn close(&self) {
        self.closed.set(true);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot::from(&*self.catalog.borrow())
    }

    /// Run `f` against the current catalog without cloning it.
    ///
    /// `f` must not call back into this loader's loading methods.
    pub fn with_catalog<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.catalog.borrow())
    }
}

/// Guard held across the fetch `.await` of a page load.
///
/// On drop it calls [`Catalog::abort_load`], which only acts while the
/// guarded fetch is still the one in flight. After `complete_load` the state
/// has moved on and the drop is a no-op.
struct PendingLoad<'a> {
    catalog: &'a RefCell<Catalog>,
    cursor: PageCursor,
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if let Ok(mut catalog) = self.catalog.try_borrow_mut() {
            catalog.abort_load(self.cursor);
        }
    }
}
