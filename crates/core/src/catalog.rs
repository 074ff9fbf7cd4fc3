//! The de-duplicated, append-only product catalog and its load state machine.
//!
//! A load moves through explicit states:
//!
//! ```text
//!            begin_load                 complete_load(Ok, has_next)
//!   Idle ──────────────────▶ Loading ─────────────────────────────▶ Idle
//!    ▲                        │  │     complete_load(Ok, !has_next)
//!    │ begin_load (retry)     │  └───────────────────────────────▶ Exhausted
//!  Failed ◀───────────────────┘
//!          complete_load(Err)
//! ```
//!
//! `Loading` is the only mutual-exclusion primitive: while it is set, further
//! `begin_load` calls are skipped rather than queued. `Failed` is not
//! `Loading`, so a failed page can be retried with the same cursor.
//! A fetch abandoned mid-flight is unwound with [`Catalog::abort_load`],
//! which returns to `Idle` without advancing the cursor.

use std::collections::HashSet;

use tracing::debug;

use crate::source::{FetchError, Page, PageCursor};
use crate::types::{Product, ProductId};

/// Load state of a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Ready to request the page at the current cursor.
    #[default]
    Idle,
    /// A fetch for `cursor` is in flight.
    Loading { cursor: PageCursor },
    /// The last fetch failed. The cursor was not advanced.
    Failed(FetchError),
    /// The server reported there is no further page.
    Exhausted,
}

/// Why a load request did not issue a fetch or apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Another page is already being fetched.
    InFlight,
    /// Every page has been loaded.
    Exhausted,
    /// The owning session was torn down before the fetch resolved.
    Closed,
    /// The completion does not belong to the fetch currently in flight.
    Stale,
}

/// Counts produced by merging one batch of products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    /// Products appended to the catalog.
    pub appended: usize,
    /// Incoming products dropped because their id was already present.
    pub duplicates: usize,
}

/// Outcome of a successfully applied page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    /// The page that was merged.
    pub page: PageCursor,
    pub appended: usize,
    pub duplicates: usize,
    /// Whether this was the final page.
    pub exhausted: bool,
}

/// Result of a load request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageResult {
    Loaded(PageSummary),
    Skipped(SkipReason),
}

impl PageResult {
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    #[must_use]
    pub const fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Loaded(_) => None,
            Self::Skipped(reason) => Some(*reason),
        }
    }
}

/// Ordered product collection accumulated across pagination.
///
/// No two products share an id. Products are only ever appended; a product
/// already present always wins over an incoming copy so previously rendered
/// order stays stable.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    seen: HashSet<ProductId>,
    cursor: PageCursor,
    state: LoadState,
    pages_loaded: u32,
}

impl Catalog {
    /// An empty catalog positioned at the first page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // State machine
    // =========================================================================

    /// Enter `Loading` and return the cursor to fetch.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when a fetch is already in flight or the
    /// catalog is exhausted. The state is left untouched in both cases.
    pub fn begin_load(&mut self) -> Result<PageCursor, SkipReason> {
        match self.state {
            LoadState::Loading { .. } => Err(SkipReason::InFlight),
            LoadState::Exhausted => Err(SkipReason::Exhausted),
            LoadState::Idle | LoadState::Failed(_) => {
                self.state = LoadState::Loading {
                    cursor: self.cursor,
                };
                Ok(self.cursor)
            }
        }
    }

    /// Apply the result of the fetch started by [`Catalog::begin_load`].
    ///
    /// A completion for any cursor other than the one in flight is ignored
    /// and reported as [`SkipReason::Stale`].
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged after recording it as
    /// [`LoadState::Failed`]. Products and cursor are not modified.
    pub fn complete_load(
        &mut self,
        cursor: PageCursor,
        result: Result<Page, FetchError>,
    ) -> Result<PageResult, FetchError> {
        if self.state != (LoadState::Loading { cursor }) {
            debug!(%cursor, state = ?self.state, "Ignoring stale page completion");
            return Ok(PageResult::Skipped(SkipReason::Stale));
        }

        match result {
            Ok(page) => {
                let exhausted = !page.has_next;
                let stats = self.merge(page.items);
                self.cursor = cursor.next();
                self.pages_loaded = self.pages_loaded.saturating_add(1);
                self.state = if exhausted {
                    LoadState::Exhausted
                } else {
                    LoadState::Idle
                };
                Ok(PageResult::Loaded(PageSummary {
                    page: cursor,
                    appended: stats.appended,
                    duplicates: stats.duplicates,
                    exhausted,
                }))
            }
            Err(err) => {
                self.state = LoadState::Failed(err.clone());
                Err(err)
            }
        }
    }

    /// Return from `Loading { cursor }` to `Idle` after the fetch for
    /// `cursor` was abandoned before completing.
    ///
    /// Does nothing unless that exact fetch is still in flight. Returns
    /// whether the state changed.
    pub fn abort_load(&mut self, cursor: PageCursor) -> bool {
        if self.state != (LoadState::Loading { cursor }) {
            return false;
        }
        debug!(%cursor, "Abandoned page load");
        self.state = LoadState::Idle;
        true
    }

    /// Append `items` whose id is not yet present, in the given order.
    ///
    /// Duplicates inside `items` itself are collapsed to their first
    /// occurrence. Only reachable through [`Catalog::complete_load`].
    pub(crate) fn merge(&mut self, items: impl IntoIterator<Item = Product>) -> MergeStats {
        let mut stats = MergeStats::default();
        for product in items {
            if self.seen.insert(product.id) {
                self.products.push(product);
                stats.appended += 1;
            } else {
                stats.duplicates += 1;
            }
        }
        stats
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        if !self.seen.contains(&id) {
            return None;
        }
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.seen.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }

    /// Cursor of the next page to request.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    #[must_use]
    pub const fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, LoadState::Exhausted)
    }

    /// The error from the most recent load, if it failed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&FetchError> {
        match &self.state {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}
