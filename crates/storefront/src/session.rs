//! One storefront browsing session.
//!
//! [`Session`] owns every piece of client state: the catalog loader, the
//! category directory, the cart, the scroll trigger and the search term.
//! It is created once per session and passed by reference; there is no
//! global state. Commands take `&self` so a pending page load never blocks
//! cart or filter updates.

use std::cell::RefCell;

use tracing::{debug, instrument, warn};
use vitrine_core::{
    Cart, CartLine, CartSummary, Category, CategoryDirectory, CategoryId, CategoryState,
    CatalogSource, FetchError, PageResult, Price, Product, ProductId, ScrollTrigger, Selection,
    Viewport, filter, matches_search,
};

use crate::api::{ApiError, StorefrontApi};
use crate::config::StorefrontConfig;
use crate::loader::{CatalogLoader, CatalogSnapshot};

/// Client-side state of a single browsing session.
pub struct Session<S> {
    loader: CatalogLoader<S>,
    directory: RefCell<CategoryDirectory>,
    cart: RefCell<Cart>,
    trigger: ScrollTrigger,
    search: RefCell<String>,
}

impl Session<StorefrontApi> {
    /// Build a session backed by the HTTP product API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be constructed.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let api = StorefrontApi::new(&config.api)?;
        Ok(Self::new(api, ScrollTrigger::new(config.prefetch_margin)))
    }
}

impl<S: CatalogSource> Session<S> {
    pub fn new(source: S, trigger: ScrollTrigger) -> Self {
        Self {
            loader: CatalogLoader::new(source),
            directory: RefCell::new(CategoryDirectory::default()),
            cart: RefCell::new(Cart::new()),
            trigger,
            search: RefCell::new(String::new()),
        }
    }

    pub const fn source(&self) -> &S {
        self.loader.source()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load the next catalog page. See [`CatalogLoader::load_next_page`].
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the catalog is left intact for a retry.
    pub async fn load_next_page(&self) -> Result<PageResult, FetchError> {
        self.loader.load_next_page().await
    }

    /// Fetch the category list into the directory.
    ///
    /// On failure the directory keeps any previously loaded categories and
    /// records the error.
    ///
    /// # Errors
    ///
    /// Returns the fetch error.
    #[instrument(skip(self))]
    pub async fn load_categories(&self) -> Result<(), FetchError> {
        let fetched = self.loader.source().fetch_categories().await;
        if self.loader.is_closed() {
            debug!("Discarding categories fetched after close");
            return Ok(());
        }

        match fetched {
            Ok(categories) => {
                debug!(count = categories.len(), "Loaded categories");
                self.directory.borrow_mut().replace(categories);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Categories failed to load");
                self.directory.borrow_mut().mark_failed(e.clone());
                Err(e)
            }
        }
    }

    /// Look up a single product for a detail view.
    ///
    /// A product already in the catalog is returned without a request.
    /// Otherwise it is fetched from the source. The fetched product is never
    /// merged into the catalog, so pagination is unaffected.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, e.g. `Network` for an unknown id.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError> {
        if let Some(product) = self.loader.with_catalog(|c| c.get(id).cloned()) {
            return Ok(product);
        }

        debug!("Product not in catalog, fetching");
        self.loader
            .source()
            .fetch_product(id)
            .await
            .inspect_err(|e| warn!(error = %e, "Product failed to load"))
    }

    /// React to a scroll event.
    ///
    /// Returns `Ok(None)` when the viewport is not at the bottom or the
    /// catalog is exhausted; otherwise the result of the page load.
    ///
    /// # Errors
    ///
    /// Returns the fetch error of a triggered load.
    pub async fn on_scroll(&self, viewport: Viewport) -> Result<Option<PageResult>, FetchError> {
        let exhausted = self.loader.with_catalog(vitrine_core::Catalog::is_exhausted);
        if !self.trigger.should_load(&viewport, exhausted) {
            return Ok(None);
        }
        self.load_next_page().await.map(Some)
    }

    /// End the session. Fetches still in flight are discarded on arrival.
    pub fn close(&self) {
        self.loader.close();
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Toggle a category in the selection. Returns whether it is now selected.
    pub fn toggle(&self, id: CategoryId) -> bool {
        self.directory.borrow_mut().toggle(id)
    }

    /// Replace the selection from a `categories` query-string value.
    pub fn set_selection_from_query(&self, value: &str) {
        self.directory
            .borrow_mut()
            .set_selection(Selection::parse_query_value(value));
    }

    pub fn clear_selection(&self) {
        self.directory.borrow_mut().clear_selection();
    }

    pub fn set_search(&self, term: impl Into<String>) {
        *self.search.borrow_mut() = term.into();
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add a loaded product to the cart by id.
    ///
    /// Returns `false` and leaves the cart unchanged when `id` is not in the
    /// catalog.
    pub fn add_to_cart(&self, id: ProductId, quantity: u32) -> bool {
        let product = self.loader.with_catalog(|c| c.get(id).cloned());
        product.is_some_and(|product| {
            self.cart.borrow_mut().add_to_cart(&product, quantity);
            true
        })
    }

    /// Add a product to the cart by id, fetching it when it is not loaded.
    ///
    /// Returns `Ok(false)` when the session was closed while the product was
    /// being fetched; the cart is then left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the cart is left unchanged.
    pub async fn add_to_cart_fetching(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, FetchError> {
        let product = self.fetch_product(id).await?;
        if self.loader.is_closed() {
            debug!(product_id = %id, "Discarding cart add after close");
            return Ok(false);
        }
        self.add_product_to_cart(&product, quantity);
        Ok(true)
    }

    /// Add `product` to the cart whether or not it is in the catalog.
    pub fn add_product_to_cart(&self, product: &Product, quantity: u32) {
        self.cart.borrow_mut().add_to_cart(product, quantity);
    }

    pub fn update_quantity(&self, id: ProductId, quantity: u32) {
        self.cart.borrow_mut().update_quantity(id, quantity);
    }

    pub fn increment(&self, id: ProductId) {
        self.cart.borrow_mut().increment(id);
    }

    pub fn decrement(&self, id: ProductId) {
        self.cart.borrow_mut().decrement(id);
    }

    pub fn remove_from_cart(&self, id: ProductId) -> bool {
        self.cart.borrow_mut().remove_from_cart(id)
    }

    pub fn clear_cart(&self) {
        self.cart.borrow_mut().clear();
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    #[must_use]
    pub fn catalog(&self) -> CatalogSnapshot {
        self.loader.snapshot()
    }

    /// Products passing the category selection and the search term, in
    /// catalog order. Recomputed on every call.
    #[must_use]
    pub fn visible_products(&self) -> Vec<Product> {
        let directory = self.directory.borrow();
        let term = self.search.borrow();
        self.loader.with_catalog(|catalog| {
            filter(catalog.products(), directory.selection())
                .into_iter()
                .filter(|product| matches_search(product, &term))
                .cloned()
                .collect()
        })
    }

    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.directory.borrow().categories().to_vec()
    }

    #[must_use]
    pub fn category_state(&self) -> CategoryState {
        self.directory.borrow().state().clone()
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.directory.borrow().selection().clone()
    }

    /// The selection as a `categories` query-string value.
    #[must_use]
    pub fn selection_query(&self) -> Option<String> {
        self.directory.borrow().selection().to_query_value()
    }

    #[must_use]
    pub fn search(&self) -> String {
        self.search.borrow().clone()
    }

    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.cart.borrow().lines().to_vec()
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.cart.borrow().total()
    }

    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        self.cart.borrow().summary()
    }
}
