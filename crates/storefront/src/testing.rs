//! In-memory `CatalogSource` for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use rust_decimal::Decimal;
use vitrine_core::{
    CatalogSource, Category, CategoryId, FetchError, Page, PageCursor, Price, Product, ProductId,
};

pub fn product(id: i64, category: i64, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        category_id: CategoryId::new(category),
        name: format!("Product {id}"),
        description: String::new(),
        stock: 5,
        sale_price: Price::new(Decimal::new(cents, 2)),
        images: Vec::new(),
    }
}

pub fn ids(products: &[Product]) -> Vec<i64> {
    products.iter().map(|p| p.id.as_i64()).collect()
}

/// Replays scripted responses. Every fetch yields once before resolving so
/// that concurrent callers observe it as in flight.
#[derive(Default)]
pub struct ScriptedSource {
    pages: RefCell<VecDeque<Result<Page, FetchError>>>,
    categories: RefCell<Option<Result<Vec<Category>, FetchError>>>,
    requested: RefCell<Vec<PageCursor>>,
    category_calls: Cell<usize>,
    products: RefCell<HashMap<ProductId, Result<Product, FetchError>>>,
    product_calls: Cell<usize>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, result: Result<Page, FetchError>) -> Self {
        self.pages.borrow_mut().push_back(result);
        self
    }

    pub fn with_categories(self, result: Result<Vec<Category>, FetchError>) -> Self {
        *self.categories.borrow_mut() = Some(result);
        self
    }

    pub fn with_product(self, id: i64, result: Result<Product, FetchError>) -> Self {
        self.products.borrow_mut().insert(ProductId::new(id), result);
        self
    }

    pub fn page_calls(&self) -> usize {
        self.requested.borrow().len()
    }

    pub fn requested(&self) -> Vec<u32> {
        self.requested.borrow().iter().map(|c| c.page()).collect()
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.get()
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.get()
    }
}

impl CatalogSource for ScriptedSource {
    async fn fetch_page(&self, cursor: PageCursor) -> Result<Page, FetchError> {
        self.requested.borrow_mut().push(cursor);
        let next = self.pages.borrow_mut().pop_front();
        tokio::task::yield_now().await;
        next.unwrap_or_else(|| Ok(Page::last(Vec::new())))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError> {
        self.category_calls.set(self.category_calls.get() + 1);
        let next = self.categories.borrow().clone();
        tokio::task::yield_now().await;
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.product_calls.set(self.product_calls.get() + 1);
        let found = self.products.borrow().get(&id).cloned();
        tokio::task::yield_now().await;
        found.unwrap_or_else(|| Err(FetchError::Network("HTTP 404".to_string())))
    }
}
