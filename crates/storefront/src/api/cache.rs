//! Cache types for product API responses.

use vitrine_core::{Category, Page, Product, ProductId};

/// Cache key for product pages, single products and the category list.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    ProductPage(u32),
    Product(ProductId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    ProductPage(Page),
    Product(Product),
    Categories(Vec<Category>),
}
