//! Product builders shared by unit tests.

use rust_decimal::Decimal;

use crate::types::{CategoryId, Price, Product, ProductId};

/// A product with the given id and category, priced at `cents`.
pub fn product(id: i64, category: i64, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        category_id: CategoryId::new(category),
        name: format!("Product {id}"),
        description: format!("Description of product {id}"),
        stock: 10,
        sale_price: Price::new(Decimal::new(cents, 2)),
        images: vec![format!("https://img.example/{id}.jpg")],
    }
}

/// Ids of `products`, in order.
pub fn ids(products: &[Product]) -> Vec<i64> {
    products.iter().map(|p| p.id.as_i64()).collect()
}
