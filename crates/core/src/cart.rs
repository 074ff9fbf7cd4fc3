//! Shopping cart aggregate with quantity-merge semantics.
//!
//! The cart holds at most one line per product id and no line ever has a
//! quantity below 1. Invalid input (unknown id, zero quantity) is normalized
//! or ignored; no operation here can fail or perform I/O.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Price, Product, ProductId};

/// One product entry in the cart plus its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// `sale_price * quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.sale_price.times(self.quantity)
    }
}

/// Derived figures for the cart page and order description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub line_count: usize,
    /// Sum of quantities across lines.
    pub item_count: u64,
    pub total: Price,
    /// Product names joined with ", ", in line order.
    pub description: String,
}

/// The shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same id has `quantity` added to it; otherwise
    /// a new line is appended. A quantity of 0 counts as 1.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(product_id = %product.id, quantity = line.quantity, "Merged cart line");
        } else {
            self.lines.push(CartLine {
                product: product.clone(),
                quantity,
            });
            debug!(product_id = %product.id, quantity, "Added cart line");
        }
    }

    /// Set the quantity of the line for `id`, clamping below 1 up to 1.
    ///
    /// Unknown ids are ignored. Use [`Cart::remove_from_cart`] to delete.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) {
        if let Some(line) = self.line_mut(id) {
            line.quantity = quantity.max(1);
        }
    }

    /// Add one unit to the line for `id`.
    pub fn increment(&mut self, id: ProductId) {
        if let Some(line) = self.line_mut(id) {
            line.quantity = line.quantity.saturating_add(1);
        }
    }

    /// Take one unit from the line for `id`, never going below 1.
    pub fn decrement(&mut self, id: ProductId) {
        if let Some(line) = self.line_mut(id) {
            line.quantity = line.quantity.saturating_sub(1).max(1);
        }
    }

    /// Delete the line for `id`. Returns whether a line was removed.
    pub fn remove_from_cart(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id() != id);
        before != self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum over lines of `sale_price * quantity`, at full precision.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            line_count: self.lines.len(),
            item_count: self.item_count(),
            total: self.total(),
            description: self
                .lines
                .iter()
                .map(|line| line.product.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }
}
