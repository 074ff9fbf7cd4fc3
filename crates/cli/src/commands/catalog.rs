//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! vitrine categories
//! vitrine browse --pages 3 --category 2 --search "desk"
//! ```

use vitrine_core::{CategoryId, Product};
use vitrine_storefront::{Session, StorefrontConfig};

use super::{CliError, load_pages};

/// Category and search options for `browse`.
#[derive(Debug, Default)]
pub struct BrowseFilter {
    pub categories: Vec<i64>,
    /// Query-string form of the selection; replaces `categories` when set.
    pub query: Option<String>,
    pub search: Option<String>,
}

/// Print every category as `id<TAB>name`.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails.
pub async fn categories(config: &StorefrontConfig) -> Result<(), CliError> {
    let session = Session::from_config(config)?;
    session.load_categories().await?;

    #[allow(clippy::print_stdout)]
    for category in session.categories() {
        println!("{}\t{}", category.id, category.name);
    }
    Ok(())
}

/// Load up to `pages` catalog pages and print the filtered view.
///
/// # Errors
///
/// Returns an error if the client cannot be built or a page fails to load.
/// A failed category fetch only loses the category names in the output.
pub async fn browse(
    config: &StorefrontConfig,
    pages: u32,
    filter: &BrowseFilter,
) -> Result<(), CliError> {
    let session = Session::from_config(config)?;

    if let Err(e) = session.load_categories().await {
        tracing::warn!(error = %e, "Continuing without category names");
    }

    if let Some(query) = &filter.query {
        session.set_selection_from_query(query);
    }
    for id in &filter.categories {
        if !session.selection().contains(CategoryId::new(*id)) {
            session.toggle(CategoryId::new(*id));
        }
    }
    if let Some(term) = &filter.search {
        session.set_search(term.as_str());
    }

    let loaded = load_pages(&session, pages).await?;
    let snapshot = session.catalog();
    let visible = session.visible_products();
    let categories = session.categories();

    #[allow(clippy::print_stdout)]
    {
        for product in &visible {
            let category = categories
                .iter()
                .find(|c| c.id == product.category_id)
                .map_or("-", |c| c.name.as_str());
            println!("{}", format_row(product, category));
        }
        println!();
        println!(
            "{} of {} products shown ({loaded} pages{})",
            visible.len(),
            snapshot.products.len(),
            if snapshot.is_exhausted() { ", end of catalog" } else { "" }
        );
        if let Some(query) = session.selection_query() {
            println!("categories={query}");
        }
    }
    Ok(())
}

fn format_row(product: &Product, category: &str) -> String {
    let stock = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "sold out".to_string()
    };
    format!(
        "{:>6}  {:<32}  {:<16}  {:>10}  {stock}",
        product.id,
        product.name,
        category,
        product.sale_price.display()
    )
}

#[cfg(test)]
mod tests {
    use vitrine_core::{Price, ProductId};

    use super::*;

    fn lamp(stock: u32) -> Product {
        Product {
            id: ProductId::new(12),
            category_id: CategoryId::new(3),
            name: "Desk Lamp".to_string(),
            description: String::new(),
            stock,
            sale_price: Price::from_cents(1999),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_format_row() {
        let row = format_row(&lamp(4), "Home");
        assert!(row.contains("Desk Lamp"));
        assert!(row.contains("$19.99"));
        assert!(row.ends_with("4 in stock"));
    }

    #[test]
    fn test_format_row_sold_out() {
        assert!(format_row(&lamp(0), "-").ends_with("sold out"));
    }
}
