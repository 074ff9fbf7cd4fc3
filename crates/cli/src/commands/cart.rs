//! Cart command.
//!
//! # Usage
//!
//! ```bash
//! vitrine cart --add 12:2 --add 40
//! ```

use vitrine_core::ProductId;
use vitrine_storefront::{Session, StorefrontConfig};

use super::{CliError, add_items, load_pages};

/// Parse a cart item argument of the form `ID` or `ID:QTY`.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` if the id or quantity is not a number.
pub fn parse_item(arg: &str) -> Result<(ProductId, u32), CliError> {
    let (id, quantity) = match arg.split_once(':') {
        Some((id, quantity)) => (id, Some(quantity)),
        None => (arg, None),
    };

    let id = id
        .parse::<ProductId>()
        .map_err(|_| CliError::InvalidArgument(format!("`{arg}`: invalid product id")))?;
    let quantity = match quantity {
        Some(q) => q
            .trim()
            .parse::<u32>()
            .map_err(|_| CliError::InvalidArgument(format!("`{arg}`: invalid quantity")))?,
        None => 1,
    };
    Ok((id, quantity))
}

/// Load up to `pages` pages, add `items` to a cart and print it.
///
/// Items that are not in the loaded catalog are fetched one by one; items
/// that cannot be fetched are reported and skipped.
///
/// # Errors
///
/// Returns an error for malformed item arguments or a failed page load.
pub async fn build(config: &StorefrontConfig, items: &[String], pages: u32) -> Result<(), CliError> {
    let parsed = items
        .iter()
        .map(|arg| parse_item(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let session = Session::from_config(config)?;
    load_pages(&session, pages).await?;

    let missing = add_items(&session, &parsed).await;
    if missing > 0 {
        tracing::warn!(missing, "Some products were not added to the cart");
    }

    let summary = session.cart_summary();

    #[allow(clippy::print_stdout)]
    {
        for line in session.cart_lines() {
            println!(
                "{:>4} x {:<32}  {:>10}",
                line.quantity,
                line.product.name,
                line.line_total().display()
            );
        }
        println!();
        println!("{} items, total {}", summary.item_count, summary.total.display());
        if !summary.description.is_empty() {
            println!("Order: {}", summary.description);
        }
    }
    Ok(())
}
