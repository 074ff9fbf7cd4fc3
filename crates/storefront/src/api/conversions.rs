//! Conversion from API response bodies to core domain types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use vitrine_core::{Category, CategoryId, Page, Price, Product, ProductId};

use super::ApiError;
use super::wire::{
    WireCategory, WireCategoryList, WireDecimal, WireProduct, WireProductEnvelope, WireProductPage,
};

/// Decode a product list response.
///
/// Accepts the paginated envelope (`{"data": [...], "next_page_url": ...}`)
/// or a bare array, which is treated as a single final page.
///
/// # Errors
///
/// Returns `ApiError::Parse` for malformed JSON and `ApiError::InvalidPayload`
/// for well-formed JSON of the wrong shape or with out-of-range values.
pub fn decode_product_page(body: &str) -> Result<Page, ApiError> {
    let value: Value = serde_json::from_str(body)?;

    let (rows, has_next) = if value.is_array() {
        (serde_json::from_value::<Vec<WireProduct>>(value)?, false)
    } else if value.is_object() {
        let page: WireProductPage = serde_json::from_value(value)?;
        let has_next = page.has_next();
        (page.data, has_next)
    } else {
        return Err(ApiError::InvalidPayload(format!(
            "expected a product list, got {}",
            json_kind(&value)
        )));
    };

    let items = rows
        .into_iter()
        .map(convert_product)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(items, has_next))
}

/// Decode a single product response, either the bare product object or
/// `{"data": {...}}`.
///
/// # Errors
///
/// Returns `ApiError::Parse` or `ApiError::InvalidPayload` when the body is
/// not a valid product.
pub fn decode_product(body: &str) -> Result<Product, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    if !value.is_object() {
        return Err(ApiError::InvalidPayload(format!(
            "expected a product, got {}",
            json_kind(&value)
        )));
    }

    let row = if value.get("data").is_some_and(Value::is_object) {
        serde_json::from_value::<WireProductEnvelope>(value)?.data
    } else {
        serde_json::from_value::<WireProduct>(value)?
    };
    convert_product(row)
}

/// Decode a category list response (bare array or `{"data": [...]}`).
///
/// # Errors
///
/// Returns `ApiError::Parse` or `ApiError::InvalidPayload` when the body is
/// not a category list.
pub fn decode_categories(body: &str) -> Result<Vec<Category>, ApiError> {
    let value: Value = serde_json::from_str(body)?;

    let rows = if value.is_array() {
        serde_json::from_value::<Vec<WireCategory>>(value)?
    } else if value.is_object() {
        serde_json::from_value::<WireCategoryList>(value)?.data
    } else {
        return Err(ApiError::InvalidPayload(format!(
            "expected a category list, got {}",
            json_kind(&value)
        )));
    };

    Ok(rows.into_iter().map(convert_category).collect())
}

/// Convert one product row, validating stock and price.
///
/// # Errors
///
/// Returns `ApiError::InvalidPayload` for a negative or unparsable price or
/// a stock value outside `0..=u32::MAX`.
fn convert_product(row: WireProduct) -> Result<Product, ApiError> {
    let sale_price = parse_decimal(&row.sale_price)
        .map(Price::new)
        .ok_or_else(|| {
            ApiError::InvalidPayload(format!("product {}: unparsable sale price", row.id))
        })?;
    if sale_price.is_negative() {
        return Err(ApiError::InvalidPayload(format!(
            "product {}: negative sale price {}",
            row.id,
            sale_price.amount()
        )));
    }

    let stock = u32::try_from(row.stock).map_err(|_| {
        ApiError::InvalidPayload(format!("product {}: stock {} out of range", row.id, row.stock))
    })?;

    // Prefer the media library; fall back to a flat image list.
    let images = row
        .library
        .map(|library| library.images)
        .filter(|images| !images.is_empty())
        .or(row.images)
        .unwrap_or_default();

    Ok(Product {
        id: ProductId::new(row.id),
        category_id: CategoryId::new(row.category_id),
        name: row.name,
        description: row.description.unwrap_or_default(),
        stock,
        sale_price,
        images,
    })
}

fn convert_category(row: WireCategory) -> Category {
    Category::new(CategoryId::new(row.id), row.name)
}

fn parse_decimal(value: &WireDecimal) -> Option<Decimal> {
    let text = match value {
        WireDecimal::Text(s) => s.trim().to_string(),
        WireDecimal::Number(n) => n.to_string(),
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
