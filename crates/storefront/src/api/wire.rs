//! Response shapes of the remote product API.
//!
//! Field names follow the backend's schema (`Categoria_id`, `nombre`,
//! `precioventa`, ...). English aliases are accepted as well. These types are
//! converted into core domain types by the `conversions` module and never
//! leave the `api` module.

use serde::Deserialize;

/// A product row as serialized by the backend.
#[derive(Debug, Deserialize)]
pub struct WireProduct {
    pub id: i64,
    #[serde(rename = "Categoria_id", alias = "categoria_id", alias = "category_id")]
    pub category_id: i64,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "descripcion", alias = "description", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "precioventa", alias = "sale_price")]
    pub sale_price: WireDecimal,
    /// Media library attached to the product.
    #[serde(default)]
    pub library: Option<WireLibrary>,
    /// Flat image list, used when there is no media library.
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// Media attached to a product.
#[derive(Debug, Default, Deserialize)]
pub struct WireLibrary {
    #[serde(default)]
    pub images: Vec<String>,
}

/// A decimal that may be sent either as a JSON number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireDecimal {
    Text(String),
    Number(serde_json::Number),
}

/// Paginated envelope around a product list.
#[derive(Debug, Deserialize)]
pub struct WireProductPage {
    pub data: Vec<WireProduct>,
    /// URL (or any non-null marker) of the next page; null on the last page.
    #[serde(default, alias = "next_page")]
    pub next_page_url: Option<serde_json::Value>,
}

impl WireProductPage {
    /// Whether the envelope announces a further page.
    pub fn has_next(&self) -> bool {
        !matches!(
            self.next_page_url,
            None | Some(serde_json::Value::Null | serde_json::Value::Bool(false))
        )
    }
}

/// Envelope around a single product (`{"data": {...}}`).
#[derive(Debug, Deserialize)]
pub struct WireProductEnvelope {
    pub data: WireProduct,
}

/// A category row as serialized by the backend.
#[derive(Debug, Deserialize)]
pub struct WireCategory {
    pub id: i64,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
}

/// Envelope around a category list.
#[derive(Debug, Deserialize)]
pub struct WireCategoryList {
    pub data: Vec<WireCategory>,
}
