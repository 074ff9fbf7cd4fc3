//! HTTP implementation of the product API.

use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, instrument};
use url::Url;
use vitrine_core::{CatalogSource, Category, FetchError, Page, PageCursor, Product, ProductId};

use super::ApiError;
use super::cache::{CacheKey, CacheValue};
use super::conversions::{decode_categories, decode_product, decode_product_page};
use crate::config::ApiConfig;

/// Maximum number of body characters kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

// =============================================================================
// StorefrontApi
// =============================================================================

/// Client for the remote product API.
///
/// Cheap to clone. Product pages, single products and the category list are
/// cached for the configured TTL; failures are never cached.
#[derive(Clone)]
pub struct StorefrontApi {
    inner: Arc<StorefrontApiInner>,
}

struct StorefrontApiInner {
    client: reqwest::Client,
    products_url: Url,
    categories_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontApi {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL cannot be built or the HTTP
    /// client cannot be initialized.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontApiInner {
                client,
                products_url: config.products_url()?,
                categories_url: config.categories_url()?,
                cache,
            }),
        })
    }

    /// GET `url` and return the body of a successful response.
    async fn get_body(&self, url: Url) -> Result<String, ApiError> {
        let response = self
            .inner
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            let excerpt = body.chars().take(BODY_EXCERPT_CHARS).collect::<String>();
            tracing::error!(
                status = %status,
                body = %excerpt,
                "Product API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt,
            });
        }

        Ok(body)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn get_products_page(&self, page: u32) -> Result<Page, ApiError> {
        let cache_key = CacheKey::ProductPage(page);

        // Check cache
        if let Some(CacheValue::ProductPage(cached)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product page");
            return Ok(cached);
        }

        let mut url = self.inner.products_url.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let body = self.get_body(url).await?;
        let decoded = decode_product_page(&body).inspect_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(BODY_EXCERPT_CHARS).collect::<String>(),
                "Failed to decode product page"
            );
        })?;

        debug!(items = decoded.items.len(), has_next = decoded.has_next, "Fetched product page");

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::ProductPage(decoded.clone()))
            .await;

        Ok(decoded)
    }

    /// Get a single product by id (`GET {products}/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (404) for an unknown id, or a decode error
    /// if the body is not a valid product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(cached)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(cached);
        }

        let body = self.get_body(self.product_url(id)?).await?;
        let product = decode_product(&body)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(product.clone()))
            .await;

        Ok(product)
    }

    fn product_url(&self, id: ProductId) -> Result<Url, ApiError> {
        let mut url = self.inner.products_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get the full category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a category list.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(cached)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(cached);
        }

        let body = self.get_body(self.inner.categories_url.clone()).await?;
        let categories = decode_categories(&body)?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// The product list endpoint, without the page parameter.
    #[must_use]
    pub fn products_url(&self) -> &Url {
        &self.inner.products_url
    }
}

impl CatalogSource for StorefrontApi {
    async fn fetch_page(&self, cursor: PageCursor) -> Result<Page, FetchError> {
        self.get_products_page(cursor.page())
            .await
            .map_err(FetchError::from)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, FetchError> {
        self.get_categories().await.map_err(FetchError::from)
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.get_product(id).await.map_err(FetchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_endpoint_urls() {
        let config = ApiConfig::with_base_url("http://127.0.0.1:9/api").unwrap();
        let api = StorefrontApi::new(&config).unwrap();
        assert_eq!(api.products_url().as_str(), "http://127.0.0.1:9/api/products");
        assert_eq!(
            api.inner.categories_url.as_str(),
            "http://127.0.0.1:9/api/categories"
        );
    }

    #[test]
    fn test_product_url_appends_id() {
        let config = ApiConfig::with_base_url("http://127.0.0.1:9/api").unwrap();
        let api = StorefrontApi::new(&config).unwrap();
        assert_eq!(
            api.product_url(ProductId::new(42)).unwrap().as_str(),
            "http://127.0.0.1:9/api/products/42"
        );
    }

    /// A loopback port that was free a moment ago and has nothing listening.
    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let base = format!("http://127.0.0.1:{}/api", closed_port());
        let config = ApiConfig::with_base_url(&base).unwrap();
        let api = StorefrontApi::new(&config).unwrap();

        let err = api.fetch_page(PageCursor::FIRST).await.unwrap_err();
        assert!(err.is_network());
    }
}
