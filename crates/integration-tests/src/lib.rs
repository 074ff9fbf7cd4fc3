//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - HTTP client against a mock product API
//! - `session_properties` - end-to-end session behaviour over HTTP
//!
//! Every test starts its own [`MockApi`], an in-process `axum` server bound
//! to an ephemeral port on `127.0.0.1`, so tests never need a real backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vitrine_storefront::ApiConfig;

// =============================================================================
// Canned responses
// =============================================================================

/// A response the mock API will serve.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub retry_after: Option<u64>,
}

impl MockResponse {
    /// `200 OK` with a JSON body.
    #[must_use]
    pub fn json(body: &Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            retry_after: None,
        }
    }

    /// `200 OK` with a raw body, for malformed payloads.
    #[must_use]
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            retry_after: None,
        }
    }

    /// An error status with a JSON message body.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({ "message": "mock error" }).to_string(),
            retry_after: None,
        }
    }

    /// `429 Too Many Requests` with a `Retry-After` header.
    #[must_use]
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::status(429)
        }
    }
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response();
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// A product row in the backend's wire format.
#[must_use]
pub fn product_json(id: i64, category: i64, price: &str) -> Value {
    json!({
        "id": id,
        "Categoria_id": category,
        "nombre": format!("Product {id}"),
        "descripcion": format!("Description of product {id}"),
        "stock": 10,
        "precioventa": price,
        "library": { "images": [format!("https://img.example/{id}.jpg")] }
    })
}

/// A paginated product envelope.
#[must_use]
pub fn page_json(page: u32, rows: &[Value], has_next: bool) -> Value {
    let next = has_next.then(|| format!("http://localhost/api/products?page={}", page + 1));
    json!({
        "current_page": page,
        "data": rows,
        "next_page_url": next,
    })
}

// =============================================================================
// MockApi
// =============================================================================

#[derive(Default)]
struct MockState {
    pages: Mutex<HashMap<u32, MockResponse>>,
    categories: Mutex<Option<MockResponse>>,
    products: Mutex<HashMap<i64, MockResponse>>,
    page_hits: Mutex<HashMap<u32, usize>>,
    product_hits: Mutex<HashMap<i64, usize>>,
    category_hits: Mutex<usize>,
}

/// In-process product API.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// Unconfigured pages and products answer `404`; unconfigured categories
    /// answer `[]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/products", get(products))
            .route("/api/products/{id}", get(product))
            .route("/api/categories", get(categories))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                report_server_error(&e);
            }
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the mock, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// API configuration pointing at this mock.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is rejected.
    pub fn api_config(&self) -> Result<ApiConfig, vitrine_storefront::ConfigError> {
        ApiConfig::with_base_url(&self.base_url())
    }

    pub fn set_page(&self, page: u32, response: MockResponse) {
        lock(&self.state.pages).insert(page, response);
    }

    /// Response for `GET /api/products/{id}`.
    pub fn set_product(&self, id: i64, response: MockResponse) {
        lock(&self.state.products).insert(id, response);
    }

    pub fn set_categories(&self, response: MockResponse) {
        *lock(&self.state.categories) = Some(response);
    }

    /// Number of requests received for `page`.
    #[must_use]
    pub fn page_hits(&self, page: u32) -> usize {
        lock(&self.state.page_hits).get(&page).copied().unwrap_or(0)
    }

    /// Number of product page requests received in total.
    #[must_use]
    pub fn total_page_hits(&self) -> usize {
        lock(&self.state.page_hits).values().sum()
    }

    /// Number of single-product requests received for `id`.
    #[must_use]
    pub fn product_hits(&self, id: i64) -> usize {
        lock(&self.state.product_hits).get(&id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn category_hits(&self) -> usize {
        *lock(&self.state.category_hits)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn products(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(page) = params.get("page").and_then(|p| p.parse::<u32>().ok()) else {
        return MockResponse::status(400).into_response();
    };

    *lock(&state.page_hits).entry(page).or_insert(0) += 1;

    lock(&state.pages)
        .get(&page)
        .cloned()
        .unwrap_or_else(|| MockResponse::status(404))
        .into_response()
}

async fn product(State(state): State<Arc<MockState>>, Path(id): Path<i64>) -> Response {
    *lock(&state.product_hits).entry(id).or_insert(0) += 1;

    lock(&state.products)
        .get(&id)
        .cloned()
        .unwrap_or_else(|| MockResponse::status(404))
        .into_response()
}

async fn categories(State(state): State<Arc<MockState>>) -> Response {
    *lock(&state.category_hits) += 1;

    lock(&state.categories)
        .clone()
        .unwrap_or_else(|| MockResponse::json(&json!([])))
        .into_response()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[allow(clippy::print_stderr)]
fn report_server_error(e: &std::io::Error) {
    eprintln!("mock API server stopped: {e}");
}
