//! Integration tests for the product API client.
//!
//! Each test runs `StorefrontApi` against its own in-process mock server.

use serde_json::json;
use vitrine_core::{CatalogSource, CategoryId, PageCursor, Price, ProductId};
use vitrine_integration_tests::{MockApi, MockResponse, page_json, product_json};
use vitrine_storefront::{ApiError, StorefrontApi};

async fn setup() -> (MockApi, StorefrontApi) {
    let mock = MockApi::start().await.expect("mock server should start");
    let api = StorefrontApi::new(&mock.api_config().expect("valid config"))
        .expect("client should build");
    (mock, api)
}

// =============================================================================
// Product Pages
// =============================================================================

#[tokio::test]
async fn test_fetch_paginated_page() {
    let (mock, api) = setup().await;
    mock.set_page(
        1,
        MockResponse::json(&page_json(
            1,
            &[product_json(1, 2, "10.00"), product_json(2, 3, "5.50")],
            true,
        )),
    );

    let page = api.fetch_page(PageCursor::FIRST).await.unwrap();

    assert!(page.has_next);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, ProductId::new(1));
    assert_eq!(page.items[0].category_id, CategoryId::new(2));
    assert_eq!(page.items[1].sale_price, Price::from_cents(550));
    assert_eq!(
        page.items[0].primary_image(),
        Some("https://img.example/1.jpg")
    );
    assert_eq!(mock.page_hits(1), 1);
}

#[tokio::test]
async fn test_bare_array_is_final_page() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::json(&json!([product_json(7, 1, "3.25")])));

    let page = api.fetch_page(PageCursor::FIRST).await.unwrap();
    assert!(!page.has_next);
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn test_pages_are_cached() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::json(&page_json(1, &[product_json(1, 1, "1.00")], false)));

    api.get_products_page(1).await.unwrap();
    api.get_products_page(1).await.unwrap();
    assert_eq!(mock.page_hits(1), 1, "second read should come from the cache");

    api.invalidate_cache();
    api.get_products_page(1).await.unwrap();
    assert_eq!(mock.page_hits(1), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::status(503));

    let err = api.fetch_page(PageCursor::FIRST).await.unwrap_err();
    assert!(err.is_network());

    mock.set_page(1, MockResponse::json(&page_json(1, &[product_json(1, 1, "1.00")], false)));
    let page = api.fetch_page(PageCursor::FIRST).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(mock.page_hits(1), 2);
}

// =============================================================================
// Single Product
// =============================================================================

#[tokio::test]
async fn test_fetch_single_product() {
    let (mock, api) = setup().await;
    mock.set_product(12, MockResponse::json(&product_json(12, 4, "19.99")));

    let product = api.fetch_product(ProductId::new(12)).await.unwrap();
    assert_eq!(product.id, ProductId::new(12));
    assert_eq!(product.category_id, CategoryId::new(4));
    assert_eq!(product.sale_price, Price::from_cents(1999));
    assert_eq!(product.primary_image(), Some("https://img.example/12.jpg"));
}

#[tokio::test]
async fn test_fetch_single_product_in_data_envelope() {
    let (mock, api) = setup().await;
    mock.set_product(3, MockResponse::json(&json!({ "data": product_json(3, 1, "2.50") })));

    let product = api.get_product(ProductId::new(3)).await.unwrap();
    assert_eq!(product.sale_price, Price::from_cents(250));
}

#[tokio::test]
async fn test_single_products_are_cached() {
    let (mock, api) = setup().await;
    mock.set_product(5, MockResponse::json(&product_json(5, 1, "1.00")));

    api.get_product(ProductId::new(5)).await.unwrap();
    api.get_product(ProductId::new(5)).await.unwrap();
    assert_eq!(mock.product_hits(5), 1);
    assert_eq!(mock.total_page_hits(), 0);
}

#[tokio::test]
async fn test_unknown_product_is_network_error() {
    let (mock, api) = setup().await;

    let err = api.get_product(ProductId::new(404)).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }), "unexpected error: {err:?}");

    let err = api.fetch_product(ProductId::new(404)).await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(mock.product_hits(404), 2, "failures should not be cached");
}

#[tokio::test]
async fn test_malformed_product_is_decode_error() {
    let (mock, api) = setup().await;
    mock.set_product(1, MockResponse::raw("not json"));
    mock.set_product(2, MockResponse::json(&json!([product_json(2, 1, "1.00")])));
    mock.set_product(3, MockResponse::json(&product_json(3, 1, "-1.00")));

    for id in 1..=3 {
        let err = api.fetch_product(ProductId::new(id)).await.unwrap_err();
        assert!(err.is_decode(), "product {id}: unexpected error {err:?}");
    }
}

// =============================================================================
// Error Mapping
// =============================================================================

#[tokio::test]
async fn test_server_error_status() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::status(500));

    let err = api.get_products_page(1).await.unwrap_err();
    assert!(
        matches!(err, ApiError::Status { status: 500, ref body } if body.contains("mock error")),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_missing_page_is_network_error() {
    let (_mock, api) = setup().await;
    let err = api.fetch_page(PageCursor::new(42)).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::rate_limited(7));

    let err = api.get_products_page(1).await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(7)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::raw("<html>oops</html>"));

    let err = api.fetch_page(PageCursor::FIRST).await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_negative_price_is_decode_error() {
    let (mock, api) = setup().await;
    mock.set_page(1, MockResponse::json(&json!([product_json(1, 1, "-2.00")])));

    let err = api.fetch_page(PageCursor::FIRST).await.unwrap_err();
    assert!(err.is_decode());
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_fetch_categories() {
    let (mock, api) = setup().await;
    mock.set_categories(MockResponse::json(&json!([
        { "id": 1, "nombre": "Electronics" },
        { "id": 2, "nombre": "Books" }
    ])));

    let categories = api.fetch_categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[1].name, "Books");

    api.fetch_categories().await.unwrap();
    assert_eq!(mock.category_hits(), 1);
}

#[tokio::test]
async fn test_categories_error() {
    let (mock, api) = setup().await;
    mock.set_categories(MockResponse::status(502));

    let err = api.fetch_categories().await.unwrap_err();
    assert!(err.is_network());
}
