//! Integration tests for the Threadline catalog.
//!
//! # Running Tests
//!
//! ```bash
//! # Service-level tests run against the in-memory store
//! cargo test -p threadline-integration-tests
//!
//! # End-to-end HTTP tests need MongoDB and a running server
//! cargo run -p threadline-catalog &
//! cargo test -p threadline-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `catalog_consistency` - Product/category cross-collection sync
//! - `cache_invalidation` - Read-cache policy after mutations
//! - `http_api` - End-to-end HTTP tests (ignored by default)

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use secrecy::SecretString;
use threadline_catalog::config::CatalogConfig;
use threadline_catalog::models::product::CreateProductRequest;
use threadline_catalog::state::AppState;
use threadline_catalog::store::memory::{InMemoryCategoryStore, InMemoryProductStore};

/// Application state over fresh in-memory stores.
#[must_use]
pub fn memory_state() -> AppState {
    let config = CatalogConfig {
        mongodb_url: SecretString::from("mongodb://unused".to_owned()),
        database: "threadline-test".to_owned(),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        cache_ttl_secs: 300,
        cache_capacity: 1000,
        frontend_url: None,
        sentry_dsn: None,
        sentry_environment: None,
    };
    AppState::new(
        config,
        Arc::new(InMemoryProductStore::new()),
        Arc::new(InMemoryCategoryStore::new()),
    )
}

/// A minimal valid product create request.
#[must_use]
pub fn product_request(business_id: &str, title: &str, category: &str) -> CreateProductRequest {
    CreateProductRequest {
        id: business_id.to_owned(),
        title: title.to_owned(),
        description: format!("{title} description"),
        brand: None,
        category: category.to_owned(),
        gender: None,
        price: 29.0,
        discount: None,
        available_sizes: vec!["S".to_owned(), "M".to_owned()],
        variants: Vec::new(),
        material: None,
        care_instructions: None,
        rating: None,
        reviews: None,
        tags: None,
        moq: 1,
    }
}

/// Base URL for the catalog API (configurable via environment).
#[must_use]
pub fn catalog_base_url() -> String {
    std::env::var("CATALOG_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}
