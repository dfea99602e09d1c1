//! HTTP route handlers for the catalog API.
//!
//! # Route Structure (mounted under `/api`)
//!
//! ```text
//! # Products
//! POST   /products                  - Create product (clears entire cache)
//! GET    /products                  - List all products (cached)
//! GET    /products/{product_id}     - Product by system id (cached)
//! GET    /products/name/{name}      - Product by title, hyphens as spaces (cached)
//! GET    /products/category/{name}  - Products matching a category name
//! PUT    /products/{product_id}     - Partial update
//! DELETE /products/{product_id}     - Delete
//!
//! # Categories
//! POST   /categories                - Create category
//! GET    /categories                - All categories with resolved products (cached)
//! GET    /categories/{name}         - Products for a category (cached)
//! PUT    /categories/{category_id}  - Rename
//! DELETE /categories/{category_id}  - Delete
//! ```
//!
//! Cached GETs are read-through against the shared `ResponseCache` with the
//! configured TTL; mutation handlers rely on the services to invalidate.

pub mod categories;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use serde_json::Value;

use crate::cache::CacheKey;
use crate::error::AppError;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::list))
        .route("/name/{product_name}", get(products::get_by_title))
        .route("/category/{category_name}", get(products::by_category))
        .route(
            "/{product_id}",
            get(products::get_by_system_id)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(categories::create).get(categories::list))
        // GET takes a name, PUT/DELETE take a system id; one pattern serves
        // both since the segment is only interpreted by the handler.
        .route(
            "/{category}",
            get(categories::products_for)
                .put(categories::update)
                .delete(categories::remove),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
}

/// Serve `key` from the cache when present; otherwise compute, populate, and
/// return the value.
pub(crate) async fn read_through<F>(
    state: &AppState,
    key: CacheKey,
    compute: F,
) -> Result<Value, AppError>
where
    F: Future<Output = Result<Value, AppError>>,
{
    if let Some(hit) = state.cache().get(&key).await {
        return Ok(hit.as_ref().clone());
    }
    let value = compute.await?;
    state.cache().insert(key, value.clone()).await;
    Ok(value)
}
