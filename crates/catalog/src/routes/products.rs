//! Product route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use super::read_through;
use crate::cache::CacheKey;
use crate::error::Result;
use crate::models::product::{CreateProductRequest, ProductPatch};
use crate::state::AppState;

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let product = state.products().create(body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(product)?)))
}

/// `GET /api/products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let value = read_through(&state, CacheKey::AllProducts, async {
        let products = state.products().find_all().await?;
        Ok(serde_json::to_value(products)?)
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/products/{product_id}`: lookup by system id.
pub async fn get_by_system_id(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>> {
    let value = read_through(&state, CacheKey::product_ref(&product_id), async {
        let product = state.products().find_by_mongo_id(&product_id).await?;
        Ok(serde_json::to_value(product)?)
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/products/name/{product_name}`: lookup by title.
///
/// Hyphens in the path segment stand in for spaces in the title.
pub async fn get_by_title(
    State(state): State<AppState>,
    Path(product_name): Path<String>,
) -> Result<Json<Value>> {
    let title = product_name.replace('-', " ");
    let value = read_through(&state, CacheKey::product_by_title(&title), async {
        let product = state.products().find_by_title(&title).await?;
        Ok(serde_json::to_value(product)?)
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/products/category/{category_name}`: denormalized-string search.
pub async fn by_category(
    State(state): State<AppState>,
    Path(category_name): Path<String>,
) -> Result<Json<Value>> {
    let products = state
        .products()
        .get_products_by_category(&category_name)
        .await?;
    Ok(Json(serde_json::to_value(products)?))
}

/// `PUT /api/products/{product_id}`
pub async fn update(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(body): Json<ProductPatch>,
) -> Result<Json<Value>> {
    let product = state.products().update(&product_id, body).await?;
    Ok(Json(serde_json::to_value(product)?))
}

/// `DELETE /api/products/{product_id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode> {
    state.products().remove(&product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
