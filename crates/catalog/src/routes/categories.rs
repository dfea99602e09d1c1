//! Category route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use super::read_through;
use crate::cache::CacheKey;
use crate::error::Result;
use crate::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::state::AppState;

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let category = state.categories().create(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(category.into_dto())?),
    ))
}

/// `GET /api/categories`: every category with resolved products.
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>> {
    let value = read_through(&state, CacheKey::AllCategories, async {
        let categories = state.categories().list_all_with_products().await?;
        Ok(serde_json::to_value(categories)?)
    })
    .await?;
    Ok(Json(value))
}

/// `GET /api/categories/{category_name}`: products for a category.
pub async fn products_for(
    State(state): State<AppState>,
    Path(category_name): Path<String>,
) -> Result<Json<Value>> {
    let value = read_through(
        &state,
        CacheKey::category_products(&category_name),
        async {
            let products = state
                .categories()
                .get_products_for_category(&category_name)
                .await?;
            Ok(serde_json::to_value(products)?)
        },
    )
    .await?;
    Ok(Json(value))
}

/// `PUT /api/categories/{category_id}`
pub async fn update(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>> {
    let category = state.categories().update(&category_id, &body).await?;
    Ok(Json(serde_json::to_value(category.into_dto())?))
}

/// `DELETE /api/categories/{category_id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<StatusCode> {
    state.categories().remove(&category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
