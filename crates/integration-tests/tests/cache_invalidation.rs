//! Cache invalidation policy, exercised through the services.
//!
//! The cache holds serialized responses; these tests seed it the way the
//! read paths would and assert which keys each mutation drops.

use serde_json::json;
use threadline_catalog::cache::CacheKey;
use threadline_catalog::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use threadline_catalog::models::product::ProductPatch;
use threadline_integration_tests::{memory_state, product_request};

#[tokio::test]
async fn product_create_clears_the_entire_cache() {
    let state = memory_state();
    let cache = state.cache();

    cache.insert(CacheKey::AllProducts, json!(["stale"])).await;
    cache.insert(CacheKey::AllCategories, json!(["stale"])).await;
    cache
        .insert(CacheKey::category_products("Shirts"), json!(["stale"]))
        .await;

    state
        .products()
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");

    assert!(cache.get(&CacheKey::AllProducts).await.is_none());
    assert!(cache.get(&CacheKey::AllCategories).await.is_none());
    assert!(cache.get(&CacheKey::category_products("Shirts")).await.is_none());

    // A later listing read recomputes from the store rather than serving
    // anything stale.
    let listing = state.products().find_all().await.expect("recompute");
    assert_eq!(listing.len(), 1);
}

#[tokio::test]
async fn product_update_drops_listing_detail_and_new_title_keys() {
    let state = memory_state();
    let cache = state.cache();
    let products = state.products();

    let created = products
        .create(product_request("prod_001", "Old Title", "Shirts"))
        .await
        .expect("create");

    cache.insert(CacheKey::AllProducts, json!(["stale"])).await;
    cache
        .insert(CacheKey::product_ref(&created.system_id), json!("stale"))
        .await;
    cache
        .insert(CacheKey::product_by_title("New Title"), json!("stale"))
        .await;
    cache
        .insert(CacheKey::product_by_title("Old Title"), json!("kept"))
        .await;
    cache.insert(CacheKey::AllCategories, json!(["kept"])).await;

    let patch = ProductPatch {
        title: Some("New Title".to_owned()),
        ..ProductPatch::default()
    };
    products.update(&created.system_id, patch).await.expect("update");

    assert!(cache.get(&CacheKey::AllProducts).await.is_none());
    assert!(cache.get(&CacheKey::product_ref(&created.system_id)).await.is_none());
    assert!(cache.get(&CacheKey::product_by_title("New Title")).await.is_none());
    // The policy names only the new title; the old key ages out via TTL.
    assert!(cache.get(&CacheKey::product_by_title("Old Title")).await.is_some());
    assert!(cache.get(&CacheKey::AllCategories).await.is_some());
}

#[tokio::test]
async fn product_delete_drops_listing_and_detail_keys() {
    let state = memory_state();
    let cache = state.cache();
    let products = state.products();

    let created = products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");

    cache.insert(CacheKey::AllProducts, json!(["stale"])).await;
    cache
        .insert(CacheKey::product_ref(&created.system_id), json!("stale"))
        .await;
    cache.insert(CacheKey::AllCategories, json!(["kept"])).await;

    products.remove(&created.system_id).await.expect("remove");

    assert!(cache.get(&CacheKey::AllProducts).await.is_none());
    assert!(cache.get(&CacheKey::product_ref(&created.system_id)).await.is_none());
    assert!(cache.get(&CacheKey::AllCategories).await.is_some());
}

#[tokio::test]
async fn category_mutations_drop_the_aggregate_key() {
    let state = memory_state();
    let cache = state.cache();
    let categories = state.categories();

    cache.insert(CacheKey::AllCategories, json!(["stale"])).await;
    let created = categories
        .create(&CreateCategoryRequest {
            name: "Shirts".to_owned(),
        })
        .await
        .expect("create");
    assert!(cache.get(&CacheKey::AllCategories).await.is_none());

    cache.insert(CacheKey::AllCategories, json!(["stale"])).await;
    cache
        .insert(CacheKey::category_products("Tops"), json!(["stale"]))
        .await;
    cache
        .insert(CacheKey::category_products("Shirts"), json!(["kept"]))
        .await;
    categories
        .update(
            &created.system_id.to_hex(),
            &UpdateCategoryRequest {
                name: Some("Tops".to_owned()),
            },
        )
        .await
        .expect("rename");
    assert!(cache.get(&CacheKey::AllCategories).await.is_none());
    // Rename invalidates the new name's listing key only.
    assert!(cache.get(&CacheKey::category_products("Tops")).await.is_none());
    assert!(cache.get(&CacheKey::category_products("Shirts")).await.is_some());

    cache.insert(CacheKey::AllCategories, json!(["stale"])).await;
    categories
        .remove(&created.system_id.to_hex())
        .await
        .expect("delete");
    assert!(cache.get(&CacheKey::AllCategories).await.is_none());
}

#[tokio::test]
async fn failed_mutations_leave_the_cache_alone() {
    let state = memory_state();
    let cache = state.cache();
    let products = state.products();

    products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");

    cache.insert(CacheKey::AllProducts, json!(["kept"])).await;
    products
        .create(product_request("prod_001", "Other", "Shirts"))
        .await
        .expect_err("conflict");

    assert!(cache.get(&CacheKey::AllProducts).await.is_some());
}
