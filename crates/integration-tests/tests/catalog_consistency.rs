//! Cross-collection consistency between products and categories.
//!
//! These tests run the real services over the in-memory store; they exercise
//! the same code paths as the MongoDB deployment minus the driver.

use mongodb::bson::oid::ObjectId;
use threadline_catalog::models::product::ProductPatch;
use threadline_integration_tests::{memory_state, product_request};

#[tokio::test]
async fn created_product_is_reachable_by_every_identity() {
    let state = memory_state();
    let products = state.products();

    let created = products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");

    let by_business = products.find_by_id("prod_001").await.expect("business id");
    let by_system = products
        .find_by_mongo_id(&created.system_id)
        .await
        .expect("system id");
    let by_title = products.find_by_title("linen shirt").await.expect("title");

    assert_eq!(by_business.system_id, created.system_id);
    assert_eq!(by_system.system_id, created.system_id);
    assert_eq!(by_title.system_id, created.system_id);
}

#[tokio::test]
async fn category_identity_is_case_insensitive() {
    let state = memory_state();
    let categories = state.categories();

    let first = categories
        .find_or_create_by_name("Shirts")
        .await
        .expect("create");
    let second = categories
        .find_or_create_by_name("shirts")
        .await
        .expect("find");

    assert_eq!(first.system_id, second.system_id);
}

#[tokio::test]
async fn repeated_linkage_keeps_a_single_reference() {
    let state = memory_state();
    let categories = state.categories();
    let product_ref = ObjectId::new();

    categories
        .add_product_to_named_category("Shirts", product_ref)
        .await
        .expect("first add");
    categories
        .add_product_to_named_category("Shirts", product_ref)
        .await
        .expect("second add");

    let category = categories.find_by_name("Shirts").await.expect("exists");
    assert_eq!(
        category
            .products
            .iter()
            .filter(|id| **id == product_ref)
            .count(),
        1
    );
}

#[tokio::test]
async fn deleting_a_referencing_category_leaves_products_alone() {
    let state = memory_state();
    let products = state.products();
    let categories = state.categories();

    products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");
    let category = categories.find_by_name("Shirts").await.expect("linked");
    assert_eq!(category.products.len(), 1);

    categories
        .remove(&category.system_id.to_hex())
        .await
        .expect("delete proceeds despite references");

    // The product survives, category string now dangling.
    let survivor = products.find_by_id("prod_001").await.expect("untouched");
    assert_eq!(survivor.category, "Shirts");
}

#[tokio::test]
async fn changing_category_moves_the_back_reference() {
    let state = memory_state();
    let products = state.products();
    let categories = state.categories();

    let created = products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");
    let product_ref = ObjectId::parse_str(&created.system_id).expect("hex");

    let patch = ProductPatch {
        category: Some("Outerwear".to_owned()),
        ..ProductPatch::default()
    };
    products
        .update(&created.system_id, patch)
        .await
        .expect("update");

    let old = categories.find_by_name("Shirts").await.expect("kept");
    assert!(!old.products.contains(&product_ref));

    let new = categories
        .find_by_name("Outerwear")
        .await
        .expect("auto-created");
    assert!(new.products.contains(&product_ref));

    let moved = products.find_by_id("prod_001").await.expect("reachable");
    assert_eq!(moved.category, "Outerwear");
}

#[tokio::test]
async fn resolved_listing_reflects_the_back_index() {
    let state = memory_state();
    let products = state.products();
    let categories = state.categories();

    products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");
    products
        .create(product_request("prod_002", "Wool Coat", "Outerwear"))
        .await
        .expect("create");

    let listing = categories.list_all_with_products().await.expect("list");
    assert_eq!(listing.len(), 2);
    for category in &listing {
        assert_eq!(category.products.len(), 1, "category {}", category.name);
    }

    let shirts = categories
        .get_products_for_category("SHIRTS")
        .await
        .expect("resolve");
    assert_eq!(shirts.len(), 1);
    assert_eq!(shirts.first().expect("one").id, "prod_001");
}
