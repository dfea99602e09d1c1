//! Error taxonomy at the service boundary.

use mongodb::bson::oid::ObjectId;
use threadline_catalog::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use threadline_catalog::services::CatalogError;
use threadline_integration_tests::{memory_state, product_request};

#[tokio::test]
async fn duplicate_business_id_conflict_cites_the_id() {
    let state = memory_state();
    let products = state.products();

    products
        .create(product_request("prod_001", "First", "Shirts"))
        .await
        .expect("create");
    let err = products
        .create(product_request("prod_001", "Second", "Shirts"))
        .await
        .expect_err("same business id");

    let CatalogError::Conflict(message) = err else {
        panic!("expected Conflict, got {err:?}");
    };
    assert!(message.contains("prod_001"), "{message}");
}

#[tokio::test]
async fn duplicate_title_conflict_cites_the_title() {
    let state = memory_state();
    let products = state.products();

    products
        .create(product_request("prod_001", "Linen Shirt", "Shirts"))
        .await
        .expect("create");
    let err = products
        .create(product_request("prod_002", "Linen Shirt", "Shirts"))
        .await
        .expect_err("same title");

    let CatalogError::Conflict(message) = err else {
        panic!("expected Conflict, got {err:?}");
    };
    assert!(message.contains("Linen Shirt"), "{message}");
}

#[tokio::test]
async fn malformed_system_id_is_bad_request_before_lookup() {
    let state = memory_state();
    let products = state.products();

    let err = products
        .find_by_mongo_id("not-a-valid-object-id")
        .await
        .expect_err("malformed id");
    assert!(matches!(err, CatalogError::BadRequest(_)), "{err:?}");

    let err = products
        .find_by_mongo_id(&ObjectId::new().to_hex())
        .await
        .expect_err("well-formed but absent");
    assert!(matches!(err, CatalogError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn category_ids_fail_as_not_found_not_bad_request() {
    let state = memory_state();
    let categories = state.categories();

    let err = categories
        .find_by_id("not-a-valid-object-id")
        .await
        .expect_err("malformed id");
    assert!(matches!(err, CatalogError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn zero_moq_is_rejected_up_front() {
    let state = memory_state();
    let products = state.products();

    let mut request = product_request("prod_001", "Linen Shirt", "Shirts");
    request.moq = 0;
    let err = products.create(request).await.expect_err("zero moq");
    assert!(matches!(err, CatalogError::BadRequest(_)), "{err:?}");

    // Nothing was persisted.
    assert!(products.find_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn category_rename_collision_keeps_the_original_name() {
    let state = memory_state();
    let categories = state.categories();

    categories
        .create(&CreateCategoryRequest {
            name: "Shirts".to_owned(),
        })
        .await
        .expect("create");
    let hats = categories
        .create(&CreateCategoryRequest {
            name: "Hats".to_owned(),
        })
        .await
        .expect("create");

    let err = categories
        .update(
            &hats.system_id.to_hex(),
            &UpdateCategoryRequest {
                name: Some("shirts".to_owned()),
            },
        )
        .await
        .expect_err("case-insensitive collision");
    assert!(matches!(err, CatalogError::Conflict(_)), "{err:?}");

    let unchanged = categories
        .find_by_id(&hats.system_id.to_hex())
        .await
        .expect("still there");
    assert_eq!(unchanged.name, "Hats");
}
