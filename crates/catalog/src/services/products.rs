//! Product service.

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use super::{CatalogError, CategoryCatalog};
use crate::cache::ResponseCache;
use crate::models::product::{CreateProductRequest, Discount, ProductDto, ProductPatch, ProductRecord};
use crate::store::{ProductStore, StoreError};

/// Service owning the product collection.
///
/// Depends on [`CategoryCatalog`] for the back-index linkage calls; those are
/// best-effort and never fail the product operation they accompany.
#[derive(Clone)]
pub struct ProductCatalog {
    products: Arc<dyn ProductStore>,
    categories: CategoryCatalog,
    cache: ResponseCache,
}

impl ProductCatalog {
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductStore>,
        categories: CategoryCatalog,
        cache: ResponseCache,
    ) -> Self {
        Self {
            products,
            categories,
            cache,
        }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// `BadRequest` for missing required fields or out-of-range values;
    /// `Conflict` naming whichever of the business id or title collides with
    /// an existing product (exact match).
    pub async fn create(&self, req: CreateProductRequest) -> Result<ProductDto, CatalogError> {
        validate_create(&req)?;

        if let Some(existing) = self
            .products
            .find_conflicting(&req.id, &req.title, None)
            .await?
        {
            return Err(conflict_for(&existing, &req.id, &req.title));
        }

        let record = match self.products.insert(ProductRecord::from_create(req)).await {
            Ok(record) => record,
            Err(StoreError::Duplicate(_)) => {
                // Another writer won the race between the pre-check and the
                // insert; only the business id carries a unique index.
                return Err(CatalogError::Conflict(
                    "Product with this ID already exists".to_owned(),
                ));
            }
            Err(other) => return Err(other.into()),
        };

        // Best-effort back-index update; the created product is authoritative
        // even when the category side fails.
        if let Err(err) = self
            .categories
            .add_product_to_named_category(&record.category, record.system_id)
            .await
        {
            tracing::warn!(
                product = %record.id,
                category = %record.category,
                error = %err,
                "failed to add product to category"
            );
        }

        self.cache.on_product_created();
        Ok(record.into_dto())
    }

    pub async fn find_all(&self) -> Result<Vec<ProductDto>, CatalogError> {
        let records = self.products.find_all().await?;
        Ok(records.into_iter().map(ProductRecord::into_dto).collect())
    }

    /// Lookup by the caller-assigned business id (exact match).
    pub async fn find_by_id(&self, business_id: &str) -> Result<ProductDto, CatalogError> {
        if business_id.trim().is_empty() {
            return Err(CatalogError::BadRequest("Product ID is required".to_owned()));
        }
        self.products
            .find_by_business_id(business_id)
            .await?
            .map(ProductRecord::into_dto)
            .ok_or_else(|| {
                CatalogError::NotFound(format!("Product with ID \"{business_id}\" not found"))
            })
    }

    /// Lookup by system identity. A malformed id is rejected as `BadRequest`
    /// before any store access; a well-formed but unknown id is `NotFound`.
    pub async fn find_by_mongo_id(&self, id: &str) -> Result<ProductDto, CatalogError> {
        let object_id = parse_system_id(id)?;
        self.products
            .find_by_system_id(object_id)
            .await?
            .map(ProductRecord::into_dto)
            .ok_or_else(|| not_found_by_system_id(id))
    }

    /// Case-insensitive exact title lookup.
    pub async fn find_by_title(&self, title: &str) -> Result<ProductDto, CatalogError> {
        if title.trim().is_empty() {
            return Err(CatalogError::BadRequest(
                "Product title is required".to_owned(),
            ));
        }
        self.products
            .find_by_title(title)
            .await?
            .map(ProductRecord::into_dto)
            .ok_or_else(|| {
                CatalogError::NotFound(format!("Product with title \"{title}\" not found"))
            })
    }

    /// Partial-field merge update.
    ///
    /// Re-runs the uniqueness checks against the merged values (excluding
    /// this product) and, when the category changes, moves the back-index
    /// reference from the old category to the new one, best-effort.
    pub async fn update(
        &self,
        id: &str,
        patch: ProductPatch,
    ) -> Result<ProductDto, CatalogError> {
        let object_id = parse_system_id(id)?;
        validate_patch(&patch)?;

        let existing = self
            .products
            .find_by_system_id(object_id)
            .await?
            .ok_or_else(|| not_found_by_system_id(id))?;

        let next_business_id = patch.id.as_deref().unwrap_or(&existing.id);
        let next_title = patch.title.as_deref().unwrap_or(&existing.title);
        if next_business_id != existing.id || next_title != existing.title {
            if let Some(conflict) = self
                .products
                .find_conflicting(next_business_id, next_title, Some(object_id))
                .await?
            {
                return Err(conflict_for(&conflict, next_business_id, next_title));
            }
        }

        let updated = match self.products.update(object_id, &patch).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(not_found_by_system_id(id)),
            Err(StoreError::Duplicate(_)) => {
                return Err(CatalogError::Conflict(format!(
                    "Product with ID \"{next_business_id}\" already exists"
                )));
            }
            Err(other) => return Err(other.into()),
        };

        if updated.category != existing.category {
            // Two independent best-effort writes; a failure in either leaves
            // the back-index to be reconciled later and is only logged.
            if let Err(err) = self
                .categories
                .remove_product_from_category(&existing.category, object_id)
                .await
            {
                tracing::warn!(
                    product = %updated.id,
                    category = %existing.category,
                    error = %err,
                    "failed to remove product from previous category"
                );
            }
            if let Err(err) = self
                .categories
                .add_product_to_named_category(&updated.category, object_id)
                .await
            {
                tracing::warn!(
                    product = %updated.id,
                    category = %updated.category,
                    error = %err,
                    "failed to add product to new category"
                );
            }
        }

        let new_title = (updated.title != existing.title).then_some(updated.title.as_str());
        self.cache.on_product_updated(object_id, new_title).await;
        Ok(updated.into_dto())
    }

    /// Delete a product, removing its back-index reference first
    /// (best-effort).
    pub async fn remove(&self, id: &str) -> Result<(), CatalogError> {
        let object_id = parse_system_id(id)?;
        let existing = self
            .products
            .find_by_system_id(object_id)
            .await?
            .ok_or_else(|| not_found_by_system_id(id))?;

        if let Err(err) = self
            .categories
            .remove_product_from_category(&existing.category, object_id)
            .await
        {
            tracing::warn!(
                product = %existing.id,
                category = %existing.category,
                error = %err,
                "failed to remove product from category"
            );
        }

        if !self.products.delete(object_id).await? {
            return Err(not_found_by_system_id(id));
        }
        self.cache.on_product_deleted(object_id).await;
        Ok(())
    }

    /// Case-insensitive match against the denormalized category string on
    /// the products themselves, independent of the category back-index.
    /// Returns an empty sequence when nothing matches.
    pub async fn get_products_by_category(
        &self,
        category_name: &str,
    ) -> Result<Vec<ProductDto>, CatalogError> {
        if category_name.trim().is_empty() {
            return Err(CatalogError::BadRequest(
                "Category name is required".to_owned(),
            ));
        }
        let records = self.products.find_by_category(category_name).await?;
        Ok(records.into_iter().map(ProductRecord::into_dto).collect())
    }
}

fn parse_system_id(id: &str) -> Result<ObjectId, CatalogError> {
    ObjectId::parse_str(id)
        .map_err(|_| CatalogError::BadRequest(format!("Invalid product id \"{id}\"")))
}

fn not_found_by_system_id(id: &str) -> CatalogError {
    CatalogError::NotFound(format!("Product with MongoDB ID \"{id}\" not found"))
}

fn conflict_for(existing: &ProductRecord, business_id: &str, title: &str) -> CatalogError {
    if existing.id == business_id {
        CatalogError::Conflict(format!("Product with ID \"{business_id}\" already exists"))
    } else {
        CatalogError::Conflict(format!("Product with title \"{title}\" already exists"))
    }
}

fn validate_create(req: &CreateProductRequest) -> Result<(), CatalogError> {
    if req.id.trim().is_empty() || req.title.trim().is_empty() || req.category.trim().is_empty()
    {
        return Err(CatalogError::BadRequest(
            "ID, title, and category are required fields".to_owned(),
        ));
    }
    if req.moq < 1 {
        return Err(CatalogError::BadRequest("moq must be at least 1".to_owned()));
    }
    validate_price(req.price)?;
    if let Some(discount) = &req.discount {
        validate_discount(discount)?;
    }
    if let Some(rating) = req.rating {
        validate_rating(rating)?;
    }
    Ok(())
}

fn validate_patch(patch: &ProductPatch) -> Result<(), CatalogError> {
    if let Some(moq) = patch.moq
        && moq < 1
    {
        return Err(CatalogError::BadRequest("moq must be at least 1".to_owned()));
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(discount) = &patch.discount {
        validate_discount(discount)?;
    }
    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), CatalogError> {
    if price < 0.0 || !price.is_finite() {
        return Err(CatalogError::BadRequest(
            "price cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_discount(discount: &Discount) -> Result<(), CatalogError> {
    if !(0.0..=100.0).contains(&discount.percentage) {
        return Err(CatalogError::BadRequest(
            "discount percentage must be between 0 and 100".to_owned(),
        ));
    }
    if discount.discounted_price < 0.0 {
        return Err(CatalogError::BadRequest(
            "discounted price cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_rating(rating: f64) -> Result<(), CatalogError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(CatalogError::BadRequest(
            "rating must be between 0 and 5".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::memory::{InMemoryCategoryStore, InMemoryProductStore};

    fn catalogs() -> (ProductCatalog, CategoryCatalog) {
        let products: Arc<dyn ProductStore> = Arc::new(InMemoryProductStore::new());
        let categories_store = Arc::new(InMemoryCategoryStore::new());
        let cache = ResponseCache::new(100, Duration::from_secs(300));
        let categories = CategoryCatalog::new(
            categories_store,
            Arc::clone(&products),
            cache.clone(),
        );
        (
            ProductCatalog::new(products, categories.clone(), cache),
            categories,
        )
    }

    fn request(business_id: &str, title: &str) -> CreateProductRequest {
        CreateProductRequest {
            id: business_id.to_owned(),
            title: title.to_owned(),
            description: "desc".to_owned(),
            brand: None,
            category: "Shirts".to_owned(),
            gender: None,
            price: 19.5,
            discount: None,
            available_sizes: vec!["M".to_owned()],
            variants: Vec::new(),
            material: None,
            care_instructions: None,
            rating: None,
            reviews: None,
            tags: None,
            moq: 1,
        }
    }

    #[tokio::test]
    async fn create_then_lookup_by_every_identity() {
        let (products, _) = catalogs();
        let created = products.create(request("p1", "Linen Shirt")).await.expect("create");

        let by_business = products.find_by_id("p1").await.expect("by business id");
        assert_eq!(by_business.system_id, created.system_id);

        let by_system = products
            .find_by_mongo_id(&created.system_id)
            .await
            .expect("by system id");
        assert_eq!(by_system.id, "p1");

        let by_title = products
            .find_by_title("linen SHIRT")
            .await
            .expect("by title, case-insensitive");
        assert_eq!(by_title.id, "p1");
    }

    #[tokio::test]
    async fn conflicts_name_the_colliding_field() {
        let (products, _) = catalogs();
        products.create(request("p1", "First")).await.expect("create");

        let err = products
            .create(request("p1", "Second"))
            .await
            .expect_err("same business id");
        let CatalogError::Conflict(message) = err else {
            panic!("expected Conflict, got {err:?}");
        };
        assert!(message.contains("ID"), "{message}");

        let err = products
            .create(request("p2", "First"))
            .await
            .expect_err("same title");
        let CatalogError::Conflict(message) = err else {
            panic!("expected Conflict, got {err:?}");
        };
        assert!(message.contains("title"), "{message}");
    }

    #[tokio::test]
    async fn create_links_product_into_category() {
        let (products, categories) = catalogs();
        let created = products.create(request("p1", "Linen Shirt")).await.expect("create");
        let category = categories.find_by_name("shirts").await.expect("auto-created");
        assert_eq!(category.products, vec![
            ObjectId::parse_str(&created.system_id).expect("hex id")
        ]);
    }

    #[tokio::test]
    async fn malformed_system_id_is_bad_request_not_lookup() {
        let (products, _) = catalogs();
        let err = products
            .find_by_mongo_id("definitely-not-hex")
            .await
            .expect_err("malformed");
        assert!(matches!(err, CatalogError::BadRequest(_)));

        let err = products
            .find_by_mongo_id(&ObjectId::new().to_hex())
            .await
            .expect_err("well-formed but absent");
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_moves_reference_between_categories() {
        let (products, categories) = catalogs();
        let created = products.create(request("p1", "Linen Shirt")).await.expect("create");
        let product_ref = ObjectId::parse_str(&created.system_id).expect("hex id");

        let patch = ProductPatch {
            category: Some("Hats".to_owned()),
            ..ProductPatch::default()
        };
        products.update(&created.system_id, patch).await.expect("update");

        let old = categories.find_by_name("Shirts").await.expect("still exists");
        assert!(!old.products.contains(&product_ref));
        let new = categories.find_by_name("Hats").await.expect("auto-created");
        assert!(new.products.contains(&product_ref));
    }

    #[tokio::test]
    async fn update_rejects_zero_moq() {
        let (products, _) = catalogs();
        let created = products.create(request("p1", "Linen Shirt")).await.expect("create");
        let patch = ProductPatch {
            moq: Some(0),
            ..ProductPatch::default()
        };
        let err = products
            .update(&created.system_id, patch)
            .await
            .expect_err("zero moq");
        assert!(matches!(err, CatalogError::BadRequest(_)));
    }

    #[tokio::test]
    async fn remove_unlinks_and_deletes() {
        let (products, categories) = catalogs();
        let created = products.create(request("p1", "Linen Shirt")).await.expect("create");
        products.remove(&created.system_id).await.expect("remove");

        let err = products.find_by_id("p1").await.expect_err("gone");
        assert!(matches!(err, CatalogError::NotFound(_)));
        let category = categories.find_by_name("Shirts").await.expect("kept");
        assert!(category.products.is_empty());
    }

    #[tokio::test]
    async fn category_search_is_independent_of_back_index() {
        let (products, categories) = catalogs();
        let created = products.create(request("p1", "Linen Shirt")).await.expect("create");
        let product_ref = ObjectId::parse_str(&created.system_id).expect("hex id");

        // Break the back-index on purpose; the denormalized string still wins.
        categories
            .remove_product_from_category("Shirts", product_ref)
            .await
            .expect("unlink");

        let matched = products
            .get_products_by_category("SHIRTS")
            .await
            .expect("search");
        assert_eq!(matched.len(), 1);

        let unmatched = products
            .get_products_by_category("Trousers")
            .await
            .expect("no matches is fine");
        assert!(unmatched.is_empty());
    }
}
