//! In-memory stores.
//!
//! Intended for tests/dev. Mirrors the MongoDB backend's observable
//! semantics: exact-match unique indexes (reported as
//! [`StoreError::Duplicate`]), store-assigned timestamps, and
//! case-insensitive name/title matching.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use mongodb::bson;
use mongodb::bson::oid::ObjectId;

use super::{CategoryStore, ProductStore, StoreError};
use crate::models::category::CategoryRecord;
use crate::models::product::{ProductPatch, ProductRecord};

fn eq_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn poisoned() -> StoreError {
    StoreError::DataCorruption("store lock poisoned".to_owned())
}

/// In-memory product store.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<ObjectId, ProductRecord>>,
}

impl InMemoryProductStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.values().cloned().collect())
    }

    async fn find_by_system_id(
        &self,
        id: ObjectId,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.get(&id).cloned())
    }

    async fn find_by_business_id(
        &self,
        business_id: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.values().find(|p| p.id == business_id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products.values().find(|p| eq_ci(&p.title, title)).cloned())
    }

    async fn find_conflicting(
        &self,
        business_id: &str,
        title: &str,
        exclude: Option<ObjectId>,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products
            .values()
            .find(|p| {
                exclude != Some(p.system_id) && (p.id == business_id || p.title == title)
            })
            .cloned())
    }

    async fn find_by_system_ids(
        &self,
        ids: &[ObjectId],
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned())?;
        Ok(products
            .values()
            .filter(|p| eq_ci(&p.category, category))
            .cloned()
            .collect())
    }

    async fn insert(&self, mut record: ProductRecord) -> Result<ProductRecord, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        if products.values().any(|p| p.id == record.id) {
            return Err(StoreError::Duplicate("id"));
        }
        let now = bson::DateTime::now();
        record.created_at = Some(now);
        record.updated_at = Some(now);
        products.insert(record.system_id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: ObjectId,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        if let Some(new_business_id) = &patch.id {
            // Same backstop the unique index provides.
            if products
                .values()
                .any(|p| p.system_id != id && p.id == *new_business_id)
            {
                return Err(StoreError::Duplicate("id"));
            }
        }
        let Some(record) = products.get_mut(&id) else {
            return Ok(None);
        };
        apply_patch(record, patch);
        record.updated_at = Some(bson::DateTime::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        Ok(products.remove(&id).is_some())
    }
}

fn apply_patch(record: &mut ProductRecord, patch: &ProductPatch) {
    let patch = patch.clone();
    if let Some(id) = patch.id {
        record.id = id;
    }
    if let Some(title) = patch.title {
        record.title = title;
    }
    if let Some(description) = patch.description {
        record.description = description;
    }
    if let Some(brand) = patch.brand {
        record.brand = Some(brand);
    }
    if let Some(category) = patch.category {
        record.category = category;
    }
    if let Some(gender) = patch.gender {
        record.gender = Some(gender);
    }
    if let Some(price) = patch.price {
        record.price = price;
    }
    if let Some(discount) = patch.discount {
        record.discount = Some(discount);
    }
    if let Some(available_sizes) = patch.available_sizes {
        record.available_sizes = available_sizes;
    }
    if let Some(variants) = patch.variants {
        record.variants = variants;
    }
    if let Some(material) = patch.material {
        record.material = Some(material);
    }
    if let Some(care_instructions) = patch.care_instructions {
        record.care_instructions = Some(care_instructions);
    }
    if let Some(rating) = patch.rating {
        record.rating = Some(rating);
    }
    if let Some(reviews) = patch.reviews {
        record.reviews = Some(reviews);
    }
    if let Some(tags) = patch.tags {
        record.tags = Some(tags);
    }
    if let Some(moq) = patch.moq {
        record.moq = moq;
    }
}

/// In-memory category store.
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    categories: RwLock<HashMap<ObjectId, CategoryRecord>>,
}

impl InMemoryCategoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn find_all(&self) -> Result<Vec<CategoryRecord>, StoreError> {
        let categories = self.categories.read().map_err(|_| poisoned())?;
        Ok(categories.values().cloned().collect())
    }

    async fn find_by_system_id(
        &self,
        id: ObjectId,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let categories = self.categories.read().map_err(|_| poisoned())?;
        Ok(categories.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, StoreError> {
        let categories = self.categories.read().map_err(|_| poisoned())?;
        Ok(categories.values().find(|c| eq_ci(&c.name, name)).cloned())
    }

    async fn insert(&self, name: &str) -> Result<CategoryRecord, StoreError> {
        let mut categories = self.categories.write().map_err(|_| poisoned())?;
        // The index matches exactly; the case-insensitive guard is an
        // application-level pre-check, as with the MongoDB backend.
        if categories.values().any(|c| c.name == name) {
            return Err(StoreError::Duplicate("name"));
        }
        let now = bson::DateTime::now();
        let record = CategoryRecord {
            system_id: ObjectId::new(),
            name: name.to_owned(),
            products: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        categories.insert(record.system_id, record.clone());
        Ok(record)
    }

    async fn rename(
        &self,
        id: ObjectId,
        name: &str,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let mut categories = self.categories.write().map_err(|_| poisoned())?;
        if categories
            .values()
            .any(|c| c.system_id != id && c.name == name)
        {
            return Err(StoreError::Duplicate("name"));
        }
        let Some(record) = categories.get_mut(&id) else {
            return Ok(None);
        };
        record.name = name.to_owned();
        record.updated_at = Some(bson::DateTime::now());
        Ok(Some(record.clone()))
    }

    async fn set_products(
        &self,
        id: ObjectId,
        products: Vec<ObjectId>,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let mut categories = self.categories.write().map_err(|_| poisoned())?;
        let Some(record) = categories.get_mut(&id) else {
            return Ok(None);
        };
        record.products = products;
        record.updated_at = Some(bson::DateTime::now());
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut categories = self.categories.write().map_err(|_| poisoned())?;
        Ok(categories.remove(&id).is_some())
    }
}
