//! Category service.

use std::collections::HashMap;
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use super::CatalogError;
use crate::cache::ResponseCache;
use crate::models::category::{
    CategoryRecord, CategoryWithProducts, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::models::product::{ProductDto, ProductRecord};
use crate::store::{CategoryStore, ProductStore, StoreError};

/// Service owning the category collection.
///
/// Holds a read handle on the product store to resolve the denormalized
/// product references; it never writes products.
#[derive(Clone)]
pub struct CategoryCatalog {
    categories: Arc<dyn CategoryStore>,
    products: Arc<dyn ProductStore>,
    cache: ResponseCache,
}

impl CategoryCatalog {
    #[must_use]
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        products: Arc<dyn ProductStore>,
        cache: ResponseCache,
    ) -> Self {
        Self {
            categories,
            products,
            cache,
        }
    }

    /// Create a category with an empty product list.
    ///
    /// # Errors
    ///
    /// `Conflict` when a category with the same name (case-insensitive)
    /// exists, including when another writer wins the race between the
    /// pre-check and the insert. `BadRequest` for an empty name.
    pub async fn create(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<CategoryRecord, CatalogError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(CatalogError::BadRequest(
                "Category name cannot be empty".to_owned(),
            ));
        }
        if self.categories.find_by_name(name).await?.is_some() {
            return Err(already_exists(name));
        }
        let record = match self.categories.insert(name).await {
            Ok(record) => record,
            Err(StoreError::Duplicate(_)) => return Err(already_exists(name)),
            Err(other) => return Err(other.into()),
        };
        self.cache.on_category_created().await;
        Ok(record)
    }

    /// Case-insensitive lookup, creating the category on a miss.
    ///
    /// On a concurrent-creation race (the insert hits the unique index), the
    /// winner's record is re-read and returned. A miss on that re-read is a
    /// store inconsistency and is reported as `Internal`, not swallowed.
    pub async fn find_or_create_by_name(
        &self,
        name: &str,
    ) -> Result<CategoryRecord, CatalogError> {
        if let Some(existing) = self.categories.find_by_name(name).await? {
            return Ok(existing);
        }
        match self.categories.insert(name).await {
            Ok(record) => Ok(record),
            Err(StoreError::Duplicate(_)) => {
                self.categories.find_by_name(name).await?.ok_or_else(|| {
                    CatalogError::Internal(
                        "failed to create or find category after uniqueness race".to_owned(),
                    )
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Case-insensitive name lookup.
    ///
    /// # Errors
    ///
    /// `NotFound` when no category matches.
    pub async fn find_by_name(&self, name: &str) -> Result<CategoryRecord, CatalogError> {
        self.categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| not_found_by_name(name))
    }

    /// Lookup by system id. A structurally invalid id is `NotFound`, not a
    /// malformed-input error.
    pub async fn find_by_id(&self, id: &str) -> Result<CategoryRecord, CatalogError> {
        let object_id =
            ObjectId::parse_str(id).map_err(|_| not_found_by_id(id))?;
        self.categories
            .find_by_system_id(object_id)
            .await?
            .ok_or_else(|| not_found_by_id(id))
    }

    /// Every category with its product references resolved to full products.
    ///
    /// Empty reference lists and dangling references both yield an empty (or
    /// shorter) product list for that category, never an error.
    pub async fn list_all_with_products(
        &self,
    ) -> Result<Vec<CategoryWithProducts>, CatalogError> {
        let categories = self.categories.find_all().await?;
        let mut resolved = Vec::with_capacity(categories.len());
        for category in categories {
            let products = self.resolve_products(&category.products).await?;
            resolved.push(category.into_with_products(products));
        }
        Ok(resolved)
    }

    /// Resolved products for a named category.
    ///
    /// # Errors
    ///
    /// `NotFound` when the category does not exist; an existing category with
    /// no products returns an empty sequence.
    pub async fn get_products_for_category(
        &self,
        name: &str,
    ) -> Result<Vec<ProductDto>, CatalogError> {
        let category = self
            .categories
            .find_by_name(name)
            .await?
            .ok_or_else(|| not_found_by_name(name))?;
        self.resolve_products(&category.products).await
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// `NotFound` for a bad or missing id; `Conflict` when the new name
    /// collides (case-insensitively) with a different category.
    pub async fn update(
        &self,
        id: &str,
        req: &UpdateCategoryRequest,
    ) -> Result<CategoryRecord, CatalogError> {
        let object_id = ObjectId::parse_str(id).map_err(|_| not_found_by_id(id))?;
        let existing = self
            .categories
            .find_by_system_id(object_id)
            .await?
            .ok_or_else(|| not_found_by_id(id))?;

        let mut renamed_to = None;
        let record = match req.name.as_deref().map(str::trim) {
            None => existing,
            Some("") => {
                return Err(CatalogError::BadRequest(
                    "Category name cannot be empty".to_owned(),
                ));
            }
            Some(name) if name == existing.name => existing,
            Some(name) => {
                if let Some(other) = self.categories.find_by_name(name).await?
                    && other.system_id != object_id
                {
                    return Err(already_exists(name));
                }
                let updated = match self.categories.rename(object_id, name).await {
                    Ok(updated) => updated,
                    Err(StoreError::Duplicate(_)) => return Err(already_exists(name)),
                    Err(other) => return Err(other.into()),
                };
                renamed_to = Some(name.to_owned());
                updated.ok_or_else(|| not_found_by_id(id))?
            }
        };

        self.cache.on_category_updated(renamed_to.as_deref()).await;
        Ok(record)
    }

    /// Delete a category unconditionally.
    ///
    /// Remaining product references do not block the deletion; the products
    /// keep their now-dangling category name string.
    pub async fn remove(&self, id: &str) -> Result<(), CatalogError> {
        let object_id = ObjectId::parse_str(id).map_err(|_| not_found_by_id(id))?;
        let existing = self
            .categories
            .find_by_system_id(object_id)
            .await?
            .ok_or_else(|| not_found_by_id(id))?;
        if !existing.products.is_empty() {
            tracing::warn!(
                category = %existing.name,
                product_refs = existing.products.len(),
                "deleting category that still references products"
            );
        }
        if !self.categories.delete(object_id).await? {
            return Err(not_found_by_id(id));
        }
        self.cache.on_category_deleted().await;
        Ok(())
    }

    /// Append `product_ref` to the named category, creating the category if
    /// it does not exist. Idempotent: a reference already present is left
    /// alone.
    pub async fn add_product_to_named_category(
        &self,
        name: &str,
        product_ref: ObjectId,
    ) -> Result<(), CatalogError> {
        let category = self.find_or_create_by_name(name).await?;
        if category.products.contains(&product_ref) {
            return Ok(());
        }
        let mut products = category.products;
        products.push(product_ref);
        self.categories
            .set_products(category.system_id, products)
            .await?;
        Ok(())
    }

    /// Remove `product_ref` from the named category's reference list. A
    /// missing category or an absent reference is a no-op, not an error.
    pub async fn remove_product_from_category(
        &self,
        name: &str,
        product_ref: ObjectId,
    ) -> Result<(), CatalogError> {
        let Some(category) = self.categories.find_by_name(name).await? else {
            return Ok(());
        };
        if !category.products.contains(&product_ref) {
            return Ok(());
        }
        let products = category
            .products
            .into_iter()
            .filter(|id| *id != product_ref)
            .collect();
        self.categories
            .set_products(category.system_id, products)
            .await?;
        Ok(())
    }

    /// Resolve references to full products, preserving reference order and
    /// skipping references whose product no longer exists.
    async fn resolve_products(
        &self,
        refs: &[ObjectId],
    ) -> Result<Vec<ProductDto>, CatalogError> {
        if refs.is_empty() {
            return Ok(Vec::new());
        }
        let records = self.products.find_by_system_ids(refs).await?;
        let mut by_id: HashMap<ObjectId, ProductRecord> = records
            .into_iter()
            .map(|record| (record.system_id, record))
            .collect();
        Ok(refs
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(ProductRecord::into_dto)
            .collect())
    }
}

fn already_exists(name: &str) -> CatalogError {
    CatalogError::Conflict(format!("Category \"{name}\" already exists"))
}

fn not_found_by_name(name: &str) -> CatalogError {
    CatalogError::NotFound(format!("Category \"{name}\" not found"))
}

fn not_found_by_id(id: &str) -> CatalogError {
    CatalogError::NotFound(format!("Category with id \"{id}\" not found"))
}
