//! Persistence layer for the catalog collections.
//!
//! Services talk to the store through the [`ProductStore`] and
//! [`CategoryStore`] traits. [`mongo`] implements them against MongoDB;
//! [`memory`] against an in-process map for tests and development. Both
//! backends share the same observable semantics: exact-match unique indexes
//! (product business id, category name) reported as [`StoreError::Duplicate`],
//! and case-insensitive name/title lookups performed by the store, not assumed
//! native to it.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::category::CategoryRecord;
use crate::models::product::{ProductPatch, ProductRecord};

/// Error from a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("duplicate value for unique field `{0}`")]
    Duplicate(&'static str),

    /// Driver-level failure.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Stored data does not round-trip through the expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Store of product documents.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find_all(&self) -> Result<Vec<ProductRecord>, StoreError>;

    async fn find_by_system_id(&self, id: ObjectId)
    -> Result<Option<ProductRecord>, StoreError>;

    /// Exact match on the caller-assigned business id.
    async fn find_by_business_id(
        &self,
        business_id: &str,
    ) -> Result<Option<ProductRecord>, StoreError>;

    /// Case-insensitive exact title match.
    async fn find_by_title(&self, title: &str) -> Result<Option<ProductRecord>, StoreError>;

    /// First product whose business id or title exactly matches either value,
    /// excluding `exclude` (for self-excluding uniqueness checks on update).
    async fn find_conflicting(
        &self,
        business_id: &str,
        title: &str,
        exclude: Option<ObjectId>,
    ) -> Result<Option<ProductRecord>, StoreError>;

    /// Every product whose system id is in `ids`, in no particular order.
    async fn find_by_system_ids(
        &self,
        ids: &[ObjectId],
    ) -> Result<Vec<ProductRecord>, StoreError>;

    /// Case-insensitive match on the denormalized category name.
    async fn find_by_category(&self, category: &str)
    -> Result<Vec<ProductRecord>, StoreError>;

    /// Persist a new product. The store assigns both timestamps. Fails with
    /// [`StoreError::Duplicate`] when the business-id unique index rejects it.
    async fn insert(&self, record: ProductRecord) -> Result<ProductRecord, StoreError>;

    /// Merge the set fields of `patch` into the document and refresh
    /// `updatedAt`. Returns the updated record, or `None` when the id does
    /// not exist.
    async fn update(
        &self,
        id: ObjectId,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRecord>, StoreError>;

    /// Returns whether a document was deleted.
    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError>;
}

/// Store of category documents.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<CategoryRecord>, StoreError>;

    async fn find_by_system_id(
        &self,
        id: ObjectId,
    ) -> Result<Option<CategoryRecord>, StoreError>;

    /// Case-insensitive exact name match.
    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, StoreError>;

    /// Persist a new category with an empty product list. Fails with
    /// [`StoreError::Duplicate`] when the name unique index rejects it;
    /// callers use this to detect creation races.
    async fn insert(&self, name: &str) -> Result<CategoryRecord, StoreError>;

    /// Rename the category. Returns `None` when the id does not exist.
    async fn rename(&self, id: ObjectId, name: &str)
    -> Result<Option<CategoryRecord>, StoreError>;

    /// Replace the product reference list. Returns `None` when the id does
    /// not exist.
    async fn set_products(
        &self,
        id: ObjectId,
        products: Vec<ObjectId>,
    ) -> Result<Option<CategoryRecord>, StoreError>;

    /// Returns whether a document was deleted.
    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError>;
}
