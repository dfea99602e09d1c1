//! Response cache for the catalog read paths.
//!
//! Cached GETs are read-through: handlers serve the stored JSON value when
//! present and populate it otherwise. Invalidation is driven by the services
//! after each successful mutation; a failed invalidation never surfaces to
//! the caller of the mutation.

use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::oid::ObjectId;
use moka::future::Cache;
use serde_json::Value;

/// Key for a cached read path.
///
/// Names, titles, and ids are folded before being embedded, so a key is
/// identified by content alone; there is no delimited string for a
/// caller-supplied name to collide with.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// `GET /api/products`
    AllProducts,
    /// `GET /api/products/{id}` (system id, lowercase hex)
    ProductById(String),
    /// `GET /api/products/name/{title}` (folded title)
    ProductByTitle(String),
    /// `GET /api/categories`: every category with resolved products.
    AllCategories,
    /// `GET /api/categories/{name}` (folded name)
    CategoryProducts(String),
}

impl CacheKey {
    /// Key for a product detail read, from a parsed system id.
    #[must_use]
    pub fn product_by_id(id: ObjectId) -> Self {
        Self::ProductById(id.to_hex())
    }

    /// Key for a product detail read, from the raw path segment. Produces
    /// the same key as [`Self::product_by_id`] for the same document.
    #[must_use]
    pub fn product_ref(raw: &str) -> Self {
        Self::ProductById(fold(raw))
    }

    #[must_use]
    pub fn product_by_title(title: &str) -> Self {
        Self::ProductByTitle(fold(title))
    }

    #[must_use]
    pub fn category_products(name: &str) -> Self {
        Self::CategoryProducts(fold(name))
    }
}

/// Case-fold caller-supplied text for use as key content.
fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

/// TTL cache of serialized responses, keyed by [`CacheKey`].
#[derive(Clone)]
pub struct ResponseCache {
    entries: Cache<CacheKey, Arc<Value>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        self.entries.insert(key, Arc::new(value)).await;
    }

    // Invalidation policy ----------------------------------------------------

    /// A new product can affect category aggregates and any listing page, so
    /// the whole cache is dropped rather than tracking every derived key.
    pub fn on_product_created(&self) {
        self.entries.invalidate_all();
    }

    pub async fn on_product_updated(&self, id: ObjectId, new_title: Option<&str>) {
        self.entries.invalidate(&CacheKey::AllProducts).await;
        self.entries.invalidate(&CacheKey::product_by_id(id)).await;
        if let Some(title) = new_title {
            self.entries
                .invalidate(&CacheKey::product_by_title(title))
                .await;
        }
    }

    pub async fn on_product_deleted(&self, id: ObjectId) {
        self.entries.invalidate(&CacheKey::AllProducts).await;
        self.entries.invalidate(&CacheKey::product_by_id(id)).await;
    }

    pub async fn on_category_created(&self) {
        self.entries.invalidate(&CacheKey::AllCategories).await;
    }

    /// `renamed_to` carries the new name when the update changed it; only the
    /// new name's listing key is invalidated, the old one ages out via TTL.
    pub async fn on_category_updated(&self, renamed_to: Option<&str>) {
        self.entries.invalidate(&CacheKey::AllCategories).await;
        if let Some(name) = renamed_to {
            self.entries
                .invalidate(&CacheKey::category_products(name))
                .await;
        }
    }

    pub async fn on_category_deleted(&self) {
        self.entries.invalidate(&CacheKey::AllCategories).await;
    }
}
