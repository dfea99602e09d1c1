//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::CatalogConfig;
use crate::services::{CategoryCatalog, ProductCatalog};
use crate::store::{CategoryStore, ProductStore, StoreError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the store handles,
/// and the response cache. The services are constructed on demand and share
/// those handles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CatalogConfig,
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    cache: ResponseCache,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: CatalogConfig,
        products: Arc<dyn ProductStore>,
        categories: Arc<dyn CategoryStore>,
    ) -> Self {
        let cache = ResponseCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        );
        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                categories,
                cache,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Category service over the shared stores and cache.
    #[must_use]
    pub fn categories(&self) -> CategoryCatalog {
        CategoryCatalog::new(
            Arc::clone(&self.inner.categories),
            Arc::clone(&self.inner.products),
            self.inner.cache.clone(),
        )
    }

    /// Product service over the shared stores and cache.
    #[must_use]
    pub fn products(&self) -> ProductCatalog {
        ProductCatalog::new(
            Arc::clone(&self.inner.products),
            self.categories(),
            self.inner.cache.clone(),
        )
    }

    /// Verify the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the store does not respond.
    pub async fn ping_store(&self) -> Result<(), StoreError> {
        self.inner.products.ping().await
    }
}
