//! Cached catalog lookups.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};
use uniform_shop_core::catalog::{Product, School};
use uniform_shop_core::{ProductId, SchoolId};

use super::{CatalogError, CatalogSource};
use crate::config::CatalogCacheConfig;

/// Cache key for products and schools.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    School(SchoolId),
    SchoolProducts(SchoolId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    School(Box<School>),
    Products(Arc<Vec<Product>>),
}

/// Wraps a [`CatalogSource`] with a `moka` cache.
///
/// Only successful lookups are cached. Entries expire after the configured
/// TTL; admin edits should call the `invalidate_*` methods.
pub struct CachedCatalog<S> {
    inner: Arc<CachedCatalogInner<S>>,
}

impl<S> Clone for CachedCatalog<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CachedCatalogInner<S> {
    source: S,
    cache: Cache<CacheKey, CacheValue>,
}

impl<S: CatalogSource> CachedCatalog<S> {
    /// Create a cached catalog in front of `source`.
    #[must_use]
    pub fn new(source: S, config: &CatalogCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl)
            .build();

        Self {
            inner: Arc::new(CachedCatalogInner { source, cache }),
        }
    }

    /// The wrapped source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Invalidate a cached product and the product listing of `school`.
    ///
    /// If the cached copy belonged to another school, that listing is
    /// invalidated too.
    pub async fn invalidate_product(&self, id: &ProductId, school: &SchoolId) {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.remove(&key).await {
            if &product.details.school_id != school {
                self.inner
                    .cache
                    .invalidate(&CacheKey::SchoolProducts(product.details.school_id))
                    .await;
            }
        }
        self.inner
            .cache
            .invalidate(&CacheKey::SchoolProducts(school.clone()))
            .await;
    }

    /// Invalidate a cached school and its product listing.
    pub async fn invalidate_school(&self, id: &SchoolId) {
        self.inner
            .cache
            .invalidate(&CacheKey::School(id.clone()))
            .await;
        self.inner
            .cache
            .invalidate(&CacheKey::SchoolProducts(id.clone()))
            .await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl<S: CatalogSource> CatalogSource for CachedCatalog<S> {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.source.product(id).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    #[instrument(skip(self), fields(school_id = %id))]
    async fn school(&self, id: &SchoolId) -> Result<School, CatalogError> {
        let key = CacheKey::School(id.clone());

        if let Some(CacheValue::School(school)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for school");
            return Ok(*school);
        }

        let school = self.inner.source.school(id).await?;
        self.inner
            .cache
            .insert(key, CacheValue::School(Box::new(school.clone())))
            .await;

        Ok(school)
    }

    #[instrument(skip(self), fields(school_id = %school))]
    async fn products_for_school(&self, school: &SchoolId) -> Result<Vec<Product>, CatalogError> {
        let key = CacheKey::SchoolProducts(school.clone());

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for school products");
            return Ok(products.as_ref().clone());
        }

        let products = self.inner.source.products_for_school(school).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::new(products.clone())))
            .await;

        Ok(products)
    }
}
