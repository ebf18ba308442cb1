//! Catalog lookup.
//!
//! Products and schools live in the remote store. The cart only needs a
//! product's current name, image, price and options when a shopper adds it.

mod cache;

pub use cache::CachedCatalog;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use uniform_shop_core::catalog::{Product, School};
use uniform_shop_core::{ProductId, SchoolId};

/// Errors from catalog lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No product or school with that id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog service could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read access to products and schools.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Look up a product.
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError>;

    /// Look up a school.
    async fn school(&self, id: &SchoolId) -> Result<School, CatalogError>;

    /// Every product belonging to `school`, in catalog order.
    async fn products_for_school(&self, school: &SchoolId) -> Result<Vec<Product>, CatalogError>;
}

#[derive(Default)]
struct CatalogData {
    products: Vec<Product>,
    schools: HashMap<SchoolId, School>,
}

/// In-memory [`CatalogSource`], cheap to clone.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    data: Arc<RwLock<CatalogData>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product.
    pub async fn upsert_product(&self, product: Product) {
        let mut data = self.data.write().await;
        match data.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => data.products.push(product),
        }
    }

    /// Insert or replace a school.
    pub async fn upsert_school(&self, school: School) {
        self.data
            .write()
            .await
            .schools
            .insert(school.id.clone(), school);
    }

    /// Delete a product. Returns whether it existed.
    pub async fn remove_product(&self, id: &ProductId) -> bool {
        let mut data = self.data.write().await;
        let before = data.products.len();
        data.products.retain(|p| &p.id != id);
        data.products.len() != before
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.data
            .read()
            .await
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))
    }

    async fn school(&self, id: &SchoolId) -> Result<School, CatalogError> {
        self.data
            .read()
            .await
            .schools
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("school {id}")))
    }

    async fn products_for_school(&self, school: &SchoolId) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .data
            .read()
            .await
            .products
            .iter()
            .filter(|p| &p.details.school_id == school)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use uniform_shop_core::catalog::{ProductDraft, SchoolDraft};
    use uniform_shop_core::{Gender, Price, Size};

    use super::*;

    pub fn product(id: &str, school: &str) -> Product {
        Product::new(
            ProductId::new(id),
            ProductDraft {
                name: format!("Shirt {id}"),
                description: None,
                price: Price::parse("450").unwrap(),
                original_price: None,
                category: Some("shirts".to_string()),
                school_id: SchoolId::new(school),
                image_urls: vec![format!("https://cdn.example.com/{id}.webp")],
                sizes: vec![Size::Small, Size::Medium],
                gender: Gender::Unisex,
                class_level: None,
                stock: 10,
                in_stock: true,
                allow_custom_size: false,
                is_featured: false,
                is_new: false,
                is_sale: false,
            },
        )
    }

    pub fn school(id: &str) -> School {
        School {
            id: SchoolId::new(id),
            details: SchoolDraft {
                name: "Green Valley".to_string(),
                slug: "green-valley".to_string(),
                description: None,
                location: None,
                logo_url: None,
                banner_url: None,
            },
        }
    }

    #[tokio::test]
    async fn test_lookup_and_not_found() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_product(product("p1", "s1")).await;
        catalog.upsert_school(school("s1")).await;

        assert_eq!(catalog.product(&ProductId::new("p1")).await.unwrap().id.as_str(), "p1");
        assert_eq!(
            catalog.school(&SchoolId::new("s1")).await.unwrap().details.slug,
            "green-valley"
        );
        assert!(matches!(
            catalog.product(&ProductId::new("nope")).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_products_for_school_keeps_order() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_product(product("p1", "s1")).await;
        catalog.upsert_product(product("p2", "s2")).await;
        catalog.upsert_product(product("p3", "s1")).await;

        let ids: Vec<String> = catalog
            .products_for_school(&SchoolId::new("s1"))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.into_inner())
            .collect();
        assert_eq!(ids, ["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_remove() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert_product(product("p1", "s1")).await;

        let mut renamed = product("p1", "s1");
        renamed.details.name = "Blazer".to_string();
        catalog.upsert_product(renamed).await;

        assert_eq!(
            catalog.product(&ProductId::new("p1")).await.unwrap().details.name,
            "Blazer"
        );
        assert!(catalog.remove_product(&ProductId::new("p1")).await);
        assert!(!catalog.remove_product(&ProductId::new("p1")).await);
    }
}
