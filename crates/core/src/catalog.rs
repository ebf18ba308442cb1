//! Catalog types: products, schools, and the admin forms that edit them.
//!
//! The admin console submits raw strings; [`ProductForm::validate`] and
//! [`SchoolForm::validate`] turn them into drafts the remote store can
//! persist. [`Product::check_selection`] guards the storefront's
//! add-to-cart form against choices the product does not offer.

use serde::{Deserialize, Serialize};

use crate::cart::{LineItemAttributes, LineItemError, validate_quantity};
use crate::types::{
    Availability, CustomSize, Gender, Price, PriceError, ProductId, SchoolId, Size, SizeError,
};

const fn default_true() -> bool {
    true
}

// =============================================================================
// Products
// =============================================================================

/// Product fields shared by stored products and validated admin drafts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default)]
    pub category: Option<String>,
    pub school_id: SchoolId,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub class_level: Option<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub allow_custom_size: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_sale: bool,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: ProductDraft,
}

/// Reasons a shopper's selection cannot be added to the cart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("product is out of stock")]
    OutOfStock,
    #[error("please choose a size")]
    SizeRequired,
    #[error("size {0} is not available for this product")]
    SizeUnavailable(Size),
    #[error("custom sizing is not offered for this product")]
    CustomSizeNotAllowed,
    #[error("custom measurements must be positive numbers")]
    InvalidMeasurements,
    #[error("only {available} left in stock (requested {requested})")]
    ExceedsStock { requested: u32, available: u32 },
    #[error(transparent)]
    Quantity(#[from] LineItemError),
}

/// What a shopper picked on the product page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub quantity: i64,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub custom_size: Option<CustomSize>,
}

impl Product {
    /// Units at or below this count are shown as low stock.
    pub const LOW_STOCK_THRESHOLD: u32 = 5;

    /// Create a product from a validated draft and the id the store assigned.
    #[must_use]
    pub const fn new(id: ProductId, details: ProductDraft) -> Self {
        Self { id, details }
    }

    /// Availability as shown on product cards.
    #[must_use]
    pub const fn availability(&self) -> Availability {
        let d = &self.details;
        if !d.in_stock || d.stock == 0 {
            Availability::OutOfStock
        } else if d.stock <= Self::LOW_STOCK_THRESHOLD {
            Availability::LowStock
        } else {
            Availability::InStock
        }
    }

    /// The first image, used as the cart snapshot and card thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.details
            .image_urls
            .iter()
            .map(String::as_str)
            .find(|url| !url.trim().is_empty())
    }

    /// Percentage saved against the original price, if the product is discounted.
    #[must_use]
    pub fn discount_percent(&self) -> Option<rust_decimal::Decimal> {
        let original = self.details.original_price?.amount();
        let price = self.details.price.amount();
        if original <= price || original.is_zero() {
            return None;
        }
        Some(((original - price) / original * rust_decimal::Decimal::ONE_HUNDRED).round())
    }

    /// Check a selection against what this product offers.
    ///
    /// # Errors
    ///
    /// Returns the first reason the selection cannot be added to a cart.
    pub fn check_selection(&self, selection: &Selection) -> Result<u32, SelectionError> {
        let quantity = validate_quantity(selection.quantity)?;
        let d = &self.details;

        if self.availability() == Availability::OutOfStock {
            return Err(SelectionError::OutOfStock);
        }

        let custom = selection.custom_size.as_ref().filter(|c| !c.is_empty());
        if let Some(custom) = custom {
            if !d.allow_custom_size {
                return Err(SelectionError::CustomSizeNotAllowed);
            }
            if !custom.has_valid_measurements() {
                return Err(SelectionError::InvalidMeasurements);
            }
        }

        match selection.size {
            Some(size) if !d.sizes.contains(&size) => {
                return Err(SelectionError::SizeUnavailable(size));
            }
            None if !d.sizes.is_empty() && custom.is_none() => {
                return Err(SelectionError::SizeRequired);
            }
            _ => {}
        }

        if quantity > d.stock {
            return Err(SelectionError::ExceedsStock {
                requested: quantity,
                available: d.stock,
            });
        }

        Ok(quantity)
    }

    /// Snapshot attributes for a cart line built from this product.
    #[must_use]
    pub fn line_attributes(&self, selection: &Selection) -> LineItemAttributes {
        LineItemAttributes {
            name: Some(self.details.name.clone()),
            image: self.primary_image().map(str::to_owned),
            size: selection.size,
            custom_size: selection.custom_size.clone().filter(|c| !c.is_empty()),
        }
    }
}

// =============================================================================
// Schools
// =============================================================================

/// School fields shared by stored schools and validated admin drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolDraft {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
}

/// A school whose uniforms the shop sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: SchoolId,
    #[serde(flatten)]
    pub details: SchoolDraft,
}

/// Derive a URL slug: lowercase ASCII alphanumerics with single `-` separators.
///
/// ```
/// use uniform_shop_core::catalog::slugify;
///
/// assert_eq!(slugify("St. Mary's  High School"), "st-mary-s-high-school");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

// =============================================================================
// Admin forms
// =============================================================================

/// Errors from validating an admin catalog form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogFormError {
    #[error("name is required")]
    MissingName,
    #[error("a school must be selected")]
    MissingSchool,
    #[error("slug could not be derived from the name")]
    InvalidSlug,
    #[error("price: {0}")]
    Price(PriceError),
    #[error("original price: {0}")]
    OriginalPrice(PriceError),
    #[error("stock must be a whole number of units (got {0:?})")]
    InvalidStock(String),
    #[error(transparent)]
    Size(#[from] SizeError),
}

/// Raw product form as submitted by the admin console.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: String,
    pub category: String,
    pub stock: String,
    pub class_level: String,
    pub school_id: String,
    pub in_stock: bool,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_sale: bool,
    pub sizes: Vec<String>,
    pub gender: Gender,
    pub allow_custom_size: bool,
    pub image_urls: Vec<String>,
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl ProductForm {
    /// A blank form, as opened by "Add Product".
    #[must_use]
    pub fn blank() -> Self {
        Self {
            in_stock: true,
            ..Self::default()
        }
    }

    /// Pre-fill the form from an existing product, as opened by "Edit".
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        let d = &product.details;
        Self {
            name: d.name.clone(),
            description: d.description.clone().unwrap_or_default(),
            price: d.price.to_string(),
            original_price: d.original_price.map(|p| p.to_string()).unwrap_or_default(),
            category: d.category.clone().unwrap_or_default(),
            stock: d.stock.to_string(),
            class_level: d.class_level.clone().unwrap_or_default(),
            school_id: d.school_id.to_string(),
            in_stock: d.in_stock,
            is_featured: d.is_featured,
            is_new: d.is_new,
            is_sale: d.is_sale,
            sizes: d.sizes.iter().map(|s| s.label().to_owned()).collect(),
            gender: d.gender,
            allow_custom_size: d.allow_custom_size,
            image_urls: d.image_urls.clone(),
        }
    }

    /// Toggle a size checkbox on or off.
    pub fn toggle_size(&mut self, size: Size) {
        let before = self.sizes.len();
        self.sizes.retain(|s| s.parse::<Size>() != Ok(size));
        if self.sizes.len() == before {
            self.sizes.push(size.label().to_owned());
        }
    }

    /// Validate and convert into a draft.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self) -> Result<ProductDraft, CatalogFormError> {
        let name = optional_text(&self.name).ok_or(CatalogFormError::MissingName)?;
        let school_id = optional_text(&self.school_id).ok_or(CatalogFormError::MissingSchool)?;
        let price = Price::parse(&self.price).map_err(CatalogFormError::Price)?;
        let original_price = match optional_text(&self.original_price) {
            Some(raw) => Some(Price::parse(&raw).map_err(CatalogFormError::OriginalPrice)?),
            None => None,
        };
        let stock = self
            .stock
            .trim()
            .parse::<u32>()
            .map_err(|_| CatalogFormError::InvalidStock(self.stock.clone()))?;

        let mut sizes = Vec::with_capacity(self.sizes.len());
        for raw in &self.sizes {
            let size: Size = raw.parse()?;
            if !sizes.contains(&size) {
                sizes.push(size);
            }
        }
        sizes.sort_unstable();

        Ok(ProductDraft {
            name,
            description: optional_text(&self.description),
            price,
            original_price,
            category: optional_text(&self.category),
            school_id: SchoolId::new(school_id),
            image_urls: self
                .image_urls
                .iter()
                .filter_map(|url| optional_text(url))
                .collect(),
            sizes,
            gender: self.gender,
            class_level: optional_text(&self.class_level),
            stock,
            in_stock: self.in_stock,
            allow_custom_size: self.allow_custom_size,
            is_featured: self.is_featured,
            is_new: self.is_new,
            is_sale: self.is_sale,
        })
    }
}

/// Raw school form as submitted by the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolForm {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub logo_url: String,
    pub banner_url: String,
}

impl SchoolForm {
    /// Validate and convert into a draft. A blank slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or no slug can be derived.
    pub fn validate(&self) -> Result<SchoolDraft, CatalogFormError> {
        let name = optional_text(&self.name).ok_or(CatalogFormError::MissingName)?;
        let slug = match optional_text(&self.slug) {
            Some(slug) => slugify(&slug),
            None => slugify(&name),
        };
        if slug.is_empty() {
            return Err(CatalogFormError::InvalidSlug);
        }

        Ok(SchoolDraft {
            name,
            slug,
            description: optional_text(&self.description),
            location: optional_text(&self.location),
            logo_url: optional_text(&self.logo_url),
            banner_url: optional_text(&self.banner_url),
        })
    }
}
