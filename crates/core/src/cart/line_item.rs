//! Line item types and validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::Priced;
use crate::types::{CustomSize, Price, PriceError, ProductId, Size};

/// Errors raised when a line item would violate its invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineItemError {
    /// Quantity below one.
    #[error("quantity must be at least 1 (got {0})")]
    QuantityTooLow(i64),
    /// Quantity does not fit in a line item.
    #[error("quantity {0} is too large")]
    QuantityTooHigh(i64),
    /// Unit price rejected.
    #[error(transparent)]
    Price(#[from] PriceError),
    /// `price * quantity`, or the cart total, does not fit in a `Decimal`.
    #[error("total is too large")]
    TotalTooLarge,
}

/// Validate a requested quantity and convert it to the stored representation.
///
/// # Errors
///
/// Returns [`LineItemError::QuantityTooLow`] for anything below 1 and
/// [`LineItemError::QuantityTooHigh`] if the value does not fit in a `u32`.
pub fn validate_quantity(quantity: i64) -> Result<u32, LineItemError> {
    if quantity < 1 {
        return Err(LineItemError::QuantityTooLow(quantity));
    }
    u32::try_from(quantity).map_err(|_| LineItemError::QuantityTooHigh(quantity))
}

/// Display fallbacks used when a stored line is missing its snapshot fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    /// Shown when the product name is missing.
    pub name: String,
    /// Shown when the product image is missing.
    pub image: String,
}

impl Placeholders {
    /// Name shown for a line whose product name was never captured.
    pub const DEFAULT_NAME: &'static str = "Unknown Product";
    /// Image shown for a line whose product image was never captured.
    pub const DEFAULT_IMAGE: &'static str = "/images/placeholder.webp";
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_owned(),
            image: Self::DEFAULT_IMAGE.to_owned(),
        }
    }
}

/// Optional attributes captured when an item is added.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_size: Option<CustomSize>,
}

/// One product's presence in a cart.
///
/// `quantity` is always at least 1 and `price` is the unit price captured
/// when the item was first added; it does not follow later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_size: Option<CustomSize>,
}

impl LineItem {
    /// Build a validated line item.
    ///
    /// Missing or blank display fields fall back to `placeholders`.
    ///
    /// # Errors
    ///
    /// Returns an error if `quantity < 1`, `price` is negative, or their
    /// product cannot be represented.
    pub fn new(
        product_id: ProductId,
        quantity: i64,
        price: Decimal,
        attributes: LineItemAttributes,
        placeholders: &Placeholders,
    ) -> Result<Self, LineItemError> {
        let quantity = validate_quantity(quantity)?;
        let price = Price::new(price)?;
        if price.times(quantity).is_none() {
            return Err(LineItemError::TotalTooLarge);
        }

        Ok(Self {
            product_id,
            quantity,
            price,
            name: non_blank(attributes.name).unwrap_or_else(|| placeholders.name.clone()),
            image: non_blank(attributes.image).unwrap_or_else(|| placeholders.image.clone()),
            size: attributes.size,
            custom_size: attributes.custom_size.filter(|c| !c.is_empty()),
        })
    }

    /// `price * quantity` for this line, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Priced::line_total(self)
    }

    /// Convert to the shape stored by the remote collaborator.
    #[must_use]
    pub fn to_record(&self) -> CartLineRecord {
        CartLineRecord {
            product_id: self.product_id.clone(),
            quantity: Some(i64::from(self.quantity)),
            price: Some(self.price.amount()),
            name: Some(self.name.clone()),
            image: Some(self.image.clone()),
            size: self.size.map(|s| s.label().to_owned()),
            custom_size: self.custom_size.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A cart line as held by the remote store.
///
/// Older documents may lack a price, name or image, so every field beyond
/// the product id is optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRecord {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub custom_size: Option<CustomSize>,
}

impl CartLineRecord {
    /// Normalize into a [`LineItem`].
    ///
    /// A missing or negative price becomes zero, blank display fields take
    /// the placeholders, and an unrecognized size label is dropped. Returns
    /// `None` when the stored quantity is missing or below 1, or when the
    /// line total overflows, since such a line cannot be shown.
    #[must_use]
    pub fn normalize(&self, placeholders: &Placeholders) -> Option<LineItem> {
        let quantity = self.quantity.and_then(|q| validate_quantity(q).ok())?;
        let price = self
            .price
            .and_then(|p| Price::new(p).ok())
            .unwrap_or(Price::ZERO);
        price.times(quantity)?;

        Some(LineItem {
            product_id: self.product_id.clone(),
            quantity,
            price,
            name: non_blank(self.name.clone()).unwrap_or_else(|| placeholders.name.clone()),
            image: non_blank(self.image.clone()).unwrap_or_else(|| placeholders.image.clone()),
            size: self.size.as_deref().and_then(|s| s.parse().ok()),
            custom_size: self.custom_size.clone().filter(|c| !c.is_empty()),
        })
    }
}

/// The remote cart document for one shopper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartDocument {
    #[serde(default)]
    pub items: Vec<CartLineRecord>,
}
