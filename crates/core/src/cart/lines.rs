//! The ordered, product-keyed collection of line items.

use serde::{Deserialize, Serialize};

use super::line_item::{CartDocument, LineItem, LineItemError, Placeholders};
use crate::types::ProductId;

/// Line items in insertion order, at most one per product id.
///
/// Adding a product that is already present increments its quantity and
/// keeps the existing price, name, image and size snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLines(Vec<LineItem>);

impl CartLines {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from a remote document, normalizing every record.
    ///
    /// Records that cannot be shown are skipped, and repeated product ids
    /// are folded into the first occurrence. A repeat that would overflow
    /// the merged line is skipped too.
    #[must_use]
    pub fn from_document(document: &CartDocument, placeholders: &Placeholders) -> Self {
        let mut lines = Self::new();
        for item in document
            .items
            .iter()
            .filter_map(|record| record.normalize(placeholders))
        {
            let _ = lines.add(item);
        }
        lines
    }

    /// Convert to the remote document shape.
    #[must_use]
    pub fn to_document(&self) -> CartDocument {
        CartDocument {
            items: self.0.iter().map(LineItem::to_record).collect(),
        }
    }

    /// Add an item, merging into an existing line for the same product.
    ///
    /// Returns the resulting quantity of that product's line.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError::QuantityTooHigh`] if the merged quantity does
    /// not fit in a line item, or [`LineItemError::TotalTooLarge`] if the
    /// merged line total overflows. The collection is unchanged on error.
    pub fn add(&mut self, item: LineItem) -> Result<u32, LineItemError> {
        if let Some(existing) = self.0.iter_mut().find(|i| i.product_id == item.product_id) {
            let merged = existing.quantity.checked_add(item.quantity).ok_or_else(|| {
                LineItemError::QuantityTooHigh(
                    i64::from(existing.quantity) + i64::from(item.quantity),
                )
            })?;
            if existing.price.times(merged).is_none() {
                return Err(LineItemError::TotalTooLarge);
            }
            existing.quantity = merged;
            return Ok(merged);
        }
        let quantity = item.quantity;
        self.0.push(item);
        Ok(quantity)
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `false` if the product is not in the collection.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        match self.0.iter_mut().find(|i| &i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for a product, returning it if it was present.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<LineItem> {
        self.position(product_id).map(|index| self.0.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.0.iter().find(|i| &i.product_id == product_id)
    }

    /// Returns `true` if the product has a line.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    /// The lines as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[LineItem] {
        &self.0
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Consume into the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<LineItem> {
        self.0
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.0.iter().position(|i| &i.product_id == product_id)
    }
}

impl<'a> IntoIterator for &'a CartLines {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<LineItem> for CartLines {
    fn from_iter<T: IntoIterator<Item = LineItem>>(iter: T) -> Self {
        let mut lines = Self::new();
        for item in iter {
            let _ = lines.add(item);
        }
        lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::line_item::{CartLineRecord, LineItemAttributes};
    use crate::types::{CustomSize, Size};

    fn item(id: &str, quantity: i64, price_cents: i64) -> LineItem {
        LineItem::new(
            ProductId::new(id),
            quantity,
            Decimal::new(price_cents, 2),
            LineItemAttributes::default(),
            &Placeholders::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut lines = CartLines::new();
        lines.add(item("A", 2, 1000)).unwrap();
        let merged = lines.add(item("A", 1, 1000)).unwrap();

        assert_eq!(merged, 3);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_add_rejects_overflowing_merge() {
        let mut lines = CartLines::new();
        lines.add(item("A", i64::from(u32::MAX), 100)).unwrap();

        let err = lines.add(item("A", 5, 100)).unwrap_err();
        assert_eq!(
            err,
            LineItemError::QuantityTooHigh(i64::from(u32::MAX) + 5)
        );
        assert_eq!(lines.get(&ProductId::new("A")).unwrap().quantity, u32::MAX);
    }

    #[test]
    fn test_add_rejects_merge_with_unrepresentable_total() {
        let mut lines = CartLines::new();
        let mut pricey = item("A", 1, 100);
        pricey.price = crate::types::Price::new(Decimal::MAX).unwrap();
        lines.add(pricey.clone()).unwrap();

        assert_eq!(lines.add(pricey).unwrap_err(), LineItemError::TotalTooLarge);
        assert_eq!(lines.get(&ProductId::new("A")).unwrap().quantity, 1);
    }

    #[test]
    fn test_add_keeps_first_snapshot() {
        let mut lines = CartLines::new();
        let mut first = item("A", 1, 1000);
        first.size = Some(Size::Small);
        lines.add(first).unwrap();

        let mut second = item("A", 1, 1200);
        second.size = Some(Size::Large);
        second.custom_size = Some(CustomSize {
            chest: Some(80.0),
            ..CustomSize::default()
        });
        lines.add(second).unwrap();

        let line = lines.get(&ProductId::new("A")).unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price.amount(), Decimal::new(1000, 2));
        assert_eq!(line.size, Some(Size::Small));
        assert!(line.custom_size.is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let lines: CartLines = [item("B", 1, 100), item("A", 1, 100), item("C", 1, 100)]
            .into_iter()
            .collect();
        let ids: Vec<&str> = lines.iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn test_set_quantity() {
        let mut lines = CartLines::new();
        lines.add(item("A", 1, 100)).unwrap();

        assert!(lines.set_quantity(&ProductId::new("A"), 5));
        assert_eq!(lines.get(&ProductId::new("A")).unwrap().quantity, 5);
        assert!(!lines.set_quantity(&ProductId::new("Z"), 5));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut lines = CartLines::new();
        lines.add(item("A", 1, 100)).unwrap();

        assert!(lines.remove(&ProductId::new("A")).is_some());
        assert!(lines.remove(&ProductId::new("A")).is_none());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_total_quantity_and_clear() {
        let mut lines = CartLines::new();
        lines.add(item("A", 2, 100)).unwrap();
        lines.add(item("B", 3, 100)).unwrap();
        assert_eq!(lines.total_quantity(), 5);

        lines.clear();
        assert!(lines.is_empty());
        assert_eq!(lines.total_quantity(), 0);
    }

    #[test]
    fn test_from_document_skips_and_folds() {
        let document = CartDocument {
            items: vec![
                CartLineRecord {
                    product_id: ProductId::new("A"),
                    quantity: Some(1),
                    price: Some(Decimal::new(500, 2)),
                    name: Some("Tie".to_string()),
                    image: None,
                    size: None,
                    custom_size: None,
                },
                CartLineRecord {
                    product_id: ProductId::new("B"),
                    quantity: None,
                    price: None,
                    name: None,
                    image: None,
                    size: None,
                    custom_size: None,
                },
                CartLineRecord {
                    product_id: ProductId::new("A"),
                    quantity: Some(2),
                    price: Some(Decimal::new(500, 2)),
                    name: None,
                    image: None,
                    size: None,
                    custom_size: None,
                },
            ],
        };

        let lines = CartLines::from_document(&document, &Placeholders::default());
        assert_eq!(lines.len(), 1);
        let tie = lines.get(&ProductId::new("A")).unwrap();
        assert_eq!(tie.quantity, 3);
        assert_eq!(tie.name, "Tie");
    }

    #[test]
    fn test_document_round_trip_preserves_lines() {
        let lines: CartLines = [item("A", 2, 1000), item("B", 1, 499)].into_iter().collect();
        let back = CartLines::from_document(&lines.to_document(), &Placeholders::default());
        assert_eq!(back, lines);
    }
}
