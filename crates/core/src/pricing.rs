//! Price aggregation over cart lines.
//!
//! Everything here is pure: totals are derived from whatever lines are passed
//! in and nothing is cached, so a caller that recomputes after each mutation
//! always shows `subtotal + shipping == total`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{CartLineRecord, LineItem};
use crate::types::Price;

/// Anything that contributes `unit price * quantity` to a subtotal.
///
/// Implementors may report a missing price or quantity; aggregation treats
/// a missing, negative or zero value as contributing nothing.
pub trait Priced {
    /// Unit price, if known.
    fn unit_price(&self) -> Option<Decimal>;
    /// Quantity, if known.
    fn quantity(&self) -> Option<i64>;

    /// `unit price * quantity`, or zero if either is missing or invalid.
    ///
    /// Returns `None` only when the product overflows.
    fn checked_line_total(&self) -> Option<Decimal> {
        match (self.unit_price(), self.quantity()) {
            (Some(price), Some(quantity)) if price > Decimal::ZERO && quantity > 0 => {
                price.checked_mul(Decimal::from(quantity))
            }
            _ => Some(Decimal::ZERO),
        }
    }

    /// As [`Priced::checked_line_total`], saturating at `Decimal::MAX`.
    fn line_total(&self) -> Decimal {
        self.checked_line_total().unwrap_or(Decimal::MAX)
    }
}

impl Priced for LineItem {
    fn unit_price(&self) -> Option<Decimal> {
        Some(self.price.amount())
    }

    fn quantity(&self) -> Option<i64> {
        Some(i64::from(self.quantity))
    }
}

impl Priced for CartLineRecord {
    fn unit_price(&self) -> Option<Decimal> {
        self.price
    }

    fn quantity(&self) -> Option<i64> {
        self.quantity
    }
}

impl<T: Priced + ?Sized> Priced for &T {
    fn unit_price(&self) -> Option<Decimal> {
        (**self).unit_price()
    }

    fn quantity(&self) -> Option<i64> {
        (**self).quantity()
    }
}

/// Σ `price * quantity` over `items`. An empty collection sums to zero.
///
/// Saturates at `Decimal::MAX`; use [`checked_subtotal`] to detect that.
pub fn subtotal<I>(items: I) -> Decimal
where
    I: IntoIterator,
    I::Item: Priced,
{
    items
        .into_iter()
        .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
}

/// Σ `price * quantity` over `items`, or `None` if any step overflows.
pub fn checked_subtotal<I>(items: I) -> Option<Decimal>
where
    I: IntoIterator,
    I::Item: Priced,
{
    items
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.checked_line_total()?))
}

/// Derives subtotal, shipping and total from cart lines.
///
/// Shipping is a flat rate charged on every order regardless of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceAggregator {
    flat_rate: Price,
}

impl PriceAggregator {
    /// The storefront's standard flat shipping rate.
    pub const DEFAULT_FLAT_RATE: Decimal = Decimal::from_parts(499, 0, 0, false, 2);

    /// Create an aggregator charging `flat_rate` shipping on every order.
    #[must_use]
    pub const fn with_flat_rate(flat_rate: Price) -> Self {
        Self { flat_rate }
    }

    /// The configured flat shipping rate.
    #[must_use]
    pub const fn flat_rate(&self) -> Price {
        self.flat_rate
    }

    /// Σ `price * quantity` over `items`.
    #[must_use]
    pub fn subtotal<I>(&self, items: I) -> Decimal
    where
        I: IntoIterator,
        I::Item: Priced,
    {
        subtotal(items)
    }

    /// Shipping charge for `items`. Independent of the cart contents.
    #[must_use]
    pub fn shipping<I>(&self, _items: I) -> Decimal
    where
        I: IntoIterator,
        I::Item: Priced,
    {
        self.flat_rate.amount()
    }

    /// `subtotal(items) + shipping(items)`.
    #[must_use]
    pub fn total<I>(&self, items: I) -> Decimal
    where
        I: IntoIterator,
        I::Item: Priced,
    {
        subtotal(items).saturating_add(self.flat_rate.amount())
    }

    /// Compute all figures from a single pass over `items`.
    ///
    /// Amounts saturate at `Decimal::MAX` rather than overflow.
    #[must_use]
    pub fn totals<I>(&self, items: I) -> CartTotals
    where
        I: IntoIterator,
        I::Item: Priced,
    {
        let mut subtotal = Decimal::ZERO;
        let mut item_count: u64 = 0;
        for item in items {
            subtotal = subtotal.saturating_add(item.line_total());
            item_count = item_count.saturating_add(quantity_of(&item));
        }
        let shipping = self.flat_rate.amount();

        CartTotals {
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
            item_count,
        }
    }

    /// As [`PriceAggregator::totals`], but `None` if any amount overflows.
    #[must_use]
    pub fn checked_totals<I>(&self, items: I) -> Option<CartTotals>
    where
        I: IntoIterator,
        I::Item: Priced,
    {
        let mut subtotal = Decimal::ZERO;
        let mut item_count: u64 = 0;
        for item in items {
            subtotal = subtotal.checked_add(item.checked_line_total()?)?;
            item_count = item_count.saturating_add(quantity_of(&item));
        }
        let total = subtotal.checked_add(self.flat_rate.amount())?;
        Some(CartTotals {
            subtotal,
            shipping: self.flat_rate.amount(),
            total,
            item_count,
        })
    }
}

fn quantity_of<P: Priced>(item: &P) -> u64 {
    item.quantity()
        .and_then(|q| u64::try_from(q).ok())
        .unwrap_or(0)
}

impl Default for PriceAggregator {
    fn default() -> Self {
        Self::with_flat_rate(Price::new(Self::DEFAULT_FLAT_RATE).unwrap_or(Price::ZERO))
    }
}

/// Derived cart figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    /// Sum of line quantities.
    pub item_count: u64,
}
