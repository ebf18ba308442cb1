//! Cart line items and the keyed line collection.
//!
//! A cart is an ordered set of [`LineItem`]s keyed by product id. The remote
//! store holds [`CartLineRecord`]s, which may be missing display fields;
//! [`CartLines::from_document`] normalizes them into line items.

pub mod line_item;
pub mod lines;

pub use line_item::{
    CartDocument, CartLineRecord, LineItem, LineItemAttributes, LineItemError, Placeholders,
    validate_quantity,
};
pub use lines::CartLines;
