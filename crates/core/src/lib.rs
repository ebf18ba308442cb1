//! Uniform Shop Core - Shared types and cart logic.
//!
//! This crate provides the pieces used across all uniform shop components:
//! - `storefront` - Cart store, remote collaborator contracts, catalog lookup
//! - `cli` - Command-line tools for quoting carts and checking catalog forms
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O,
//! no async runtime, no remote clients. The storefront crate layers the
//! remote system of record on top of the collection defined in [`cart`].
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, sizes and statuses
//! - [`cart`] - Line items, remote line records, and the keyed line collection
//! - [`pricing`] - Subtotal, shipping and total aggregation
//! - [`catalog`] - Products, schools, and admin form validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod pricing;
pub mod types;

pub use cart::*;
pub use pricing::{CartTotals, PriceAggregator, Priced};
pub use types::*;
