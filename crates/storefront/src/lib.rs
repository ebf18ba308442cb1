//! Uniform Shop Storefront library.
//!
//! The storefront's cart logic and the contracts it needs from the hosted
//! database service, provided as a library so it can be tested and reused by
//! any UI layer.
//!
//! # Architecture
//!
//! - [`cart::CartStore`] mirrors each shopper's remote cart and applies
//!   mutations write-through: the remote store confirms before the mirror
//!   changes.
//! - [`cart::CartBackend`] is the remote cart contract;
//!   [`cart::InMemoryCartBackend`] implements it for tests and tooling.
//! - [`catalog::CatalogSource`] looks up products and schools;
//!   [`catalog::CachedCatalog`] fronts any source with a `moka` cache.
//! - [`config::StorefrontConfig`] is loaded from the environment.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
