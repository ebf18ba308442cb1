//! Shopper carts.
//!
//! [`CartStore`] keeps a mirror of each shopper's remote cart and routes
//! every mutation through a [`CartBackend`] before touching it.

mod backend;
mod memory;
mod notify;
mod store;
mod view;

pub use backend::{BackendError, CartBackend, CartChange};
pub use memory::{BackendOp, InMemoryCartBackend};
pub use notify::{Notification, NotificationSink, NotifyError, Outcome, TracingNotifier};
pub use store::{CartSnapshot, CartStatus, CartStore};
pub use view::{CartItemView, CartView};
