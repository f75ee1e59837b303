//! Domain layer for the category catalog.
//!
//! Holds the `Category` entity, the `CategoryStore` capability implemented by
//! each storage backend, and the `CategoryService` that enforces the
//! existence rules for updates and deletions. Nothing here knows about HTTP
//! or SQL.

pub mod service;
pub mod store;
pub mod types;

pub use service::{CategoryError, CategoryService};
pub use store::{CategoryStore, InMemoryCategoryStore, StoreError};
pub use types::{Category, CategoryId, CategoryPayload};
