//! SQLite backend for the SWADroid local mirror.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every statement is parameterised; table
//! and column identifiers come only from the static layouts in
//! [`swadroid_core::layout`].

mod encode;
mod ops;
mod provision;
mod schema;
mod store;

pub mod config;
pub mod error;

pub use config::{StoreConfig, UpgradePolicy};
pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
pub use store::SqliteStore;
