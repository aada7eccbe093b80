//! Core types and trait definitions for the SWADroid local data layer.
//!
//! This crate is free of database and transport dependencies. It defines the
//! domain records mirrored from the SWAD web service, the per-table column
//! layouts, the boolean storage conventions, the name-based row mapper, and
//! the [`store::LocalStore`] trait implemented by storage backends.

pub mod codec;
pub mod config;
pub mod error;
pub mod layout;
pub mod mapper;
pub mod record;
pub mod store;
pub mod table;
pub mod value;

pub use error::{Error, Result};
pub use record::{Record, Relation};
pub use table::{RelationKind, Table};
pub use value::Value;
