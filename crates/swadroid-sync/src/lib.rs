//! Notification synchronisation for the SWADroid local mirror.
//!
//! [`NotificationSync`] pulls new notifications from a [`NotificationSource`]
//! and merges them into any [`LocalStore`](swadroid_core::store::LocalStore)
//! in one transaction, trimming the table to the configured retention limit.

mod cancel;
mod convert;
mod driver;

pub mod config;
pub mod error;
pub mod remote;

pub use cancel::CancelToken;
pub use config::{Settings, SyncConfig};
pub use convert::notification_from_properties;
pub use driver::{NotificationSync, SyncContext, SyncEvent, SyncReport, SyncState};
pub use error::{Result, SyncError};
pub use remote::{NotificationSource, PropertyRecord, PropertyValue};
