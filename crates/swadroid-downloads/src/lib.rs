//! Browsing the service's downloadable document trees.
//!
//! [`parse_tree`] turns the service's tree document into [`DirectoryItem`]s;
//! [`DirectoryNavigator`] walks the result one folder at a time.

pub mod error;
pub mod navigator;
pub mod tree;
pub mod xml;

pub use error::{NavError, TreeError};
pub use navigator::DirectoryNavigator;
pub use tree::{DirectoryItem, DownloadsArea, FileInfo, ItemKind};
pub use xml::parse_tree;
