//! Encoding profiles and global argument defaults.
//!
//! A [`ProfileCatalog`] is loaded from two JSON sources: a `Profiles` list and a
//! flat list of global engine arguments. [`CatalogCache`] shares loaded
//! catalogs between callers.

mod cache;
mod catalog;
mod error;
mod types;

pub use cache::CatalogCache;
pub use catalog::ProfileCatalog;
pub use error::CatalogError;
pub use types::{GlobalArgument, OutputArgs, Profile};
