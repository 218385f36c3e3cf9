//! mqlite-admin-core - Core types for the mqlite admin registry.
//!
//! This crate provides the insertion-ordered keyed registry, the pagination
//! window arithmetic and the record types served by the admin API. It has no
//! locking of its own; the stores in `mqlite-admin` wrap it.

pub mod error;
pub mod ordered;
pub mod page;
pub mod record;

pub use error::{Error, Result};
pub use ordered::OrderedRegistry;
pub use page::{Page, PageRequest};
pub use record::*;
