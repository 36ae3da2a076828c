// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Nested SQL - Catalog Layer
//!
//! The compiler knows nothing about storage. Whenever a variable is not bound
//! by the query itself, the binding resolver asks a [`Catalog`] whether the
//! name denotes an external entity and, if so, for its unique id.
//!
//! ## Implementations
//!
//! - any `Fn(&str, bool) -> Option<String> + Send + Sync` closure
//! - [`StaticCatalog`]: an ordered list of [`CatalogEntry`]s, built in code or
//!   loaded from a YAML/JSON file
//!
//! ## Usage
//!
//! ```rust
//! use nested_sql_catalog::{Catalog, CatalogEntry, StaticCatalog};
//!
//! let catalog = StaticCatalog::new()
//!     .with_entry(CatalogEntry::new("orders", "shop"));
//!
//! assert_eq!(catalog.lookup("ORDERS", false), Some("shop.orders".to_string()));
//! assert_eq!(catalog.lookup("ORDERS", true), None);
//! ```
//!
//! ## Ambiguity
//!
//! Several entries can match one case-insensitive lookup (`Orders` and
//! `orders`). Implementations must answer with the entry registered first so
//! that compilation stays reproducible.

pub mod error;
pub mod metadata;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use error::{CatalogError, CatalogResult};
pub use metadata::{CatalogEntry, EntityKind};
pub use r#static::StaticCatalog;
pub use r#trait::Catalog;
