// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! An in-memory catalog with a fixed list of entries, used by the explain
//! binary and by tests.
//!
//! ## File format
//!
//! ```yaml
//! entries:
//!   - name: orders
//!     schema: shop
//!   - name: Customers
//!     schema: shop
//!     unique_id: shop.customers_v2
//!   - name: refresh_stats
//!     kind: procedure
//! ```
//!
//! The same document is accepted as JSON.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nested_sql_catalog::StaticCatalog;
//!
//! let catalog = StaticCatalog::from_path("catalog.yaml")?;
//! let id = catalog.lookup("orders", false);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use nested_sql_ir::ident::eq_ignore_case;

use crate::metadata::CatalogEntry;
use crate::{Catalog, CatalogError, CatalogResult};

/// Static catalog with predefined entries
///
/// Entries keep their registration order, which decides case-insensitive
/// ambiguity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting exact duplicate names
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> CatalogResult<Self> {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.add_entry(entry)?;
        }
        Ok(catalog)
    }

    /// Register an entry
    ///
    /// Names differing only in case are allowed; byte-identical names are not.
    pub fn add_entry(&mut self, entry: CatalogEntry) -> CatalogResult<()> {
        if self.entries.iter().any(|e| e.name == entry.name) {
            return Err(CatalogError::DuplicateEntry(entry.name));
        }
        debug!(name = %entry.name, id = %entry.resolved_id(), "Registered catalog entry");
        self.entries.push(entry);
        Ok(())
    }

    /// Builder-style [`StaticCatalog::add_entry`]; duplicates are dropped
    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        if let Err(err) = self.add_entry(entry) {
            debug!(error = %err, "Ignoring catalog entry");
        }
        self
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry a lookup resolves to
    pub fn find(&self, name: &str, case_sensitive: bool) -> Option<&CatalogEntry> {
        if case_sensitive {
            self.entries.iter().find(|e| e.name == name)
        } else {
            self.entries.iter().find(|e| eq_ignore_case(&e.name, name))
        }
    }

    /// Parse a YAML catalog document
    pub fn from_yaml_str(source: &str) -> CatalogResult<Self> {
        let parsed: StaticCatalog =
            serde_yaml::from_str(source).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_entries(parsed.entries)
    }

    /// Parse a JSON catalog document
    pub fn from_json_str(source: &str) -> CatalogResult<Self> {
        let parsed: StaticCatalog =
            serde_json::from_str(source).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_entries(parsed.entries)
    }

    /// Load a catalog file, choosing the format by extension
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let catalog = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&source)?,
            "json" => Self::from_json_str(&source)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };

        debug!(path = %path.display(), entries = catalog.len(), "Loaded static catalog");
        Ok(catalog)
    }
}

impl Catalog for StaticCatalog {
    fn lookup(&self, name: &str, case_sensitive: bool) -> Option<String> {
        self.find(name, case_sensitive).map(CatalogEntry::resolved_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StaticCatalog {
        StaticCatalog::new()
            .with_entry(CatalogEntry::new("Orders", "shop"))
            .with_entry(CatalogEntry::new("orders", "archive"))
            .with_entry(CatalogEntry::unqualified("hits"))
    }

    #[test]
    fn test_case_insensitive_lookup_prefers_first_registered() {
        let catalog = sample();
        assert_eq!(catalog.lookup("ORDERS", false), Some("shop.Orders".to_string()));
        assert_eq!(catalog.lookup("orders", false), Some("shop.Orders".to_string()));
    }

    #[test]
    fn test_case_sensitive_lookup_is_exact() {
        let catalog = sample();
        assert_eq!(catalog.lookup("orders", true), Some("archive.orders".to_string()));
        assert_eq!(catalog.lookup("Orders", true), Some("shop.Orders".to_string()));
        assert_eq!(catalog.lookup("ORDERS", true), None);
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut catalog = sample();
        let err = catalog
            .add_entry(CatalogEntry::unqualified("hits"))
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateEntry("hits".to_string()));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
entries:
  - name: orders
    schema: shop
  - name: Customers
    schema: shop
    unique_id: shop.customers_v2
"#;
        let catalog = StaticCatalog::from_yaml_str(yaml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.lookup("customers", false),
            Some("shop.customers_v2".to_string())
        );
    }

    #[test]
    fn test_from_json_str_rejects_duplicates() {
        let json = r#"{"entries": [{"name": "t"}, {"name": "t"}]}"#;
        let err = StaticCatalog::from_json_str(json).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateEntry("t".to_string()));
    }

    #[test]
    fn test_parse_error() {
        let err = StaticCatalog::from_yaml_str("entries: [").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
