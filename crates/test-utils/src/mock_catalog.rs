// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock catalog implementation for testing
//!
//! Wraps a [`StaticCatalog`] and records every lookup, so tests can check
//! which names reached the catalog and with what case sensitivity.

use std::sync::Mutex;

use nested_sql_catalog::{Catalog, CatalogEntry, EntityKind, StaticCatalog};

/// In-memory catalog that records its lookups
#[derive(Debug, Default)]
pub struct MockCatalog {
    inner: StaticCatalog,
    lookups: Mutex<Vec<(String, bool)>>,
}

impl MockCatalog {
    /// Create a new empty mock catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(name, case_sensitive)` pair looked up so far
    pub fn lookups(&self) -> Vec<(String, bool)> {
        self.lookups
            .lock()
            .map(|lookups| lookups.clone())
            .unwrap_or_default()
    }

    /// Whether `name` was ever looked up, in any casing
    pub fn was_looked_up(&self, name: &str) -> bool {
        self.lookups()
            .iter()
            .any(|(looked_up, _)| looked_up.eq_ignore_ascii_case(name))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        self.inner.entries()
    }
}

impl Catalog for MockCatalog {
    fn lookup(&self, name: &str, case_sensitive: bool) -> Option<String> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push((name.to_string(), case_sensitive));
        }
        self.inner.lookup(name, case_sensitive)
    }
}

/// Builder for creating mock catalogs with a fluent API
pub struct MockCatalogBuilder {
    catalog: StaticCatalog,
}

impl Default for MockCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            catalog: StaticCatalog::new(),
        }
    }

    /// Add the tables most resolver tests use
    ///
    /// | name      | id             |
    /// |-----------|----------------|
    /// | `orders`  | `shop.orders`  |
    /// | `Foo`     | `shop.Foo`     |
    /// | `foo`     | `shop.foo`     |
    /// | `t`       | `shop.t`       |
    /// | `archive` | `shop.archive` |
    pub fn with_standard_schema(self) -> Self {
        self.with_table("orders", "shop")
            .with_table("Foo", "shop")
            .with_table("foo", "shop")
            .with_table("t", "shop")
            .with_table("archive", "shop")
    }

    /// Add a table qualified by `schema`
    pub fn with_table(mut self, name: &str, schema: &str) -> Self {
        self.catalog = self.catalog.with_entry(CatalogEntry::new(name, schema));
        self
    }

    /// Add a table with an explicit unique id
    pub fn with_table_id(mut self, name: &str, unique_id: &str) -> Self {
        self.catalog = self
            .catalog
            .with_entry(CatalogEntry::unqualified(name).with_unique_id(unique_id));
        self
    }

    pub fn with_procedure(mut self, name: &str) -> Self {
        self.catalog = self
            .catalog
            .with_entry(CatalogEntry::unqualified(name).with_kind(EntityKind::Procedure));
        self
    }

    /// Build the catalog
    pub fn build(self) -> MockCatalog {
        MockCatalog {
            inner: self.catalog,
            lookups: Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema_lookup() {
        let catalog = MockCatalogBuilder::new().with_standard_schema().build();

        assert_eq!(catalog.lookup("ORDERS", false), Some("shop.orders".to_string()));
        assert_eq!(catalog.lookup("foo", true), Some("shop.foo".to_string()));
        assert_eq!(catalog.lookup("Foo", true), Some("shop.Foo".to_string()));
        assert_eq!(catalog.lookup("FOO", true), None);
    }

    #[test]
    fn test_lookups_are_recorded() {
        let catalog = MockCatalogBuilder::new()
            .with_table_id("hits", "web.hits#1")
            .build();

        assert_eq!(catalog.lookup("Hits", false), Some("web.hits#1".to_string()));
        assert_eq!(catalog.lookup("misses", true), None);
        assert_eq!(
            catalog.lookups(),
            vec![("Hits".to_string(), false), ("misses".to_string(), true)]
        );
        assert!(catalog.was_looked_up("hits"));
        assert!(!catalog.was_looked_up("orders"));
    }

    #[test]
    fn test_builder_ignores_duplicates() {
        let catalog = MockCatalogBuilder::new()
            .with_table("orders", "shop")
            .with_table("orders", "archive")
            .build();

        assert_eq!(catalog.entries().len(), 1);
    }
}
