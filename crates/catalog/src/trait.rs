// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog trait
//!
//! The single question the compiler asks of the outside world.

/// Name lookup against external entities
///
/// Implementations must be pure: the same `(name, case_sensitive)` always
/// yields the same answer, and lookups may run concurrently from independent
/// compilations on different threads.
///
/// # Matching
///
/// - `case_sensitive == true`: only the byte-exact registered name matches
/// - `case_sensitive == false`: names match ignoring case; when several do,
///   the first registered one wins
///
/// # Examples
///
/// ```rust
/// use nested_sql_catalog::Catalog;
///
/// let catalog = |name: &str, _case_sensitive: bool| {
///     (name == "t").then(|| "db.t".to_string())
/// };
/// assert_eq!(catalog.lookup("t", true), Some("db.t".to_string()));
/// ```
pub trait Catalog: Send + Sync {
    /// Unique id of the entity named `name`, if any
    fn lookup(&self, name: &str, case_sensitive: bool) -> Option<String>;
}

impl<F> Catalog for F
where
    F: Fn(&str, bool) -> Option<String> + Send + Sync,
{
    fn lookup(&self, name: &str, case_sensitive: bool) -> Option<String> {
        self(name, case_sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_through_dyn(catalog: &dyn Catalog, name: &str) -> Option<String> {
        catalog.lookup(name, false)
    }

    #[test]
    fn test_closure_is_a_catalog() {
        let catalog = |name: &str, case_sensitive: bool| {
            let found = if case_sensitive {
                name == "Orders"
            } else {
                name.eq_ignore_ascii_case("orders")
            };
            found.then(|| "shop.orders".to_string())
        };

        assert_eq!(
            lookup_through_dyn(&catalog, "ORDERS"),
            Some("shop.orders".to_string())
        );
        assert_eq!(catalog.lookup("ORDERS", true), None);
        assert_eq!(catalog.lookup("Orders", true), Some("shop.orders".to_string()));
    }
}
