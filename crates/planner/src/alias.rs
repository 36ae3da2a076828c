// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Alias synthesis
//!
//! FROM items, SELECT-list items and GROUP BY keys may omit `AS`. The builder
//! then derives a name from the expression:
//!
//! ```sql
//! SELECT x, t.a.b, 1 + 1 FROM orders, o.items
//! --     x  b      _3          orders  items
//! ```
//!
//! 1. a bare variable gives its own name
//! 2. a path gives its last literal key
//! 3. anything else gives `_<ordinal>` (1-based)

use nested_sql_ir::ast::{Expr, PathStep};
use nested_sql_ir::{CaseSensitivity, Identifier, Literal};

/// Name derived from an expression, if it has an obvious one
pub fn derived_name(expr: &Expr) -> Option<Identifier> {
    match expr {
        Expr::Var(var) => Some(var.name.clone()),
        Expr::Path { steps, .. } => match steps.last()? {
            PathStep::Field(name) => Some(name.clone()),
            PathStep::Index(Expr::Lit(Literal::String(key))) => {
                Some(Identifier::new(key.clone(), CaseSensitivity::Sensitive))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Alias for an unaliased FROM item or GROUP BY key
pub fn synthesize(expr: &Expr, ordinal: usize) -> Identifier {
    derived_name(expr).unwrap_or_else(|| Identifier::insensitive(positional(ordinal)))
}

/// Field name for an unaliased SELECT-list item
pub fn projection_name(expr: &Expr, ordinal: usize) -> String {
    derived_name(expr)
        .map(|name| name.text)
        .unwrap_or_else(|| positional(ordinal))
}

fn positional(ordinal: usize) -> String {
    format!("_{}", ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nested_sql_ir::SourceLocation;

    fn var(name: &str) -> Expr {
        Expr::var(Identifier::insensitive(name), SourceLocation::default())
    }

    #[test]
    fn test_variable_keeps_its_name() {
        assert_eq!(synthesize(&var("orders"), 1), Identifier::insensitive("orders"));
    }

    #[test]
    fn test_path_takes_last_literal_key() {
        let path = Expr::Path {
            root: Box::new(var("o")),
            steps: vec![
                PathStep::Field(Identifier::insensitive("items")),
                PathStep::Index(Expr::lit(Literal::string("Sku"))),
            ],
        };
        assert_eq!(synthesize(&path, 2), Identifier::sensitive("Sku"));
        assert_eq!(projection_name(&path, 2), "Sku");
    }

    #[test]
    fn test_positional_fallback() {
        let index = Expr::Path {
            root: Box::new(var("o")),
            steps: vec![PathStep::Index(Expr::lit(Literal::Integer(0)))],
        };
        assert_eq!(synthesize(&index, 3), Identifier::insensitive("_3"));
        assert_eq!(projection_name(&Expr::lit(Literal::Integer(1)), 1), "_1");
    }
}
