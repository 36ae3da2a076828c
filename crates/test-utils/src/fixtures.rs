// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: catalog documents and sample statements

use nested_sql_ir::ast::{Expr, Statement, StructField};
use nested_sql_ir::{BinaryOp, CaseSensitivity, CollectionKind, JoinKind};

use crate::mock_ast::{
    alias, binary, comma_join, dml_path, eq, int, join, locals_only_var, path, string,
    unpivot_path, var, var_syntax, MockDmlBuilder, MockFromItem, MockSelectBuilder,
};

/// Sample catalog documents
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// The shop schema in YAML
    pub const fn shop_yaml() -> &'static str {
        r#"entries:
  - name: orders
    schema: shop
  - name: customers
    schema: shop
    comment: one row per customer
  - name: Foo
    schema: shop
  - name: archive
    unique_id: "cold.archive#7"
  - name: refund
    kind: procedure
"#
    }

    /// The shop schema in JSON
    pub const fn shop_json() -> &'static str {
        r#"{"entries": [
  {"name": "orders", "schema": "shop"},
  {"name": "customers", "schema": "shop", "comment": "one row per customer"},
  {"name": "Foo", "schema": "shop"},
  {"name": "archive", "unique_id": "cold.archive#7"},
  {"name": "refund", "kind": "procedure"}
]}"#
    }
}

/// Sample statements, built without a parser
///
/// Each fixture documents the query text it stands for; locations in the
/// built tree match that text.
pub struct StatementFixtures;

impl StatementFixtures {
    /// ```sql
    /// SELECT FOO.* FROM 1 AS foo WHERE FOO
    /// ```
    pub fn star_over_literal() -> Statement {
        MockSelectBuilder::all_of(unpivot_path(var("FOO", 1, 8)))
            .from(
                MockFromItem::new(int(1))
                    .as_alias("foo", 1, 24)
                    .with_location(1, 19)
                    .scan(),
            )
            .filter(var("FOO", 1, 34))
            .statement()
    }

    /// ```sql
    /// SELECT VALUE o FROM orders AS o, o.items AS i WHERE i.qty > 1
    /// ```
    pub fn orders_with_items() -> Statement {
        let from = comma_join(vec![
            MockFromItem::new(var("orders", 1, 21))
                .as_alias("o", 1, 31)
                .scan(),
            MockFromItem::new(path(var("o", 1, 34), &["items"]))
                .as_alias("i", 1, 45)
                .scan(),
        ]);
        let mut select = MockSelectBuilder::value(var("o", 1, 14));
        if let Some(from) = from {
            select = select.from(from);
        }
        select
            .filter(binary(
                BinaryOp::Gt,
                path(var("i", 1, 53), &["qty"]),
                int(1),
            ))
            .statement()
    }

    /// ```sql
    /// SELECT VALUE @s FROM t AS s, @s AS s
    /// ```
    pub fn shadowed_alias() -> Statement {
        let from = join(
            JoinKind::Cross,
            MockFromItem::new(var("t", 1, 22)).as_alias("s", 1, 27).scan(),
            MockFromItem::new(locals_only_var("s", 1, 30))
                .as_alias("s", 1, 36)
                .scan(),
            None,
        );
        MockSelectBuilder::value(locals_only_var("s", 1, 14))
            .from(from)
            .statement()
    }

    /// ```sql
    /// SELECT VALUE y FROM a AS x AT i BY j
    /// ```
    pub fn unknown_in_scope() -> Statement {
        MockSelectBuilder::value(var("y", 1, 14))
            .from(
                MockFromItem::new(var("a", 1, 21))
                    .as_alias("x", 1, 26)
                    .at_alias("i", 1, 31)
                    .by_alias("j", 1, 36)
                    .scan(),
            )
            .statement()
    }

    /// ```sql
    /// UPDATE orders AS o SET o.status = 'shipped' WHERE o.id = 7
    /// ```
    pub fn update_orders() -> Statement {
        MockDmlBuilder::new()
            .source(
                var_syntax("orders", CaseSensitivity::Insensitive, 1, 8),
                Some(alias("o", 1, 18)),
            )
            .set(vec![(dml_path("o", 1, 24, &["status"]), string("shipped"))])
            .filter(eq(path(var("o", 1, 51), &["id"]), int(7)))
            .statement()
    }

    /// ```sql
    /// INSERT INTO "Foo" << {'a': 1} >>
    /// ```
    pub fn insert_into_quoted() -> Statement {
        let row = Expr::Struct {
            fields: vec![StructField {
                key: string("a"),
                value: int(1),
            }],
        };
        MockDmlBuilder::new()
            .insert(
                var_syntax("Foo", CaseSensitivity::Sensitive, 1, 13),
                Expr::Collection {
                    kind: CollectionKind::Bag,
                    values: vec![row],
                },
            )
            .statement()
    }
}
