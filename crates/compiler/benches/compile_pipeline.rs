// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use nested_sql_catalog::StaticCatalog;
use nested_sql_compiler::{Compiler, CompilerConfig};
use nested_sql_ir::ast::Statement;
use nested_sql_test_utils::mock_ast::{comma_join, eq, int, path, var};
use nested_sql_test_utils::{CatalogFixtures, MockFromItem, MockSelectBuilder, StatementFixtures};

fn shop_catalog() -> StaticCatalog {
    StaticCatalog::from_yaml_str(CatalogFixtures::shop_yaml()).expect("shop catalog fixture")
}

fn workloads() -> Vec<(&'static str, Statement)> {
    vec![
        ("star_over_literal", StatementFixtures::star_over_literal()),
        ("orders_with_items", StatementFixtures::orders_with_items()),
        ("shadowed_alias", StatementFixtures::shadowed_alias()),
        ("update_orders", StatementFixtures::update_orders()),
        ("insert_into_quoted", StatementFixtures::insert_into_quoted()),
    ]
}

/// `SELECT VALUE a0 FROM orders AS a0, a0.items AS a1, ... WHERE a<n-1>.id = 1`
fn wide_from(items: usize) -> Statement {
    let sources = (0..items)
        .map(|i| {
            let source = if i == 0 {
                var("orders", 1, 20)
            } else {
                path(var(&format!("a{}", i - 1), 1, 20), &["items"])
            };
            MockFromItem::new(source)
                .as_alias(&format!("a{i}"), 1, 30)
                .scan()
        })
        .collect();

    let mut select = MockSelectBuilder::value(var("a0", 1, 14));
    if let Some(from) = comma_join(sources) {
        select = select.from(from);
    }
    select
        .filter(eq(path(var(&format!("a{}", items - 1), 2, 7), &["id"]), int(1)))
        .statement()
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let compiler = Compiler::new(shop_catalog());

    for (name, statement) in workloads() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &statement, |b, statement| {
            b.iter(|| compiler.compile(black_box(statement)))
        });
    }

    group.finish();
}

fn benchmark_wide_from(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_from");
    let config = CompilerConfig::new().allow_undefined_variables(true);
    let compiler = Compiler::with_config(shop_catalog(), config).expect("valid config");

    for items in [4, 16, 64] {
        let statement = wide_from(items);
        group.bench_with_input(BenchmarkId::from_parameter(items), &statement, |b, statement| {
            b.iter(|| compiler.compile(black_box(statement)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_compile, benchmark_wide_from);
criterion_main!(benches);
