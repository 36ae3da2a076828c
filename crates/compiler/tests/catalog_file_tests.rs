// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Compiling against catalogs loaded from files

use std::io::Write;

use tempfile::NamedTempFile;

use nested_sql_catalog::{CatalogError, StaticCatalog};
use nested_sql_compiler::{CompileError, Compiler};
use nested_sql_ir::plan::Statement;
use nested_sql_test_utils::{CatalogFixtures, PlanAssertions, StatementFixtures};

fn catalog_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("shop-catalog")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_yaml_and_json_catalogs_compile_alike() {
    let yaml = catalog_file(".yaml", CatalogFixtures::shop_yaml());
    let json = catalog_file(".json", CatalogFixtures::shop_json());

    let from_yaml = Compiler::new(StaticCatalog::from_path(yaml.path()).unwrap())
        .compile(&StatementFixtures::orders_with_items());
    let from_json = Compiler::new(StaticCatalog::from_path(json.path()).unwrap())
        .compile(&StatementFixtures::orders_with_items());

    assert!(from_yaml.is_executable());
    assert_eq!(from_yaml, from_json);

    let orders = from_yaml
        .resolved_plan
        .vars()
        .into_iter()
        .find(|binding| binding.name.text == "orders")
        .cloned()
        .unwrap();
    PlanAssertions::assert_global(&orders, "shop.orders");
}

#[test]
fn test_quoted_insert_against_file_catalog() {
    let yaml = catalog_file(".yml", CatalogFixtures::shop_yaml());
    let compiler = Compiler::new(StaticCatalog::from_path(yaml.path()).unwrap());

    let compilation = compiler
        .compile_strict(&StatementFixtures::insert_into_quoted())
        .unwrap();
    match compilation.physical_plan {
        Some(Statement::DmlCommands(commands)) => {
            assert_eq!(commands[0].action, "insert");
            assert_eq!(commands[0].target_unique_id, "shop.Foo");
        }
        other => panic!("Expected DML commands, found {:?}", other),
    }
}

#[test]
fn test_unsupported_catalog_extension() {
    let file = catalog_file(".toml", CatalogFixtures::shop_yaml());
    let err: CompileError = StaticCatalog::from_path(file.path()).unwrap_err().into();

    assert!(matches!(
        err,
        CompileError::Catalog(CatalogError::UnsupportedFormat(ref ext)) if ext == "toml"
    ));
}
