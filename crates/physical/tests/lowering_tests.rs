// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for physical lowering of resolved plans

use nested_sql_ir::ast::{self, Statement as AstStatement};
use nested_sql_ir::plan::{BexprKind, DmlCommand, Expr, Projection, Statement};
use nested_sql_ir::{
    Binding, CaseSensitivity, CollectionKind, PhysicalPlan, ProblemCollector, ResolvedPlan,
};
use nested_sql_physical::{lower, PhysicalError};
use nested_sql_planner::LogicalPlanBuilder;
use nested_sql_semantic::resolve;
use nested_sql_test_utils::mock_ast::{alias, int, path, var, var_syntax};
use nested_sql_test_utils::{
    MockCatalogBuilder, MockDmlBuilder, MockFromItem, MockSelectBuilder, PlanAssertions,
    StatementFixtures,
};

fn resolved(statement: &AstStatement) -> ResolvedPlan {
    let catalog = MockCatalogBuilder::new().with_standard_schema().build();
    let mut problems = ProblemCollector::new();
    let plan = LogicalPlanBuilder::new(&mut problems).build(statement);
    resolve(plan, &catalog, &mut problems, false)
}

fn commands(plan: &PhysicalPlan) -> &[DmlCommand<Binding>] {
    match &plan.statement {
        Statement::DmlCommands(commands) => commands,
        other => panic!("Expected DML commands, found {:?}", other),
    }
}

#[test]
fn test_query_operators_all_tagged() {
    let physical = lower(resolved(&StatementFixtures::orders_with_items())).unwrap();
    PlanAssertions::assert_all_tagged(&physical);
    assert_eq!(physical.statement.bexprs().len(), 5);
}

#[test]
fn test_subquery_operators_tagged() {
    let subquery = MockSelectBuilder::value(var("y", 1, 21))
        .from(MockFromItem::new(var("t", 1, 28)).as_alias("y", 1, 33).scan())
        .build();
    let statement = MockSelectBuilder::value(subquery)
        .from(MockFromItem::new(var("orders", 1, 41)).as_alias("x", 1, 51).scan())
        .statement();

    let physical = lower(resolved(&statement)).unwrap();
    assert_eq!(physical.statement.bexprs().len(), 4);
    PlanAssertions::assert_all_tagged(&physical);
}

#[test]
fn test_update_becomes_command_with_tagged_rows() {
    let physical = lower(resolved(&StatementFixtures::update_orders())).unwrap();
    let commands = commands(&physical);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].action, "update");
    assert_eq!(commands[0].target_unique_id, "shop.orders");

    match &commands[0].rows {
        Expr::Query(bexpr) => {
            assert!(bexpr.impl_tag.is_some());
            assert!(matches!(
                bexpr.kind,
                BexprKind::Project {
                    projection: Projection::Value(_),
                    ..
                }
            ));
        }
        other => panic!("Expected row query, found {:?}", other),
    }
    PlanAssertions::assert_all_tagged(&physical);
}

#[test]
fn test_batch_keeps_operation_order() {
    // FROM t AS x WHERE x.done INSERT INTO archive << 1 >> REMOVE x
    let statement = MockDmlBuilder::new()
        .source(var_syntax("t", CaseSensitivity::Insensitive, 1, 40), Some(alias("x", 1, 45)))
        .filter(path(var("x", 1, 53), &["done"]))
        .insert(
            var_syntax("archive", CaseSensitivity::Insensitive, 1, 13),
            ast::Expr::Collection {
                kind: CollectionKind::Bag,
                values: vec![int(1)],
            },
        )
        .delete()
        .statement();

    let physical = lower(resolved(&statement)).unwrap();
    let summary: Vec<_> = commands(&physical)
        .iter()
        .map(|c| (c.action.as_str(), c.target_unique_id.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![("insert", "shop.archive"), ("delete", "shop.t")]
    );
}

#[test]
fn test_insert_value_rows_scan_the_source() {
    // FROM orders AS o WHERE o.open INSERT INTO archive VALUE o
    let statement = MockDmlBuilder::new()
        .source(
            var_syntax("orders", CaseSensitivity::Insensitive, 1, 6),
            Some(alias("o", 1, 16)),
        )
        .filter(path(var("o", 1, 24), &["open"]))
        .insert_value(
            var_syntax("archive", CaseSensitivity::Insensitive, 1, 43),
            var("o", 1, 57),
            None,
        )
        .statement();

    let physical = lower(resolved(&statement)).unwrap();
    let commands = commands(&physical);
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].action, "insert");
    assert_eq!(commands[0].target_unique_id, "shop.archive");
    assert!(matches!(commands[0].rows, Expr::Query(_)));

    let operators: Vec<_> = physical
        .statement
        .bexprs()
        .iter()
        .map(|bexpr| bexpr.operator_name())
        .collect();
    assert_eq!(operators, vec!["project", "filter", "scan"]);
    PlanAssertions::assert_all_tagged(&physical);

    let vars = physical.statement.vars();
    let orders: Vec<_> = vars.iter().filter(|b| b.name.text == "orders").collect();
    assert_eq!(orders.len(), 1);
    PlanAssertions::assert_global(orders[0], "shop.orders");
    for binding in vars.iter().filter(|b| b.name.text == "o") {
        PlanAssertions::assert_local(binding, 0);
    }
}

#[test]
fn test_unresolved_target_stops_lowering() {
    let statement = MockDmlBuilder::new()
        .insert(
            var_syntax("nowhere", CaseSensitivity::Insensitive, 3, 13),
            int(1),
        )
        .statement();

    let err = lower(resolved(&statement)).unwrap_err();
    assert_eq!(
        err,
        PhysicalError::UnresolvedTarget {
            name: "nowhere".to_string(),
            line: 3,
            offset: 13,
        }
    );
}

#[test]
fn test_lowering_twice_is_a_no_op() {
    for statement in [
        StatementFixtures::orders_with_items(),
        StatementFixtures::update_orders(),
        StatementFixtures::insert_into_quoted(),
    ] {
        let once = lower(resolved(&statement)).unwrap();
        let twice = lower(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_command_serializes_with_record_field_names() {
    let physical = lower(resolved(&StatementFixtures::insert_into_quoted())).unwrap();
    let json = serde_json::to_value(&commands(&physical)[0]).unwrap();
    let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["action", "rows", "target_unique_id"]);
    assert_eq!(json["target_unique_id"], "shop.Foo");
}
