// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Syntax-tree builders for planner and resolver tests
//!
//! Provides a fluent API for building statements without a parser. Every
//! helper that creates a variable or alias takes the 1-based `(line, offset)`
//! it would have in the query text, so tests can assert problem locations.

use nested_sql_ir::ast::{
    Alias, Assignment, DmlOp, DmlPath, DmlSource, DmlStatement, Expr, FromItem, FromSource,
    GroupBy, GroupKey, LetBinding, OnConflict, OrderItem, PathStep, Projection, Select, SelectItem,
    Statement, VarSyntax,
};
use nested_sql_ir::{
    BinaryOp, CaseSensitivity, Identifier, JoinKind, Literal, ScopeQualifier, SourceLocation,
};

/// `name` (case-insensitive)
pub fn var(name: &str, line: u32, offset: u32) -> Expr {
    Expr::Var(var_syntax(name, CaseSensitivity::Insensitive, line, offset))
}

/// `"name"` (case-sensitive)
pub fn quoted_var(name: &str, line: u32, offset: u32) -> Expr {
    Expr::Var(var_syntax(name, CaseSensitivity::Sensitive, line, offset))
}

/// `@name`
pub fn locals_only_var(name: &str, line: u32, offset: u32) -> Expr {
    let mut var = var_syntax(name, CaseSensitivity::Insensitive, line, offset);
    var.qualifier = ScopeQualifier::LocalsOnly;
    Expr::Var(var)
}

pub fn var_syntax(name: &str, case: CaseSensitivity, line: u32, offset: u32) -> VarSyntax {
    VarSyntax {
        name: Identifier::new(name, case),
        qualifier: ScopeQualifier::Default,
        location: SourceLocation::new(line, offset),
    }
}

pub fn alias(name: &str, line: u32, offset: u32) -> Alias {
    Alias::new(Identifier::insensitive(name), SourceLocation::new(line, offset))
}

pub fn int(value: i64) -> Expr {
    Expr::Lit(Literal::Integer(value))
}

pub fn string(value: &str) -> Expr {
    Expr::Lit(Literal::string(value))
}

/// `root.f1.f2...`
pub fn path(root: Expr, fields: &[&str]) -> Expr {
    Expr::Path {
        root: Box::new(root),
        steps: fields
            .iter()
            .map(|field| PathStep::Field(Identifier::insensitive(*field)))
            .collect(),
    }
}

/// `name.f1.f2...` as a SET or REMOVE target
pub fn dml_path(name: &str, line: u32, offset: u32, fields: &[&str]) -> DmlPath {
    fields.iter().fold(
        DmlPath::var(var_syntax(name, CaseSensitivity::Insensitive, line, offset)),
        |path, field| path.field(Identifier::insensitive(*field)),
    )
}

/// `root.*`
pub fn unpivot_path(root: Expr) -> Expr {
    Expr::Path {
        root: Box::new(root),
        steps: vec![PathStep::Unpivot],
    }
}

pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Eq, lhs, rhs)
}

/// Fluent builder for FROM items
#[derive(Debug, Clone)]
pub struct MockFromItem {
    item: FromItem,
}

impl MockFromItem {
    pub fn new(expr: Expr) -> Self {
        Self {
            item: FromItem::new(expr),
        }
    }

    pub fn as_alias(mut self, name: &str, line: u32, offset: u32) -> Self {
        self.item.as_alias = Some(alias(name, line, offset));
        self
    }

    pub fn at_alias(mut self, name: &str, line: u32, offset: u32) -> Self {
        self.item.at_alias = Some(alias(name, line, offset));
        self
    }

    pub fn by_alias(mut self, name: &str, line: u32, offset: u32) -> Self {
        self.item.by_alias = Some(alias(name, line, offset));
        self
    }

    pub fn with_location(mut self, line: u32, offset: u32) -> Self {
        self.item.location = SourceLocation::new(line, offset);
        self
    }

    pub fn scan(self) -> FromSource {
        FromSource::Scan(self.item)
    }

    pub fn unpivot(self) -> FromSource {
        FromSource::Unpivot(self.item)
    }
}

/// `left, right`
pub fn cross_join(left: FromSource, right: FromSource) -> FromSource {
    join(JoinKind::Cross, left, right, None)
}

/// Comma-separated FROM items, left-deep
pub fn comma_join(items: Vec<FromSource>) -> Option<FromSource> {
    items.into_iter().reduce(cross_join)
}

pub fn join(kind: JoinKind, left: FromSource, right: FromSource, on: Option<Expr>) -> FromSource {
    FromSource::Join {
        kind,
        left: Box::new(left),
        right: Box::new(right),
        predicate: on,
    }
}

/// Fluent builder for SELECT blocks
#[derive(Debug, Clone)]
pub struct MockSelectBuilder {
    select: Select,
}

impl MockSelectBuilder {
    /// `SELECT VALUE expr`
    pub fn value(expr: Expr) -> Self {
        Self {
            select: Select::new(Projection::Value(expr)),
        }
    }

    /// `SELECT *`
    pub fn star() -> Self {
        Self {
            select: Select::new(Projection::Star),
        }
    }

    /// `SELECT e1 [AS a1], ...`
    pub fn items(items: Vec<(Expr, Option<Alias>)>) -> Self {
        Self {
            select: Select::new(Projection::List(
                items
                    .into_iter()
                    .map(|(expr, alias)| SelectItem::Expr { expr, alias })
                    .collect(),
            )),
        }
    }

    /// `SELECT expr.*`
    pub fn all_of(expr: Expr) -> Self {
        Self {
            select: Select::new(Projection::List(vec![SelectItem::All(expr)])),
        }
    }

    pub fn from(mut self, source: FromSource) -> Self {
        self.select.from = Some(source);
        self
    }

    pub fn let_binding(mut self, expr: Expr, alias: Alias) -> Self {
        self.select.let_bindings.push(LetBinding { expr, alias });
        self
    }

    pub fn filter(mut self, predicate: Expr) -> Self {
        self.select.where_clause = Some(predicate);
        self
    }

    pub fn group_by(mut self, keys: Vec<(Expr, Option<Alias>)>, group_as: Option<Alias>) -> Self {
        self.select.group_by = Some(GroupBy {
            keys: keys
                .into_iter()
                .map(|(expr, alias)| GroupKey {
                    location: expr.first_var_location(),
                    expr,
                    alias,
                })
                .collect(),
            group_as,
        });
        self
    }

    pub fn having(mut self, predicate: Expr) -> Self {
        self.select.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, expr: Expr) -> Self {
        self.select.order_by.push(OrderItem {
            expr,
            order: None,
            nulls: None,
        });
        self
    }

    pub fn limit(mut self, expr: Expr) -> Self {
        self.select.limit = Some(expr);
        self
    }

    pub fn offset(mut self, expr: Expr) -> Self {
        self.select.offset = Some(expr);
        self
    }

    /// The block as an expression (for subqueries)
    pub fn build(self) -> Expr {
        Expr::Select(Box::new(self.select))
    }

    /// The block as a top-level statement
    pub fn statement(self) -> Statement {
        Statement::Query(self.build())
    }
}

/// Fluent builder for DML batches
#[derive(Debug, Clone)]
pub struct MockDmlBuilder {
    dml: DmlStatement,
}

impl Default for MockDmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDmlBuilder {
    pub fn new() -> Self {
        Self {
            dml: DmlStatement {
                operations: Vec::new(),
                source: None,
                location: SourceLocation::new(1, 1),
            },
        }
    }

    /// `FROM target AS alias` / `UPDATE target AS alias`
    pub fn source(mut self, target: VarSyntax, as_alias: Option<Alias>) -> Self {
        self.dml.source = Some(DmlSource {
            target,
            as_alias,
            at_alias: None,
            by_alias: None,
            where_clause: None,
        });
        self
    }

    /// WHERE of the source; call after [`MockDmlBuilder::source`]
    pub fn filter(mut self, predicate: Expr) -> Self {
        let source = self.dml.source.as_mut().expect("WHERE needs a DML source");
        source.where_clause = Some(predicate);
        self
    }

    pub fn insert(mut self, target: VarSyntax, values: Expr) -> Self {
        self.dml.operations.push(DmlOp::Insert { target, values });
        self
    }

    pub fn insert_value(
        mut self,
        target: VarSyntax,
        value: Expr,
        on_conflict: Option<OnConflict>,
    ) -> Self {
        self.dml.operations.push(DmlOp::InsertValue {
            target,
            value,
            on_conflict,
        });
        self
    }

    pub fn set(mut self, assignments: Vec<(DmlPath, Expr)>) -> Self {
        self.dml.operations.push(DmlOp::Set(
            assignments
                .into_iter()
                .map(|(target, value)| Assignment { target, value })
                .collect(),
        ));
        self
    }

    pub fn remove(mut self, path: DmlPath) -> Self {
        self.dml.operations.push(DmlOp::Remove(path));
        self
    }

    /// `DELETE`: removes the source's row variable; call after [`MockDmlBuilder::source`]
    pub fn delete(mut self) -> Self {
        let row = self.dml.source.as_ref().expect("DELETE needs a DML source").row_var();
        self.dml.operations.push(DmlOp::Remove(DmlPath::var(row)));
        self
    }

    pub fn statement(self) -> Statement {
        Statement::Dml(self.dml)
    }
}
