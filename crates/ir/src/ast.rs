// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax Tree
//!
//! The input of the compiler. An external parser produces a [`Statement`];
//! this crate never looks at query text.
//!
//! ## Statements
//!
//! - [`Statement::Query`]: any expression, usually a SELECT
//! - [`Statement::Dml`]: a batch of data-mutation operations
//! - [`Statement::Exec`]: a stored procedure call
//!
//! ## SELECT
//!
//! [`Select`] models the SELECT-FROM-WHERE block of the language, including
//! the nested-data extensions:
//!
//! ```sql
//! -- AS / AT / BY aliases: value, position and address of each element
//! SELECT o.id, i AS position
//! FROM orders AS o, o.items AS item AT i
//!
//! -- UNPIVOT a struct into (value, attribute name) pairs
//! SELECT v, k FROM UNPIVOT t.attrs AS v AT k
//!
//! -- SELECT VALUE and PIVOT projections
//! SELECT VALUE x.name FROM t AS x
//! PIVOT x.price AT x.sku FROM t AS x
//!
//! -- LET bindings
//! SELECT y FROM t AS x LET x.a + 1 AS y
//! ```
//!
//! ## Variables
//!
//! A [`VarSyntax`] is a bare name together with its [`ScopeQualifier`]:
//! `x` is [`ScopeQualifier::Default`], `@x` is [`ScopeQualifier::LocalsOnly`].
//!
//! ## Data mutation
//!
//! ```sql
//! INSERT INTO t << {'a': 1} >>
//! INSERT INTO t VALUE {'a': 1} ON CONFLICT DO REPLACE EXCLUDED
//! DELETE FROM t AS x WHERE x.a = 1
//! UPDATE t AS x SET x.a = 2, x.b = 3 REMOVE x.c WHERE x.id = 7
//! ```

use serde::{Deserialize, Serialize};

use crate::ident::{Identifier, ScopeQualifier};
use crate::location::SourceLocation;
use crate::operators::{
    BinaryOp, CollectionKind, JoinKind, Literal, NullsOrder, SetOpKind, SetQuantifier,
    SortOrder, UnaryOp,
};

/// A top-level statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Query(Expr),
    Dml(DmlStatement),
    Exec(ExecStatement),
}

/// Expression syntax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Literal value
    Lit(Literal),

    /// Variable reference (`x`, `"X"`, `@x`)
    Var(VarSyntax),

    /// Path navigation (`x.a[0].*`)
    Path {
        root: Box<Expr>,
        steps: Vec<PathStep>,
    },

    /// Unary operation (e.g., `-x`, `NOT a`)
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation (e.g., `a + b`, `x = 5`)
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Function call (e.g., `upper(x)`)
    Call { name: String, args: Vec<Expr> },

    /// Aggregate call (e.g., `COUNT(DISTINCT x)`)
    CallAgg {
        name: String,
        quantifier: SetQuantifier,
        arg: Box<Expr>,
    },

    /// CASE expression; `operand` is present for the simple form
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<CaseBranch>,
        default: Option<Box<Expr>>,
    },

    /// List, bag or s-expression constructor
    Collection {
        kind: CollectionKind,
        values: Vec<Expr>,
    },

    /// Struct constructor (`{'a': 1, k: v}`)
    Struct { fields: Vec<StructField> },

    /// CAST expression
    Cast { value: Box<Expr>, as_type: String },

    /// SELECT-FROM-WHERE block
    Select(Box<Select>),

    /// UNION / INTERSECT / EXCEPT
    BagOp {
        op: SetOpKind,
        quantifier: SetQuantifier,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn var(name: Identifier, location: SourceLocation) -> Self {
        Expr::Var(VarSyntax {
            name,
            qualifier: ScopeQualifier::Default,
            location,
        })
    }

    pub fn lit(value: Literal) -> Self {
        Expr::Lit(value)
    }

    /// Location of the leftmost variable written in this expression
    ///
    /// Nested query blocks are not searched.
    pub fn first_var_location(&self) -> Option<SourceLocation> {
        match self {
            Expr::Var(var) => Some(var.location),
            Expr::Path { root, steps } => root.first_var_location().or_else(|| {
                steps.iter().find_map(|step| match step {
                    PathStep::Index(index) => index.first_var_location(),
                    _ => None,
                })
            }),
            Expr::Unary { operand, .. } => operand.first_var_location(),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.first_var_location().or_else(|| rhs.first_var_location())
            }
            Expr::Call { args, .. } => args.iter().find_map(Expr::first_var_location),
            Expr::CallAgg { arg, .. } => arg.first_var_location(),
            Expr::Cast { value, .. } => value.first_var_location(),
            Expr::Collection { values, .. } => values.iter().find_map(Expr::first_var_location),
            Expr::Case { operand, branches, default } => operand
                .as_deref()
                .and_then(Expr::first_var_location)
                .or_else(|| {
                    branches.iter().find_map(|branch| {
                        branch
                            .condition
                            .first_var_location()
                            .or_else(|| branch.result.first_var_location())
                    })
                })
                .or_else(|| default.as_deref().and_then(Expr::first_var_location)),
            Expr::Struct { fields } => fields.iter().find_map(|field| {
                field
                    .key
                    .first_var_location()
                    .or_else(|| field.value.first_var_location())
            }),
            Expr::Lit(_) | Expr::Select(_) | Expr::BagOp { .. } => None,
        }
    }
}

/// A variable as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarSyntax {
    pub name: Identifier,
    #[serde(default)]
    pub qualifier: ScopeQualifier,
    #[serde(default)]
    pub location: SourceLocation,
}

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep {
    /// `.name` or `."Name"`
    Field(Identifier),
    /// `[expr]`
    Index(Expr),
    /// `[*]`
    Wildcard,
    /// `.*`
    Unpivot,
}

/// `WHEN condition THEN result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBranch {
    pub condition: Expr,
    pub result: Expr,
}

/// `key: value` inside a struct constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub key: Expr,
    pub value: Expr,
}

/// A declared alias (`AS x`, `AT i`, `BY addr`, `GROUP AS g`, LET aliases)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alias {
    pub name: Identifier,
    #[serde(default)]
    pub location: SourceLocation,
}

impl Alias {
    pub fn new(name: Identifier, location: SourceLocation) -> Self {
        Self { name, location }
    }
}

/// SELECT-FROM-WHERE block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    /// SELECT DISTINCT or ALL
    #[serde(default)]
    pub quantifier: SetQuantifier,

    /// Projection (SELECT list, SELECT VALUE, PIVOT)
    pub projection: Projection,

    /// FROM clause
    pub from: Option<FromSource>,

    /// LET clause
    #[serde(default)]
    pub let_bindings: Vec<LetBinding>,

    /// WHERE clause
    #[serde(default)]
    pub where_clause: Option<Expr>,

    /// GROUP BY clause
    #[serde(default)]
    pub group_by: Option<GroupBy>,

    /// HAVING clause
    #[serde(default)]
    pub having: Option<Expr>,

    /// ORDER BY clause
    #[serde(default)]
    pub order_by: Vec<OrderItem>,

    /// LIMIT clause
    #[serde(default)]
    pub limit: Option<Expr>,

    /// OFFSET clause
    #[serde(default)]
    pub offset: Option<Expr>,
}

impl Select {
    pub fn new(projection: Projection) -> Self {
        Self {
            quantifier: SetQuantifier::All,
            projection,
            from: None,
            let_bindings: Vec::new(),
            where_clause: None,
            group_by: None,
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// Projection of a SELECT block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// `SELECT *`
    Star,
    /// `SELECT a, b AS c, x.*`
    List(Vec<SelectItem>),
    /// `SELECT VALUE expr`
    Value(Expr),
    /// `PIVOT value AT key`
    Pivot { value: Expr, key: Expr },
}

/// Item in a SELECT list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectItem {
    /// `expr [AS alias]`
    Expr { expr: Expr, alias: Option<Alias> },
    /// `expr.*`
    All(Expr),
}

/// FROM clause source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FromSource {
    /// `expr [AS x] [AT i] [BY addr]`
    Scan(FromItem),
    /// `UNPIVOT expr [AS v] [AT k] [BY addr]`
    Unpivot(FromItem),
    /// Explicit JOIN or comma-separated items (`JoinKind::Cross`)
    Join {
        kind: JoinKind,
        left: Box<FromSource>,
        right: Box<FromSource>,
        predicate: Option<Expr>,
    },
}

/// A single FROM item with its aliases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FromItem {
    pub expr: Expr,
    #[serde(default)]
    pub as_alias: Option<Alias>,
    #[serde(default)]
    pub at_alias: Option<Alias>,
    #[serde(default)]
    pub by_alias: Option<Alias>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl FromItem {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            as_alias: None,
            at_alias: None,
            by_alias: None,
            location: SourceLocation::default(),
        }
    }
}

/// `LET expr AS alias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetBinding {
    pub expr: Expr,
    pub alias: Alias,
}

/// GROUP BY clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    pub keys: Vec<GroupKey>,
    #[serde(default)]
    pub group_as: Option<Alias>,
}

/// `expr [AS alias]` inside GROUP BY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupKey {
    pub expr: Expr,
    #[serde(default)]
    pub alias: Option<Alias>,
    /// Where the key starts; unaliased keys declare their synthesized name here
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl GroupKey {
    /// Location of the key, falling back to its leftmost variable
    pub fn location(&self) -> SourceLocation {
        self.location
            .or_else(|| self.expr.first_var_location())
            .unwrap_or_default()
    }
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expr: Expr,
    #[serde(default)]
    pub order: Option<SortOrder>,
    #[serde(default)]
    pub nulls: Option<NullsOrder>,
}

/// A batch of data-mutation operations sharing an optional source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlStatement {
    pub operations: Vec<DmlOp>,
    /// `FROM t AS x [WHERE c]` / `UPDATE t AS x` / `DELETE FROM t AS x`
    #[serde(default)]
    pub source: Option<DmlSource>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// The single collection a DML statement reads its affected rows from
///
/// `DELETE FROM t AS x WHERE c` is the source `t AS x WHERE c` with a
/// `REMOVE x` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlSource {
    pub target: VarSyntax,
    #[serde(default)]
    pub as_alias: Option<Alias>,
    #[serde(default)]
    pub at_alias: Option<Alias>,
    #[serde(default)]
    pub by_alias: Option<Alias>,
    #[serde(default)]
    pub where_clause: Option<Expr>,
}

impl DmlSource {
    /// The name each source row is bound to: the AS alias, or the target itself
    pub fn row_var(&self) -> VarSyntax {
        match &self.as_alias {
            Some(alias) => VarSyntax {
                name: alias.name.clone(),
                qualifier: ScopeQualifier::Default,
                location: alias.location,
            },
            None => self.target.clone(),
        }
    }
}

/// A single data-mutation operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DmlOp {
    /// `INSERT INTO target <values>`
    Insert { target: VarSyntax, values: Expr },
    /// `INSERT INTO target VALUE value [ON CONFLICT ...]`
    InsertValue {
        target: VarSyntax,
        value: Expr,
        #[serde(default)]
        on_conflict: Option<OnConflict>,
    },
    /// `SET path = value, ...`
    Set(Vec<Assignment>),
    /// `REMOVE path`; removing the source's row variable deletes the row
    Remove(DmlPath),
}

/// `path = value` inside SET
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub target: DmlPath,
    pub value: Expr,
}

/// An assignable path: a variable followed by field and index steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlPath {
    pub root: VarSyntax,
    #[serde(default)]
    pub steps: Vec<DmlPathStep>,
}

impl DmlPath {
    pub fn var(root: VarSyntax) -> Self {
        Self {
            root,
            steps: Vec::new(),
        }
    }

    pub fn field(mut self, name: Identifier) -> Self {
        self.steps.push(DmlPathStep::Field(name));
        self
    }

    pub fn index(mut self, index: Expr) -> Self {
        self.steps.push(DmlPathStep::Index(index));
        self
    }
}

/// One step of a [`DmlPath`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DmlPathStep {
    /// `.name` or `."Name"`
    Field(Identifier),
    /// `[expr]`
    Index(Expr),
}

/// ON CONFLICT action of `INSERT ... VALUE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnConflict {
    DoReplaceExcluded,
    DoUpdateExcluded,
    DoNothing,
}

/// `EXEC procedure arg, ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecStatement {
    pub procedure: String,
    #[serde(default)]
    pub args: Vec<Expr>,
}
