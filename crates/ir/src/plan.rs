// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Plan Trees
//!
//! One plan shape serves all three passes. The type parameter `V` is the
//! payload of a variable reference:
//!
//! | pass      | statement type          | `V`         | relational `impl_tag` |
//! |-----------|-------------------------|-------------|-----------------------|
//! | logical   | [`LogicalStatement`]    | [`VarRef`]  | `None`                |
//! | resolved  | [`ResolvedStatement`]   | [`Binding`] | `None`                |
//! | physical  | [`PhysicalStatement`]   | [`Binding`] | `Some(..)`            |
//!
//! ## Scalar and relational nodes
//!
//! [`Expr`] produces a value; [`Bexpr`] produces a stream of variable
//! bindings. A SELECT block becomes a chain of relational operators capped by a
//! [`BexprKind::Project`] and wrapped in [`Expr::Query`]:
//!
//! ```text
//! SELECT x.a FROM t AS x WHERE x.b > 1
//!
//! Query
//! └── Project { a: x.a }
//!     └── Filter { x.b > 1 }
//!         └── Scan { t AS x }
//! ```
//!
//! ## Data mutation
//!
//! The logical and resolved plans keep mutations as [`DmlOperation`]s with a
//! target reference. Physical lowering replaces them with [`DmlCommand`]
//! records that only hold plain data: an action name, the catalog id of the
//! target and the row-producing expression.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::binding::{Binding, LocalDecl, VarDecl, VarRef};
use crate::ident::CaseSensitivity;
use crate::operators::{
    BinaryOp, CollectionKind, JoinKind, Literal, NullsOrder, SetOpKind, SetQuantifier,
    SortOrder, UnaryOp,
};
use crate::scope::ScopeTree;

/// Logical statement: references are still unresolved
pub type LogicalStatement = Statement<VarRef>;
/// Statement after binding resolution
pub type ResolvedStatement = Statement<Binding>;
/// Statement after physical lowering
pub type PhysicalStatement = Statement<Binding>;

/// Output of the logical plan builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalPlan {
    pub statement: LogicalStatement,
    /// Every local declared in the statement, ordered by index
    pub locals: Vec<LocalDecl>,
    /// Frame history recorded while declaring locals
    pub scopes: ScopeTree,
}

/// Output of the binding resolver and of physical lowering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlan {
    pub statement: ResolvedStatement,
    pub locals: Vec<LocalDecl>,
}

/// A physical plan has the resolved shape with every relational node tagged
pub type PhysicalPlan = ResolvedPlan;

/// A statement in plan form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement<V> {
    /// Query returning a value
    Query(Expr<V>),
    /// Data-mutation batch in logical form
    Dml(Vec<DmlOperation<V>>),
    /// Data-mutation batch lowered to plain records
    DmlCommands(Vec<DmlCommand<V>>),
    /// Stored procedure call
    Exec { procedure: String, args: Vec<Expr<V>> },
}

/// Scalar (value-producing) node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr<V> {
    /// Literal value
    Lit(Literal),

    /// Variable reference
    Var(V),

    /// Path navigation
    Path {
        root: Box<Expr<V>>,
        steps: Vec<PathStep<V>>,
    },

    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr<V>> },

    /// Binary operation
    Binary {
        op: BinaryOp,
        lhs: Box<Expr<V>>,
        rhs: Box<Expr<V>>,
    },

    /// Function call
    Call { name: String, args: Vec<Expr<V>> },

    /// Aggregate call
    CallAgg {
        name: String,
        quantifier: SetQuantifier,
        arg: Box<Expr<V>>,
    },

    /// CASE expression
    Case {
        operand: Option<Box<Expr<V>>>,
        branches: Vec<CaseBranch<V>>,
        default: Option<Box<Expr<V>>>,
    },

    /// List, bag or s-expression constructor
    Collection {
        kind: CollectionKind,
        values: Vec<Expr<V>>,
    },

    /// Struct constructor
    Struct { fields: Vec<StructField<V>> },

    /// CAST expression
    Cast { value: Box<Expr<V>>, as_type: String },

    /// Relational subtree in value position
    Query(Box<Bexpr<V>>),
}

impl<V> Expr<V> {
    /// `<<>>`, the zero-row constant
    pub fn empty_bag() -> Self {
        Expr::Collection {
            kind: CollectionKind::Bag,
            values: Vec::new(),
        }
    }

    /// `<<value>>`, the single-row constant
    pub fn singleton_bag(value: Expr<V>) -> Self {
        Expr::Collection {
            kind: CollectionKind::Bag,
            values: vec![value],
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Lit(Literal::String(value.into()))
    }
}

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStep<V> {
    /// `.name` (case-insensitive key) or `[expr]` (case-sensitive key or index)
    Key {
        key: Box<Expr<V>>,
        case: CaseSensitivity,
    },
    /// `[*]`
    Wildcard,
    /// `.*`
    Unpivot,
}

/// `WHEN condition THEN result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBranch<V> {
    pub condition: Expr<V>,
    pub result: Expr<V>,
}

/// `key: value` inside a struct constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField<V> {
    pub key: Expr<V>,
    pub value: Expr<V>,
}

/// Execution strategy of a relational operator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplTag(pub String);

impl ImplTag {
    pub const DEFAULT_NAME: &'static str = "default";

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT_NAME
    }
}

impl Default for ImplTag {
    fn default() -> Self {
        ImplTag(Self::DEFAULT_NAME.to_string())
    }
}

impl fmt::Display for ImplTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relational (binding-stream) node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bexpr<V> {
    pub kind: BexprKind<V>,
    /// Execution strategy; `None` until physical lowering
    pub impl_tag: Option<ImplTag>,
}

impl<V> Bexpr<V> {
    pub fn new(kind: BexprKind<V>) -> Self {
        Self {
            kind,
            impl_tag: None,
        }
    }

    /// Operator name, used in logs and plan dumps
    pub fn operator_name(&self) -> &'static str {
        match &self.kind {
            BexprKind::Unit => "unit",
            BexprKind::Scan { .. } => "scan",
            BexprKind::Unpivot { .. } => "unpivot",
            BexprKind::Filter { .. } => "filter",
            BexprKind::Join { .. } => "join",
            BexprKind::Let { .. } => "let",
            BexprKind::Aggregate { .. } => "aggregate",
            BexprKind::Sort { .. } => "sort",
            BexprKind::Offset { .. } => "offset",
            BexprKind::Limit { .. } => "limit",
            BexprKind::Project { .. } => "project",
            BexprKind::SetOp { .. } => "set_op",
        }
    }
}

/// Relational operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BexprKind<V> {
    /// A single empty binding tuple (SELECT without FROM)
    Unit,

    /// Iterate the elements of a collection
    Scan {
        expr: Box<Expr<V>>,
        as_decl: VarDecl,
        at_decl: Option<VarDecl>,
        by_decl: Option<VarDecl>,
    },

    /// Iterate the attribute/value pairs of a struct
    Unpivot {
        expr: Box<Expr<V>>,
        as_decl: VarDecl,
        at_decl: Option<VarDecl>,
        by_decl: Option<VarDecl>,
    },

    /// WHERE / HAVING
    Filter {
        predicate: Box<Expr<V>>,
        source: Box<Bexpr<V>>,
    },

    /// Join of two binding streams; the right side may reference the left
    Join {
        kind: JoinKind,
        left: Box<Bexpr<V>>,
        right: Box<Bexpr<V>>,
        predicate: Option<Box<Expr<V>>>,
    },

    /// LET bindings
    Let {
        source: Box<Bexpr<V>>,
        bindings: Vec<LetBinding<V>>,
    },

    /// GROUP BY
    Aggregate {
        source: Box<Bexpr<V>>,
        keys: Vec<GroupKey<V>>,
        group_as: Option<VarDecl>,
    },

    /// ORDER BY
    Sort {
        source: Box<Bexpr<V>>,
        specs: Vec<SortSpec<V>>,
    },

    /// OFFSET
    Offset {
        source: Box<Bexpr<V>>,
        row_count: Box<Expr<V>>,
    },

    /// LIMIT
    Limit {
        source: Box<Bexpr<V>>,
        row_count: Box<Expr<V>>,
    },

    /// Turn bindings into values
    Project {
        source: Box<Bexpr<V>>,
        projection: Projection<V>,
        quantifier: SetQuantifier,
    },

    /// UNION / INTERSECT / EXCEPT of two collections
    SetOp {
        op: SetOpKind,
        quantifier: SetQuantifier,
        left: Box<Expr<V>>,
        right: Box<Expr<V>>,
    },
}

/// `expr AS decl` inside LET
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetBinding<V> {
    pub value: Expr<V>,
    pub decl: VarDecl,
}

/// `expr AS decl` inside GROUP BY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupKey<V> {
    pub expr: Expr<V>,
    pub decl: VarDecl,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec<V> {
    pub expr: Expr<V>,
    pub order: Option<SortOrder>,
    pub nulls: Option<NullsOrder>,
}

/// Value construction at the top of a SELECT block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection<V> {
    /// `SELECT VALUE expr`
    Value(Box<Expr<V>>),
    /// `SELECT a AS x, y.*`
    Struct(Vec<ProjectItem<V>>),
    /// `PIVOT value AT key`
    Pivot {
        value: Box<Expr<V>>,
        key: Box<Expr<V>>,
    },
}

/// Item of a struct projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectItem<V> {
    /// `expr AS alias`
    Expr { expr: Expr<V>, alias: String },
    /// `expr.*`
    All(Expr<V>),
}

/// Kind of mutation a DML operation performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DmlAction {
    Insert,
    Delete,
    Replace,
    Update,
}

impl DmlAction {
    /// Action name used in [`DmlCommand::action`]
    pub fn as_str(&self) -> &'static str {
        match self {
            DmlAction::Insert => "insert",
            DmlAction::Delete => "delete",
            DmlAction::Replace => "replace",
            DmlAction::Update => "update",
        }
    }
}

impl fmt::Display for DmlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data-mutation operation before physical lowering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlOperation<V> {
    pub action: DmlAction,
    /// Reference to the mutated collection
    pub target: V,
    /// Rows to insert, delete, or the new images of updated rows
    pub rows: Expr<V>,
}

/// Canonical data-mutation record consumed by execution engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmlCommand<V> {
    pub action: String,
    pub target_unique_id: String,
    pub rows: Expr<V>,
}

impl<V: Clone> DmlCommand<V> {
    pub const ACTION_FIELD: &'static str = "action";
    pub const TARGET_UNIQUE_ID_FIELD: &'static str = "target_unique_id";
    pub const ROWS_FIELD: &'static str = "rows";

    /// The record as a struct constructor expression
    pub fn to_struct(&self) -> Expr<V> {
        Expr::Struct {
            fields: vec![
                StructField {
                    key: Expr::string(Self::ACTION_FIELD),
                    value: Expr::string(self.action.clone()),
                },
                StructField {
                    key: Expr::string(Self::TARGET_UNIQUE_ID_FIELD),
                    value: Expr::string(self.target_unique_id.clone()),
                },
                StructField {
                    key: Expr::string(Self::ROWS_FIELD),
                    value: self.rows.clone(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impl_tag_default() {
        let tag = ImplTag::default();
        assert!(tag.is_default());
        assert_eq!(tag.to_string(), "default");
    }

    #[test]
    fn test_dml_action_names() {
        assert_eq!(DmlAction::Insert.as_str(), "insert");
        assert_eq!(DmlAction::Delete.as_str(), "delete");
        assert_eq!(DmlAction::Replace.as_str(), "replace");
        assert_eq!(DmlAction::Update.as_str(), "update");
    }

    #[test]
    fn test_dml_command_field_names() {
        let command: DmlCommand<Binding> = DmlCommand {
            action: "insert".to_string(),
            target_unique_id: "db.t".to_string(),
            rows: Expr::empty_bag(),
        };
        let json = serde_json::to_value(&command).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["action", "rows", "target_unique_id"]);
    }

    #[test]
    fn test_dml_command_to_struct() {
        let command: DmlCommand<Binding> = DmlCommand {
            action: "delete".to_string(),
            target_unique_id: "db.t".to_string(),
            rows: Expr::empty_bag(),
        };
        match command.to_struct() {
            Expr::Struct { fields } => {
                assert_eq!(fields.len(), 3);
                assert_eq!(fields[0].key, Expr::string("action"));
                assert_eq!(fields[0].value, Expr::string("delete"));
                assert_eq!(fields[1].value, Expr::string("db.t"));
                assert_eq!(fields[2].value, Expr::empty_bag());
            }
            other => panic!("Expected struct, found {:?}", other),
        }
    }

    #[test]
    fn test_operator_name() {
        let scan: Bexpr<Binding> = Bexpr::new(BexprKind::Scan {
            expr: Box::new(Expr::empty_bag()),
            as_decl: VarDecl {
                name: crate::Identifier::insensitive("x"),
                index: 0,
                location: Default::default(),
            },
            at_decl: None,
            by_decl: None,
        });
        assert_eq!(scan.operator_name(), "scan");
        assert!(scan.impl_tag.is_none());
    }
}
