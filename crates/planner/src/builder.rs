// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Logical plan builder
//!
//! Turns a syntax tree into a [`LogicalPlan`]: SELECT blocks become chains of
//! relational operators, variables become unresolved [`VarRef`]s and every
//! alias becomes a numbered local.
//!
//! ## Clause order
//!
//! A SELECT block is built inside out, in the order its clauses take effect:
//!
//! ```text
//! FROM → LET → WHERE → GROUP BY → HAVING → ORDER BY → OFFSET → LIMIT → SELECT
//! ```
//!
//! Locals are declared in the same order, so a subquery in the SELECT list
//! numbers its locals after every FROM, LET and GROUP BY local of its parent.
//!
//! ## Frames
//!
//! | construct        | frame                     | declares          |
//! |------------------|---------------------------|-------------------|
//! | SELECT block     | [`FrameKind::Query`]      | nothing           |
//! | FROM item        | [`FrameKind::FromItem`]   | AS, AT, BY        |
//! | LET binding      | [`FrameKind::Let`]        | its alias         |
//! | GROUP BY         | [`FrameKind::GroupBy`]    | key aliases, GROUP AS |
//! | DML source       | [`FrameKind::DmlSource`]  | AS, AT, BY        |
//!
//! Each frame nests inside the previous one and stays open until the
//! enclosing SELECT block ends. The source expression of a FROM item is
//! lowered before its own frame opens, so it sees the items to its left:
//!
//! ```sql
//! SELECT i FROM orders AS o, o.items AS i   -- o.items sees o
//! ```
//!
//! ## Data mutation
//!
//! A DML batch becomes a list of [`DmlOperation`]s. Row-consuming operations
//! read their rows as `SELECT VALUE alias FROM <source> WHERE <cond>`, and
//! inserts under a source produce one row per source row. Consecutive SET/REMOVE operations fold into one `update` whose new row
//! images chain `set_path` / `remove_path` calls:
//!
//! ```sql
//! UPDATE t AS x SET x.a = 1 REMOVE x.b WHERE x.id = 7
//! -- update t: SELECT VALUE remove_path(set_path(x, ['a'], 1), ['b'])
//! --           FROM t AS x WHERE x.id = 7
//! ```

use tracing::{debug, instrument};

use nested_sql_ir::ast::{
    self, DmlOp, DmlPath, DmlPathStep, DmlSource, DmlStatement, FromItem, FromSource, OnConflict,
    Select, SelectItem, VarSyntax,
};
use nested_sql_ir::plan::{
    Bexpr, BexprKind, CaseBranch, DmlAction, DmlOperation, Expr, GroupKey, LetBinding, PathStep,
    ProjectItem, Projection, SortSpec, Statement, StructField,
};
use nested_sql_ir::{
    CaseSensitivity, CollectionKind, FrameKind, Identifier, JoinKind, LogicalPlan, Problem,
    ProblemCollector, ProblemDetails, RefPosition, ScopeId, ScopeQualifier, SetQuantifier,
    SourceLocation, VarDecl, VarRef,
};

use crate::alias;
use crate::scope::ScopeTracker;

const SET_PATH: &str = "set_path";
const REMOVE_PATH: &str = "remove_path";

/// Builds the logical plan of one statement
///
/// Duplicate declarations are reported to the [`ProblemCollector`] as
/// `VariablePreviouslyDefined`; building never fails.
pub struct LogicalPlanBuilder<'p> {
    scopes: ScopeTracker,
    problems: &'p mut ProblemCollector,
}

/// AS local of a FROM item and the frame it was declared in
struct SourceAlias {
    decl: VarDecl,
    scope: ScopeId,
}

/// A FROM item after lowering
struct LoweredItem {
    expr: Expr<VarRef>,
    as_decl: VarDecl,
    at_decl: Option<VarDecl>,
    by_decl: Option<VarDecl>,
}

/// The collection a DML batch reads its affected rows from
struct DmlRelation {
    target: VarSyntax,
    alias: VarDecl,
    scope: ScopeId,
    plan: Bexpr<VarRef>,
}

/// One SET or REMOVE of a path inside a row
struct RowEdit {
    root: VarSyntax,
    keys: Vec<Expr<VarRef>>,
    /// `None` removes the path
    value: Option<Expr<VarRef>>,
}

impl RowEdit {
    fn apply(self, row: Expr<VarRef>) -> Expr<VarRef> {
        let keys = Expr::Collection {
            kind: CollectionKind::List,
            values: self.keys,
        };
        match self.value {
            Some(value) => Expr::Call {
                name: SET_PATH.to_string(),
                args: vec![row, keys, value],
            },
            None => Expr::Call {
                name: REMOVE_PATH.to_string(),
                args: vec![row, keys],
            },
        }
    }
}

impl<'p> LogicalPlanBuilder<'p> {
    pub fn new(problems: &'p mut ProblemCollector) -> Self {
        Self {
            scopes: ScopeTracker::new(),
            problems,
        }
    }

    /// Build the logical plan of `statement`
    #[instrument(skip_all)]
    pub fn build(mut self, statement: &ast::Statement) -> LogicalPlan {
        let statement = match statement {
            ast::Statement::Query(expr) => Statement::Query(self.lower_expr(expr)),
            ast::Statement::Dml(dml) => Statement::Dml(self.lower_dml(dml)),
            ast::Statement::Exec(exec) => Statement::Exec {
                procedure: exec.procedure.clone(),
                args: exec.args.iter().map(|arg| self.lower_expr(arg)).collect(),
            },
        };

        let (locals, scopes) = self.scopes.into_parts();
        debug!(
            locals = locals.len(),
            frames = scopes.len(),
            problems = self.problems.len(),
            "Built logical plan"
        );

        LogicalPlan {
            statement,
            locals,
            scopes,
        }
    }

    /// Run `f` inside a new frame; every frame opened by `f` is closed too
    fn in_frame<T>(&mut self, kind: FrameKind, f: impl FnOnce(&mut Self) -> T) -> T {
        let mark = self.scopes.depth();
        self.scopes.push_frame(kind);
        let result = f(self);
        self.scopes.pop_to(mark);
        result
    }

    fn reference(&self, var: &VarSyntax, position: RefPosition) -> VarRef {
        VarRef {
            name: var.name.clone(),
            qualifier: var.qualifier,
            position,
            scope: self.scopes.current_scope(),
            location: var.location,
        }
    }

    /// Reference that can only bind to `decl`, looked up from `scope`
    fn local_ref(decl: &VarDecl, scope: ScopeId) -> VarRef {
        VarRef {
            name: Identifier::new(decl.name.text.clone(), CaseSensitivity::Sensitive),
            qualifier: ScopeQualifier::LocalsOnly,
            position: RefPosition::Expression,
            scope,
            location: decl.location,
        }
    }

    fn declare(&mut self, name: Identifier, location: SourceLocation) -> VarDecl {
        let duplicate = self
            .scopes
            .current_frame()
            .iter()
            .any(|local| local.name.same_name(&name));
        if duplicate {
            debug!(name = %name, line = location.line, "Variable already defined in frame");
            self.problems.report(Problem::new(
                location,
                ProblemDetails::previously_defined(&name),
            ));
        }

        let index = self.scopes.declare(name.text.clone(), name.case);
        VarDecl {
            name,
            index,
            location,
        }
    }

    fn declare_alias(&mut self, alias: &ast::Alias) -> VarDecl {
        self.declare(alias.name.clone(), alias.location)
    }

    // ------------------------------------------------------------------
    // Scalar expressions
    // ------------------------------------------------------------------

    fn lower_box(&mut self, expr: &ast::Expr) -> Box<Expr<VarRef>> {
        Box::new(self.lower_expr(expr))
    }

    fn lower_exprs(&mut self, exprs: &[ast::Expr]) -> Vec<Expr<VarRef>> {
        exprs.iter().map(|e| self.lower_expr(e)).collect()
    }

    fn lower_expr(&mut self, expr: &ast::Expr) -> Expr<VarRef> {
        match expr {
            ast::Expr::Lit(value) => Expr::Lit(value.clone()),
            ast::Expr::Var(var) => Expr::Var(self.reference(var, RefPosition::Expression)),
            ast::Expr::Path { root, steps } => {
                let root = self.lower_box(root);
                let steps = steps.iter().map(|step| self.lower_step(step)).collect();
                Expr::Path { root, steps }
            }
            ast::Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: self.lower_box(operand),
            },
            ast::Expr::Binary { op, lhs, rhs } => {
                let lhs = self.lower_box(lhs);
                let rhs = self.lower_box(rhs);
                Expr::Binary { op: *op, lhs, rhs }
            }
            ast::Expr::Call { name, args } => Expr::Call {
                name: name.clone(),
                args: self.lower_exprs(args),
            },
            ast::Expr::CallAgg {
                name,
                quantifier,
                arg,
            } => Expr::CallAgg {
                name: name.clone(),
                quantifier: *quantifier,
                arg: self.lower_box(arg),
            },
            ast::Expr::Case {
                operand,
                branches,
                default,
            } => {
                let operand = operand.as_ref().map(|o| self.lower_box(o));
                let branches = branches
                    .iter()
                    .map(|branch| {
                        let condition = self.lower_expr(&branch.condition);
                        let result = self.lower_expr(&branch.result);
                        CaseBranch { condition, result }
                    })
                    .collect();
                let default = default.as_ref().map(|d| self.lower_box(d));
                Expr::Case {
                    operand,
                    branches,
                    default,
                }
            }
            ast::Expr::Collection { kind, values } => Expr::Collection {
                kind: *kind,
                values: self.lower_exprs(values),
            },
            ast::Expr::Struct { fields } => Expr::Struct {
                fields: fields
                    .iter()
                    .map(|field| {
                        let key = self.lower_expr(&field.key);
                        let value = self.lower_expr(&field.value);
                        StructField { key, value }
                    })
                    .collect(),
            },
            ast::Expr::Cast { value, as_type } => Expr::Cast {
                value: self.lower_box(value),
                as_type: as_type.clone(),
            },
            ast::Expr::Select(select) => Expr::Query(Box::new(self.lower_select(select))),
            ast::Expr::BagOp {
                op,
                quantifier,
                left,
                right,
            } => {
                let left = self.lower_box(left);
                let right = self.lower_box(right);
                Expr::Query(Box::new(Bexpr::new(BexprKind::SetOp {
                    op: *op,
                    quantifier: *quantifier,
                    left,
                    right,
                })))
            }
        }
    }

    fn lower_step(&mut self, step: &ast::PathStep) -> PathStep<VarRef> {
        match step {
            ast::PathStep::Field(name) => PathStep::Key {
                key: Box::new(Expr::string(name.text.clone())),
                case: name.case,
            },
            ast::PathStep::Index(index) => PathStep::Key {
                key: self.lower_box(index),
                case: CaseSensitivity::Sensitive,
            },
            ast::PathStep::Wildcard => PathStep::Wildcard,
            ast::PathStep::Unpivot => PathStep::Unpivot,
        }
    }

    // ------------------------------------------------------------------
    // SELECT blocks
    // ------------------------------------------------------------------

    fn lower_select(&mut self, select: &Select) -> Bexpr<VarRef> {
        self.in_frame(FrameKind::Query, |builder| builder.lower_select_body(select))
    }

    fn lower_select_body(&mut self, select: &Select) -> Bexpr<VarRef> {
        let mut aliases = Vec::new();
        let mut plan = match &select.from {
            Some(from) => {
                let mut ordinal = 0;
                self.lower_from(from, &mut ordinal, &mut aliases)
            }
            None => Bexpr::new(BexprKind::Unit),
        };

        if !select.let_bindings.is_empty() {
            let bindings = select
                .let_bindings
                .iter()
                .map(|binding| {
                    let value = self.lower_expr(&binding.expr);
                    self.scopes.push_frame(FrameKind::Let);
                    let decl = self.declare_alias(&binding.alias);
                    LetBinding { value, decl }
                })
                .collect();
            plan = Bexpr::new(BexprKind::Let {
                source: Box::new(plan),
                bindings,
            });
        }

        if let Some(predicate) = &select.where_clause {
            plan = Bexpr::new(BexprKind::Filter {
                predicate: self.lower_box(predicate),
                source: Box::new(plan),
            });
        }

        let mut group_locals = None;
        if let Some(group_by) = &select.group_by {
            let exprs: Vec<_> = group_by
                .keys
                .iter()
                .map(|key| self.lower_expr(&key.expr))
                .collect();

            self.scopes.push_frame(FrameKind::GroupBy);
            let keys: Vec<_> = group_by
                .keys
                .iter()
                .zip(exprs)
                .enumerate()
                .map(|(i, (key, expr))| {
                    let decl = match &key.alias {
                        Some(key_alias) => self.declare_alias(key_alias),
                        None => {
                            self.declare(alias::synthesize(&key.expr, i + 1), key.location())
                        }
                    };
                    GroupKey { expr, decl }
                })
                .collect();
            let group_as = group_by.group_as.as_ref().map(|a| self.declare_alias(a));

            let mut decls: Vec<VarDecl> = keys.iter().map(|key| key.decl.clone()).collect();
            decls.extend(group_as.iter().cloned());
            group_locals = Some(decls);

            plan = Bexpr::new(BexprKind::Aggregate {
                source: Box::new(plan),
                keys,
                group_as,
            });
        }

        if let Some(predicate) = &select.having {
            plan = Bexpr::new(BexprKind::Filter {
                predicate: self.lower_box(predicate),
                source: Box::new(plan),
            });
        }

        if !select.order_by.is_empty() {
            let specs = select
                .order_by
                .iter()
                .map(|item| SortSpec {
                    expr: self.lower_expr(&item.expr),
                    order: item.order,
                    nulls: item.nulls,
                })
                .collect();
            plan = Bexpr::new(BexprKind::Sort {
                source: Box::new(plan),
                specs,
            });
        }

        if let Some(offset) = &select.offset {
            plan = Bexpr::new(BexprKind::Offset {
                row_count: self.lower_box(offset),
                source: Box::new(plan),
            });
        }

        if let Some(limit) = &select.limit {
            plan = Bexpr::new(BexprKind::Limit {
                row_count: self.lower_box(limit),
                source: Box::new(plan),
            });
        }

        let projection =
            self.lower_projection(&select.projection, &aliases, group_locals.as_deref());
        Bexpr::new(BexprKind::Project {
            source: Box::new(plan),
            projection,
            quantifier: select.quantifier,
        })
    }

    fn lower_projection(
        &mut self,
        projection: &ast::Projection,
        aliases: &[SourceAlias],
        group_locals: Option<&[VarDecl]>,
    ) -> Projection<VarRef> {
        match projection {
            ast::Projection::Star => self.expand_star(aliases, group_locals),
            ast::Projection::List(items) => Projection::Struct(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        SelectItem::Expr {
                            expr,
                            alias: item_alias,
                        } => ProjectItem::Expr {
                            alias: item_alias
                                .as_ref()
                                .map(|a| a.name.text.clone())
                                .unwrap_or_else(|| alias::projection_name(expr, i + 1)),
                            expr: self.lower_expr(expr),
                        },
                        SelectItem::All(expr) => ProjectItem::All(self.lower_expr(expr)),
                    })
                    .collect(),
            ),
            ast::Projection::Value(value) => Projection::Value(self.lower_box(value)),
            ast::Projection::Pivot { value, key } => {
                let value = self.lower_box(value);
                let key = self.lower_box(key);
                Projection::Pivot { value, key }
            }
        }
    }

    /// `SELECT *`: every FROM `AS` local spread in order, or the group keys
    /// and GROUP AS variable under GROUP BY
    fn expand_star(
        &self,
        aliases: &[SourceAlias],
        group_locals: Option<&[VarDecl]>,
    ) -> Projection<VarRef> {
        let items = match group_locals {
            Some(decls) => {
                let scope = self.scopes.current_scope();
                decls
                    .iter()
                    .map(|decl| ProjectItem::Expr {
                        expr: Expr::Var(Self::local_ref(decl, scope)),
                        alias: decl.name.text.clone(),
                    })
                    .collect()
            }
            None => aliases
                .iter()
                .map(|source| {
                    ProjectItem::All(Expr::Var(Self::local_ref(&source.decl, source.scope)))
                })
                .collect(),
        };
        Projection::Struct(items)
    }

    fn lower_from(
        &mut self,
        from: &FromSource,
        ordinal: &mut usize,
        aliases: &mut Vec<SourceAlias>,
    ) -> Bexpr<VarRef> {
        match from {
            FromSource::Scan(item) => {
                let item = self.lower_from_item(item, ordinal, aliases);
                Bexpr::new(BexprKind::Scan {
                    expr: Box::new(item.expr),
                    as_decl: item.as_decl,
                    at_decl: item.at_decl,
                    by_decl: item.by_decl,
                })
            }
            FromSource::Unpivot(item) => {
                let item = self.lower_from_item(item, ordinal, aliases);
                Bexpr::new(BexprKind::Unpivot {
                    expr: Box::new(item.expr),
                    as_decl: item.as_decl,
                    at_decl: item.at_decl,
                    by_decl: item.by_decl,
                })
            }
            FromSource::Join {
                kind,
                left,
                right,
                predicate,
            } => {
                let left = self.lower_from(left, ordinal, aliases);
                let right = self.lower_from(right, ordinal, aliases);
                let predicate = predicate.as_ref().map(|p| self.lower_box(p));
                Bexpr::new(BexprKind::Join {
                    kind: *kind,
                    left: Box::new(left),
                    right: Box::new(right),
                    predicate,
                })
            }
        }
    }

    fn lower_from_item(
        &mut self,
        item: &FromItem,
        ordinal: &mut usize,
        aliases: &mut Vec<SourceAlias>,
    ) -> LoweredItem {
        *ordinal += 1;

        // Lowered before the item's own frame opens
        let expr = match &item.expr {
            ast::Expr::Var(var) => Expr::Var(self.reference(var, RefPosition::FromSource)),
            other => self.lower_expr(other),
        };

        let scope = self.scopes.push_frame(FrameKind::FromItem);
        let as_decl = match &item.as_alias {
            Some(as_alias) => self.declare_alias(as_alias),
            None => self.declare(alias::synthesize(&item.expr, *ordinal), item.location),
        };
        let at_decl = item.at_alias.as_ref().map(|a| self.declare_alias(a));
        let by_decl = item.by_alias.as_ref().map(|a| self.declare_alias(a));

        aliases.push(SourceAlias {
            decl: as_decl.clone(),
            scope,
        });

        LoweredItem {
            expr,
            as_decl,
            at_decl,
            by_decl,
        }
    }

    // ------------------------------------------------------------------
    // Data mutation
    // ------------------------------------------------------------------

    fn lower_dml(&mut self, dml: &DmlStatement) -> Vec<DmlOperation<VarRef>> {
        self.in_frame(FrameKind::Query, |builder| builder.lower_dml_body(dml))
    }

    fn lower_dml_body(&mut self, dml: &DmlStatement) -> Vec<DmlOperation<VarRef>> {
        let relation = dml
            .source
            .as_ref()
            .map(|source| self.lower_dml_source(source));

        let mut operations = Vec::new();
        let mut edits = Vec::new();

        for op in &dml.operations {
            match op {
                DmlOp::Set(assignments) => {
                    for assignment in assignments {
                        edits.push(self.row_edit(
                            &assignment.target,
                            Some(&assignment.value),
                            relation.as_ref(),
                        ));
                    }
                }
                DmlOp::Remove(path) if path.steps.is_empty() => match &relation {
                    Some(relation) if path.root.name.matches(&relation.alias.name.text) => {
                        self.flush_edits(&mut edits, Some(relation), &mut operations);
                        operations.push(self.delete_rows(relation));
                    }
                    Some(relation) => edits.push(self.row_edit(path, None, Some(relation))),
                    None => {
                        self.flush_edits(&mut edits, None, &mut operations);
                        operations.push(self.operation(
                            DmlAction::Delete,
                            &path.root,
                            Expr::empty_bag(),
                        ));
                    }
                },
                DmlOp::Remove(path) => edits.push(self.row_edit(path, None, relation.as_ref())),
                DmlOp::Insert { target, values } => {
                    self.flush_edits(&mut edits, relation.as_ref(), &mut operations);
                    let rows = match &relation {
                        Some(relation) => self.insert_per_row(relation, values),
                        None => self.lower_expr(values),
                    };
                    operations.push(self.operation(DmlAction::Insert, target, rows));
                }
                DmlOp::InsertValue {
                    target,
                    value,
                    on_conflict,
                } => {
                    self.flush_edits(&mut edits, relation.as_ref(), &mut operations);
                    let action = match on_conflict {
                        Some(OnConflict::DoReplaceExcluded) => DmlAction::Replace,
                        Some(OnConflict::DoUpdateExcluded) => DmlAction::Update,
                        Some(OnConflict::DoNothing) | None => DmlAction::Insert,
                    };
                    let value = self.lower_expr(value);
                    let rows = match &relation {
                        Some(relation) => Self::select_value(relation, value),
                        None => Expr::singleton_bag(value),
                    };
                    operations.push(self.operation(action, target, rows));
                }
            }
        }
        self.flush_edits(&mut edits, relation.as_ref(), &mut operations);

        operations
    }

    fn lower_dml_source(&mut self, source: &DmlSource) -> DmlRelation {
        let expr = Expr::Var(self.reference(&source.target, RefPosition::FromSource));

        let scope = self.scopes.push_frame(FrameKind::DmlSource);
        let alias = match &source.as_alias {
            Some(as_alias) => self.declare_alias(as_alias),
            None => self.declare(source.target.name.clone(), source.target.location),
        };
        let at_decl = source.at_alias.as_ref().map(|a| self.declare_alias(a));
        let by_decl = source.by_alias.as_ref().map(|a| self.declare_alias(a));

        let mut plan = Bexpr::new(BexprKind::Scan {
            expr: Box::new(expr),
            as_decl: alias.clone(),
            at_decl,
            by_decl,
        });
        if let Some(predicate) = &source.where_clause {
            plan = Bexpr::new(BexprKind::Filter {
                predicate: self.lower_box(predicate),
                source: Box::new(plan),
            });
        }

        DmlRelation {
            target: source.target.clone(),
            alias,
            scope,
            plan,
        }
    }

    /// `SELECT VALUE v FROM <source> WHERE <cond>, <values> AS v`
    fn insert_per_row(&mut self, relation: &DmlRelation, values: &ast::Expr) -> Expr<VarRef> {
        let rows = self.lower_expr(values);
        let location = values
            .first_var_location()
            .unwrap_or(relation.alias.location);

        self.in_frame(FrameKind::FromItem, |builder| {
            let decl = builder.declare(alias::synthesize(values, 2), location);
            let scope = builder.scopes.current_scope();
            let row = Expr::Var(Self::local_ref(&decl, scope));

            let each = Bexpr::new(BexprKind::Join {
                kind: JoinKind::Cross,
                left: Box::new(relation.plan.clone()),
                right: Box::new(Bexpr::new(BexprKind::Scan {
                    expr: Box::new(rows),
                    as_decl: decl,
                    at_decl: None,
                    by_decl: None,
                })),
                predicate: None,
            });
            Expr::Query(Box::new(Bexpr::new(BexprKind::Project {
                source: Box::new(each),
                projection: Projection::Value(Box::new(row)),
                quantifier: SetQuantifier::All,
            })))
        })
    }

    fn operation(
        &self,
        action: DmlAction,
        target: &VarSyntax,
        rows: Expr<VarRef>,
    ) -> DmlOperation<VarRef> {
        debug!(action = %action, target = %target.name, "Shaped DML operation");
        DmlOperation {
            action,
            target: self.reference(target, RefPosition::DmlTarget),
            rows,
        }
    }

    /// `SELECT VALUE <value> FROM <source> WHERE <cond>`
    fn select_value(relation: &DmlRelation, value: Expr<VarRef>) -> Expr<VarRef> {
        Expr::Query(Box::new(Bexpr::new(BexprKind::Project {
            source: Box::new(relation.plan.clone()),
            projection: Projection::Value(Box::new(value)),
            quantifier: SetQuantifier::All,
        })))
    }

    fn delete_rows(&self, relation: &DmlRelation) -> DmlOperation<VarRef> {
        let row = Expr::Var(Self::local_ref(&relation.alias, relation.scope));
        self.operation(
            DmlAction::Delete,
            &relation.target,
            Self::select_value(relation, row),
        )
    }

    fn row_edit(
        &mut self,
        target: &DmlPath,
        value: Option<&ast::Expr>,
        relation: Option<&DmlRelation>,
    ) -> RowEdit {
        let mut keys = Vec::new();
        if let Some(relation) = relation {
            // `SET a = 1` names a field of the row, `SET x.a = 1` a path from the alias
            if !target.root.name.matches(&relation.alias.name.text) {
                keys.push(Expr::string(target.root.name.text.clone()));
            }
        }
        for step in &target.steps {
            match step {
                DmlPathStep::Field(name) => keys.push(Expr::string(name.text.clone())),
                DmlPathStep::Index(index) => keys.push(self.lower_expr(index)),
            }
        }

        RowEdit {
            root: target.root.clone(),
            keys,
            value: value.map(|v| self.lower_expr(v)),
        }
    }

    /// Turn pending SET/REMOVE edits into update operations
    fn flush_edits(
        &self,
        edits: &mut Vec<RowEdit>,
        relation: Option<&DmlRelation>,
        operations: &mut Vec<DmlOperation<VarRef>>,
    ) {
        if edits.is_empty() {
            return;
        }

        match relation {
            Some(relation) => {
                let mut row = Expr::Var(Self::local_ref(&relation.alias, relation.scope));
                for edit in edits.drain(..) {
                    row = edit.apply(row);
                }
                operations.push(self.operation(
                    DmlAction::Update,
                    &relation.target,
                    Self::select_value(relation, row),
                ));
            }
            None => {
                for edit in edits.drain(..) {
                    operations.push(self.operation(
                        DmlAction::Update,
                        &edit.root,
                        Expr::empty_bag(),
                    ));
                }
            }
        }
    }
}
