// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Plan traversal
//!
//! Two traversals over the generic plan shape:
//!
//! - [`PlanFold`] consumes a tree and rebuilds it with a new variable payload.
//!   The binding resolver folds `VarRef` into `Binding`; physical lowering
//!   folds `Binding` into itself while tagging relational nodes.
//! - [`PlanVisitor`] borrows a tree and observes variables and relational
//!   nodes without rebuilding anything.
//!
//! Both walk in tree order: for a relational node, its input first, then its
//! own expressions left to right. This matches clause order (FROM before
//! WHERE before the projection), so diagnostics come out in reading order.

use crate::plan::{
    Bexpr, BexprKind, CaseBranch, DmlCommand, DmlOperation, Expr, GroupKey, ImplTag,
    LetBinding, PathStep, ProjectItem, Projection, SortSpec, Statement, StructField,
};

/// Rebuilds a plan with a new variable payload
pub trait PlanFold<V, W> {
    /// Map one variable reference
    fn fold_var(&mut self, var: V) -> W;

    /// Choose the execution tag of a rebuilt relational node
    fn fold_impl_tag(&mut self, tag: Option<ImplTag>, _kind: &BexprKind<W>) -> Option<ImplTag> {
        tag
    }
}

impl<V> Statement<V> {
    /// Rebuild this statement through `folder`
    pub fn fold<W, F: PlanFold<V, W>>(self, folder: &mut F) -> Statement<W> {
        match self {
            Statement::Query(expr) => Statement::Query(fold_expr(expr, folder)),
            Statement::Dml(operations) => Statement::Dml(
                operations
                    .into_iter()
                    .map(|op| DmlOperation {
                        action: op.action,
                        target: folder.fold_var(op.target),
                        rows: fold_expr(op.rows, folder),
                    })
                    .collect(),
            ),
            Statement::DmlCommands(commands) => Statement::DmlCommands(
                commands
                    .into_iter()
                    .map(|command| DmlCommand {
                        action: command.action,
                        target_unique_id: command.target_unique_id,
                        rows: fold_expr(command.rows, folder),
                    })
                    .collect(),
            ),
            Statement::Exec { procedure, args } => Statement::Exec {
                procedure,
                args: fold_exprs(args, folder),
            },
        }
    }

    /// Map every variable reference with a closure
    pub fn map_vars<W>(self, f: impl FnMut(V) -> W) -> Statement<W> {
        self.fold(&mut MapVars(f))
    }

    /// Observe this statement with `visitor`
    pub fn visit<'a, T: PlanVisitor<'a, V>>(&'a self, visitor: &mut T) {
        match self {
            Statement::Query(expr) => visit_expr(expr, visitor),
            Statement::Dml(operations) => {
                for op in operations {
                    visitor.visit_var(&op.target);
                    visit_expr(&op.rows, visitor);
                }
            }
            Statement::DmlCommands(commands) => {
                for command in commands {
                    visit_expr(&command.rows, visitor);
                }
            }
            Statement::Exec { args, .. } => {
                for arg in args {
                    visit_expr(arg, visitor);
                }
            }
        }
    }

    /// Every variable reference, in tree order
    pub fn vars(&self) -> Vec<&V> {
        let mut collector = CollectVars(Vec::new());
        self.visit(&mut collector);
        collector.0
    }

    /// Every relational node, in tree order
    pub fn bexprs(&self) -> Vec<&Bexpr<V>> {
        let mut collector = CollectBexprs(Vec::new());
        self.visit(&mut collector);
        collector.0
    }
}

struct MapVars<F>(F);

impl<V, W, F: FnMut(V) -> W> PlanFold<V, W> for MapVars<F> {
    fn fold_var(&mut self, var: V) -> W {
        (self.0)(var)
    }
}

fn fold_box<V, W, F: PlanFold<V, W>>(expr: Box<Expr<V>>, folder: &mut F) -> Box<Expr<W>> {
    Box::new(fold_expr(*expr, folder))
}

fn fold_exprs<V, W, F: PlanFold<V, W>>(exprs: Vec<Expr<V>>, folder: &mut F) -> Vec<Expr<W>> {
    exprs.into_iter().map(|e| fold_expr(e, folder)).collect()
}

/// Rebuild a scalar expression through `folder`
pub fn fold_expr<V, W, F: PlanFold<V, W>>(expr: Expr<V>, folder: &mut F) -> Expr<W> {
    match expr {
        Expr::Lit(value) => Expr::Lit(value),
        Expr::Var(var) => Expr::Var(folder.fold_var(var)),
        Expr::Path { root, steps } => {
            let root = fold_box(root, folder);
            let steps = steps
                .into_iter()
                .map(|step| match step {
                    PathStep::Key { key, case } => PathStep::Key {
                        key: fold_box(key, folder),
                        case,
                    },
                    PathStep::Wildcard => PathStep::Wildcard,
                    PathStep::Unpivot => PathStep::Unpivot,
                })
                .collect();
            Expr::Path { root, steps }
        }
        Expr::Unary { op, operand } => Expr::Unary {
            op,
            operand: fold_box(operand, folder),
        },
        Expr::Binary { op, lhs, rhs } => {
            let lhs = fold_box(lhs, folder);
            let rhs = fold_box(rhs, folder);
            Expr::Binary { op, lhs, rhs }
        }
        Expr::Call { name, args } => Expr::Call {
            name,
            args: fold_exprs(args, folder),
        },
        Expr::CallAgg {
            name,
            quantifier,
            arg,
        } => Expr::CallAgg {
            name,
            quantifier,
            arg: fold_box(arg, folder),
        },
        Expr::Case {
            operand,
            branches,
            default,
        } => {
            let operand = operand.map(|o| fold_box(o, folder));
            let branches = branches
                .into_iter()
                .map(|branch| {
                    let condition = fold_expr(branch.condition, folder);
                    let result = fold_expr(branch.result, folder);
                    CaseBranch { condition, result }
                })
                .collect();
            let default = default.map(|d| fold_box(d, folder));
            Expr::Case {
                operand,
                branches,
                default,
            }
        }
        Expr::Collection { kind, values } => Expr::Collection {
            kind,
            values: fold_exprs(values, folder),
        },
        Expr::Struct { fields } => Expr::Struct {
            fields: fields
                .into_iter()
                .map(|field| {
                    let key = fold_expr(field.key, folder);
                    let value = fold_expr(field.value, folder);
                    StructField { key, value }
                })
                .collect(),
        },
        Expr::Cast { value, as_type } => Expr::Cast {
            value: fold_box(value, folder),
            as_type,
        },
        Expr::Query(bexpr) => Expr::Query(Box::new(fold_bexpr(*bexpr, folder))),
    }
}

/// Rebuild a relational node through `folder`
pub fn fold_bexpr<V, W, F: PlanFold<V, W>>(bexpr: Bexpr<V>, folder: &mut F) -> Bexpr<W> {
    let fold_source = |source: Box<Bexpr<V>>, folder: &mut F| Box::new(fold_bexpr(*source, folder));

    let kind = match bexpr.kind {
        BexprKind::Unit => BexprKind::Unit,
        BexprKind::Scan {
            expr,
            as_decl,
            at_decl,
            by_decl,
        } => BexprKind::Scan {
            expr: fold_box(expr, folder),
            as_decl,
            at_decl,
            by_decl,
        },
        BexprKind::Unpivot {
            expr,
            as_decl,
            at_decl,
            by_decl,
        } => BexprKind::Unpivot {
            expr: fold_box(expr, folder),
            as_decl,
            at_decl,
            by_decl,
        },
        BexprKind::Filter { predicate, source } => {
            let source = fold_source(source, folder);
            BexprKind::Filter {
                predicate: fold_box(predicate, folder),
                source,
            }
        }
        BexprKind::Join {
            kind,
            left,
            right,
            predicate,
        } => {
            let left = fold_source(left, folder);
            let right = fold_source(right, folder);
            let predicate = predicate.map(|p| fold_box(p, folder));
            BexprKind::Join {
                kind,
                left,
                right,
                predicate,
            }
        }
        BexprKind::Let { source, bindings } => {
            let source = fold_source(source, folder);
            let bindings = bindings
                .into_iter()
                .map(|binding| LetBinding {
                    value: fold_expr(binding.value, folder),
                    decl: binding.decl,
                })
                .collect();
            BexprKind::Let { source, bindings }
        }
        BexprKind::Aggregate {
            source,
            keys,
            group_as,
        } => {
            let source = fold_source(source, folder);
            let keys = keys
                .into_iter()
                .map(|key| GroupKey {
                    expr: fold_expr(key.expr, folder),
                    decl: key.decl,
                })
                .collect();
            BexprKind::Aggregate {
                source,
                keys,
                group_as,
            }
        }
        BexprKind::Sort { source, specs } => {
            let source = fold_source(source, folder);
            let specs = specs
                .into_iter()
                .map(|spec| SortSpec {
                    expr: fold_expr(spec.expr, folder),
                    order: spec.order,
                    nulls: spec.nulls,
                })
                .collect();
            BexprKind::Sort { source, specs }
        }
        BexprKind::Offset { source, row_count } => {
            let source = fold_source(source, folder);
            BexprKind::Offset {
                source,
                row_count: fold_box(row_count, folder),
            }
        }
        BexprKind::Limit { source, row_count } => {
            let source = fold_source(source, folder);
            BexprKind::Limit {
                source,
                row_count: fold_box(row_count, folder),
            }
        }
        BexprKind::Project {
            source,
            projection,
            quantifier,
        } => {
            let source = fold_source(source, folder);
            let projection = match projection {
                Projection::Value(value) => Projection::Value(fold_box(value, folder)),
                Projection::Struct(items) => Projection::Struct(
                    items
                        .into_iter()
                        .map(|item| match item {
                            ProjectItem::Expr { expr, alias } => ProjectItem::Expr {
                                expr: fold_expr(expr, folder),
                                alias,
                            },
                            ProjectItem::All(expr) => ProjectItem::All(fold_expr(expr, folder)),
                        })
                        .collect(),
                ),
                Projection::Pivot { value, key } => {
                    let value = fold_box(value, folder);
                    let key = fold_box(key, folder);
                    Projection::Pivot { value, key }
                }
            };
            BexprKind::Project {
                source,
                projection,
                quantifier,
            }
        }
        BexprKind::SetOp {
            op,
            quantifier,
            left,
            right,
        } => {
            let left = fold_box(left, folder);
            let right = fold_box(right, folder);
            BexprKind::SetOp {
                op,
                quantifier,
                left,
                right,
            }
        }
    };

    let impl_tag = folder.fold_impl_tag(bexpr.impl_tag, &kind);
    Bexpr { kind, impl_tag }
}

/// Observes a plan without rebuilding it
pub trait PlanVisitor<'a, V> {
    fn visit_var(&mut self, _var: &'a V) {}

    /// Called before the node's children
    fn visit_bexpr(&mut self, _bexpr: &'a Bexpr<V>) {}
}

struct CollectVars<'a, V>(Vec<&'a V>);

impl<'a, V> PlanVisitor<'a, V> for CollectVars<'a, V> {
    fn visit_var(&mut self, var: &'a V) {
        self.0.push(var);
    }
}

struct CollectBexprs<'a, V>(Vec<&'a Bexpr<V>>);

impl<'a, V> PlanVisitor<'a, V> for CollectBexprs<'a, V> {
    fn visit_bexpr(&mut self, bexpr: &'a Bexpr<V>) {
        self.0.push(bexpr);
    }
}

/// Walk a scalar expression
pub fn visit_expr<'a, V, T: PlanVisitor<'a, V>>(expr: &'a Expr<V>, visitor: &mut T) {
    match expr {
        Expr::Lit(_) => {}
        Expr::Var(var) => visitor.visit_var(var),
        Expr::Path { root, steps } => {
            visit_expr(root, visitor);
            for step in steps {
                if let PathStep::Key { key, .. } = step {
                    visit_expr(key, visitor);
                }
            }
        }
        Expr::Unary { operand, .. } => visit_expr(operand, visitor),
        Expr::Binary { lhs, rhs, .. } => {
            visit_expr(lhs, visitor);
            visit_expr(rhs, visitor);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                visit_expr(arg, visitor);
            }
        }
        Expr::CallAgg { arg, .. } => visit_expr(arg, visitor),
        Expr::Case {
            operand,
            branches,
            default,
        } => {
            if let Some(operand) = operand {
                visit_expr(operand, visitor);
            }
            for branch in branches {
                visit_expr(&branch.condition, visitor);
                visit_expr(&branch.result, visitor);
            }
            if let Some(default) = default {
                visit_expr(default, visitor);
            }
        }
        Expr::Collection { values, .. } => {
            for value in values {
                visit_expr(value, visitor);
            }
        }
        Expr::Struct { fields } => {
            for field in fields {
                visit_expr(&field.key, visitor);
                visit_expr(&field.value, visitor);
            }
        }
        Expr::Cast { value, .. } => visit_expr(value, visitor),
        Expr::Query(bexpr) => visit_bexpr(bexpr, visitor),
    }
}

/// Walk a relational node
pub fn visit_bexpr<'a, V, T: PlanVisitor<'a, V>>(bexpr: &'a Bexpr<V>, visitor: &mut T) {
    visitor.visit_bexpr(bexpr);
    match &bexpr.kind {
        BexprKind::Unit => {}
        BexprKind::Scan { expr, .. } | BexprKind::Unpivot { expr, .. } => {
            visit_expr(expr, visitor)
        }
        BexprKind::Filter { predicate, source } => {
            visit_bexpr(source, visitor);
            visit_expr(predicate, visitor);
        }
        BexprKind::Join {
            left,
            right,
            predicate,
            ..
        } => {
            visit_bexpr(left, visitor);
            visit_bexpr(right, visitor);
            if let Some(predicate) = predicate {
                visit_expr(predicate, visitor);
            }
        }
        BexprKind::Let { source, bindings } => {
            visit_bexpr(source, visitor);
            for binding in bindings {
                visit_expr(&binding.value, visitor);
            }
        }
        BexprKind::Aggregate { source, keys, .. } => {
            visit_bexpr(source, visitor);
            for key in keys {
                visit_expr(&key.expr, visitor);
            }
        }
        BexprKind::Sort { source, specs } => {
            visit_bexpr(source, visitor);
            for spec in specs {
                visit_expr(&spec.expr, visitor);
            }
        }
        BexprKind::Offset { source, row_count } | BexprKind::Limit { source, row_count } => {
            visit_bexpr(source, visitor);
            visit_expr(row_count, visitor);
        }
        BexprKind::Project {
            source, projection, ..
        } => {
            visit_bexpr(source, visitor);
            match projection {
                Projection::Value(value) => visit_expr(value, visitor),
                Projection::Struct(items) => {
                    for item in items {
                        match item {
                            ProjectItem::Expr { expr, .. } | ProjectItem::All(expr) => {
                                visit_expr(expr, visitor)
                            }
                        }
                    }
                }
                Projection::Pivot { value, key } => {
                    visit_expr(value, visitor);
                    visit_expr(key, visitor);
                }
            }
        }
        BexprKind::SetOp { left, right, .. } => {
            visit_expr(left, visitor);
            visit_expr(right, visitor);
        }
    }
}
