// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Physical lowering
//!
//! The last pass. It changes no bindings; it only
//!
//! 1. gives every relational operator an execution tag, keeping tags that are
//!    already set, and
//! 2. replaces the logical DML operations of a statement with
//!    [`DmlCommand`] records naming their target by catalog id.
//!
//! Lowering a plan that is already physical returns it unchanged.

use tracing::{debug, instrument, trace};

use nested_sql_ir::plan::{BexprKind, DmlCommand, DmlOperation, ImplTag, Statement};
use nested_sql_ir::visit::{PlanFold, fold_expr};
use nested_sql_ir::{Binding, PhysicalPlan, ResolvedPlan};

use crate::error::{PhysicalError, PhysicalResult};

/// Lowers resolved plans to physical plans
#[derive(Debug, Clone, Default)]
pub struct PhysicalLowering {
    default_tag: ImplTag,
}

impl PhysicalLowering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `tag` for operators that carry none
    pub fn with_default_tag(tag: ImplTag) -> Self {
        Self { default_tag: tag }
    }

    pub fn default_tag(&self) -> &ImplTag {
        &self.default_tag
    }

    /// Lower `plan`
    ///
    /// Fails only when a DML target has no catalog id, which the resolver has
    /// already reported as a problem.
    #[instrument(skip_all, fields(tag = %self.default_tag))]
    pub fn lower(&self, plan: ResolvedPlan) -> PhysicalResult<PhysicalPlan> {
        let mut tagger = Tagger {
            default_tag: &self.default_tag,
            tagged: 0,
        };

        let statement = match plan.statement {
            Statement::Dml(operations) => Statement::DmlCommands(
                operations
                    .into_iter()
                    .map(|op| Self::command(op, &mut tagger))
                    .collect::<PhysicalResult<Vec<_>>>()?,
            ),
            other => other.fold(&mut tagger),
        };

        debug!(tagged = tagger.tagged, "Lowered physical plan");
        Ok(PhysicalPlan {
            statement,
            locals: plan.locals,
        })
    }

    fn command(
        op: DmlOperation<Binding>,
        tagger: &mut Tagger<'_>,
    ) -> PhysicalResult<DmlCommand<Binding>> {
        let target_unique_id = op
            .target
            .global_id()
            .map(str::to_string)
            .ok_or_else(|| PhysicalError::UnresolvedTarget {
                name: op.target.name.text.clone(),
                line: op.target.location.line,
                offset: op.target.location.offset,
            })?;

        trace!(action = %op.action, target = %target_unique_id, "Built DML command");
        Ok(DmlCommand {
            action: op.action.as_str().to_string(),
            target_unique_id,
            rows: fold_expr(op.rows, tagger),
        })
    }
}

/// Lower `plan` with the default execution tag
pub fn lower(plan: ResolvedPlan) -> PhysicalResult<PhysicalPlan> {
    PhysicalLowering::new().lower(plan)
}

struct Tagger<'a> {
    default_tag: &'a ImplTag,
    tagged: usize,
}

impl PlanFold<Binding, Binding> for Tagger<'_> {
    fn fold_var(&mut self, var: Binding) -> Binding {
        var
    }

    fn fold_impl_tag(&mut self, tag: Option<ImplTag>, _kind: &BexprKind<Binding>) -> Option<ImplTag> {
        match tag {
            Some(tag) => Some(tag),
            None => {
                self.tagged += 1;
                Some(self.default_tag.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nested_sql_ir::plan::{Bexpr, DmlAction, Expr};
    use nested_sql_ir::{Identifier, ResolvedRef, SourceLocation};

    fn binding(name: &str, resolved: Option<ResolvedRef>) -> Binding {
        Binding {
            name: Identifier::insensitive(name),
            resolved,
            location: SourceLocation::new(1, 13),
        }
    }

    fn unit_query() -> Expr<Binding> {
        Expr::Query(Box::new(Bexpr::new(BexprKind::Filter {
            predicate: Box::new(Expr::Var(binding("x", Some(ResolvedRef::Local(0))))),
            source: Box::new(Bexpr::new(BexprKind::Unit)),
        })))
    }

    fn plan(statement: Statement<Binding>) -> ResolvedPlan {
        ResolvedPlan {
            statement,
            locals: Vec::new(),
        }
    }

    #[test]
    fn test_every_operator_gets_default_tag() {
        let physical = lower(plan(Statement::Query(unit_query()))).unwrap();
        let tags: Vec<_> = physical
            .statement
            .bexprs()
            .iter()
            .map(|b| b.impl_tag.clone())
            .collect();
        assert_eq!(tags, vec![Some(ImplTag::default()), Some(ImplTag::default())]);
    }

    #[test]
    fn test_existing_tags_are_kept() {
        let mut bexpr = Bexpr::new(BexprKind::Unit);
        bexpr.impl_tag = Some(ImplTag("hash".to_string()));
        let statement = Statement::Query(Expr::Query(Box::new(bexpr)));

        let physical = PhysicalLowering::with_default_tag(ImplTag("nested_loop".to_string()))
            .lower(plan(statement))
            .unwrap();
        assert_eq!(
            physical.statement.bexprs()[0].impl_tag,
            Some(ImplTag("hash".to_string()))
        );
    }

    #[test]
    fn test_dml_operation_becomes_command() {
        let statement = Statement::Dml(vec![DmlOperation {
            action: DmlAction::Delete,
            target: binding("orders", Some(ResolvedRef::Global("shop.orders".to_string()))),
            rows: unit_query(),
        }]);

        let physical = lower(plan(statement)).unwrap();
        match &physical.statement {
            Statement::DmlCommands(commands) => {
                assert_eq!(commands.len(), 1);
                assert_eq!(commands[0].action, "delete");
                assert_eq!(commands[0].target_unique_id, "shop.orders");
            }
            other => panic!("Expected DML commands, found {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_target_fails() {
        let statement = Statement::Dml(vec![DmlOperation {
            action: DmlAction::Insert,
            target: binding("nowhere", None),
            rows: Expr::empty_bag(),
        }]);

        let err = lower(plan(statement)).unwrap_err();
        assert_eq!(
            err,
            PhysicalError::UnresolvedTarget {
                name: "nowhere".to_string(),
                line: 1,
                offset: 13,
            }
        );
    }

    #[test]
    fn test_lowering_is_idempotent() {
        let once = lower(plan(Statement::Query(unit_query()))).unwrap();
        let twice = lower(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}
