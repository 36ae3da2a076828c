// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Binding resolver
//!
//! Rewrites every unresolved [`VarRef`] of a [`LogicalPlan`] into a
//! [`Binding`], in tree order. A reference ends in exactly one of four states:
//!
//! | state     | produced when                                              |
//! |-----------|------------------------------------------------------------|
//! | `Global`  | the catalog knows the name                                 |
//! | `Local`   | a local declared in a statically visible frame matches     |
//! | `Dynamic` | nothing matched and undefined variables are allowed        |
//! | failed    | nothing matched; an `UndefinedVariable` problem is reported |
//!
//! ## Search order
//!
//! ```text
//! FROM source, Default qualifier:  catalog ─────────────────────→ Dynamic(globals first)
//! any other position, Default:     locals → catalog ────────────→ Dynamic(locals first)
//! LocalsOnly qualifier:            locals ──────────────────────→ Dynamic(locals first)
//! DML target:                      catalog ─────────────────────→ failed
//! ```
//!
//! A failed FROM-source probe never falls back to a local. DML targets never
//! become dynamic because a mutation record needs a concrete catalog id.

use tracing::{debug, instrument, trace};

use nested_sql_catalog::Catalog;
use nested_sql_ir::visit::PlanFold;
use nested_sql_ir::{
    Binding, Identifier, LogicalPlan, Problem, ProblemCollector, ProblemDetails, RefPosition,
    ResolvedPlan, ResolvedRef, ScopeQualifier, VarRef,
};

use crate::lookup::LocalLookup;

/// Resolves the references of logical plans against a catalog
///
/// # Examples
///
/// ```
/// use nested_sql_ir::ast::{Expr, Statement};
/// use nested_sql_ir::{Identifier, ProblemCollector, SourceLocation};
/// use nested_sql_planner::LogicalPlanBuilder;
/// use nested_sql_semantic::BindingResolver;
///
/// let statement = Statement::Query(Expr::var(
///     Identifier::insensitive("ORDERS"),
///     SourceLocation::new(1, 1),
/// ));
/// let catalog = |name: &str, _: bool| {
///     name.eq_ignore_ascii_case("orders").then(|| "shop.orders".to_string())
/// };
///
/// let mut problems = ProblemCollector::new();
/// let plan = LogicalPlanBuilder::new(&mut problems).build(&statement);
/// let resolved = BindingResolver::new(&catalog, &mut problems).resolve(plan);
///
/// assert_eq!(resolved.statement.vars()[0].global_id(), Some("shop.orders"));
/// assert!(problems.is_empty());
/// ```
pub struct BindingResolver<'c, 'p, C: Catalog + ?Sized> {
    catalog: &'c C,
    problems: &'p mut ProblemCollector,
    allow_undefined: bool,
}

impl<'c, 'p, C: Catalog + ?Sized> BindingResolver<'c, 'p, C> {
    pub fn new(catalog: &'c C, problems: &'p mut ProblemCollector) -> Self {
        Self {
            catalog,
            problems,
            allow_undefined: false,
        }
    }

    /// Turn unresolvable references into `Dynamic` ones instead of problems
    pub fn allow_undefined(mut self, allow: bool) -> Self {
        self.allow_undefined = allow;
        self
    }

    /// Resolve every reference of `plan`
    ///
    /// The walk always completes; failures are reported to the collector and
    /// leave the binding unresolved.
    #[instrument(skip_all, fields(allow_undefined = self.allow_undefined))]
    pub fn resolve(self, plan: LogicalPlan) -> ResolvedPlan {
        let LogicalPlan {
            statement,
            locals,
            scopes,
        } = plan;

        let mut pass = ResolvePass {
            catalog: self.catalog,
            problems: self.problems,
            allow_undefined: self.allow_undefined,
            lookup: LocalLookup::new(&scopes, &locals),
            counts: Counts::default(),
        };
        let statement = statement.fold(&mut pass);

        let counts = pass.counts;
        debug!(
            globals = counts.globals,
            locals = counts.locals,
            dynamic = counts.dynamic,
            failed = counts.failed,
            "Resolved bindings"
        );

        ResolvedPlan { statement, locals }
    }
}

/// Resolve `plan` in one call
pub fn resolve<C: Catalog + ?Sized>(
    plan: LogicalPlan,
    catalog: &C,
    problems: &mut ProblemCollector,
    allow_undefined: bool,
) -> ResolvedPlan {
    BindingResolver::new(catalog, problems)
        .allow_undefined(allow_undefined)
        .resolve(plan)
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    globals: usize,
    locals: usize,
    dynamic: usize,
    failed: usize,
}

/// State of one resolution walk
struct ResolvePass<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    problems: &'a mut ProblemCollector,
    allow_undefined: bool,
    lookup: LocalLookup<'a>,
    counts: Counts,
}

impl<C: Catalog + ?Sized> ResolvePass<'_, C> {
    fn resolve_ref(&mut self, var: &VarRef) -> Option<ResolvedRef> {
        match (var.position, var.qualifier) {
            (RefPosition::DmlTarget, _) => self.global(&var.name),
            (RefPosition::FromSource, ScopeQualifier::Default) => {
                self.global(&var.name).or_else(|| self.dynamic(var, true))
            }
            (_, ScopeQualifier::LocalsOnly) => self
                .lookup
                .find(&var.name, var.scope)
                .map(ResolvedRef::Local)
                .or_else(|| self.dynamic(var, false)),
            (_, ScopeQualifier::Default) => self
                .lookup
                .find(&var.name, var.scope)
                .map(ResolvedRef::Local)
                .or_else(|| self.global(&var.name))
                .or_else(|| self.dynamic(var, false)),
        }
    }

    fn global(&self, name: &Identifier) -> Option<ResolvedRef> {
        self.catalog
            .lookup(&name.text, name.case.is_sensitive())
            .map(ResolvedRef::Global)
    }

    fn dynamic(&self, var: &VarRef, search_globals_first: bool) -> Option<ResolvedRef> {
        self.allow_undefined.then(|| ResolvedRef::Dynamic {
            name: var.name.clone(),
            search_globals_first,
            candidate_locals: self.lookup.candidates(var.scope),
        })
    }

    fn record(&mut self, var: &VarRef, resolved: &Option<ResolvedRef>) {
        match resolved {
            Some(ResolvedRef::Global(id)) => {
                self.counts.globals += 1;
                trace!(name = %var.name, id = %id, "Bound global");
            }
            Some(ResolvedRef::Local(index)) => {
                self.counts.locals += 1;
                trace!(name = %var.name, index, "Bound local");
            }
            Some(ResolvedRef::Dynamic {
                search_globals_first,
                candidate_locals,
                ..
            }) => {
                self.counts.dynamic += 1;
                trace!(
                    name = %var.name,
                    search_globals_first,
                    candidates = candidate_locals.len(),
                    "Deferred to runtime"
                );
            }
            None => {
                self.counts.failed += 1;
                debug!(
                    name = %var.name,
                    line = var.location.line,
                    offset = var.location.offset,
                    "Undefined variable"
                );
                self.problems.report(Problem::new(
                    var.location,
                    ProblemDetails::undefined_variable(&var.name),
                ));
            }
        }
    }
}

impl<C: Catalog + ?Sized> PlanFold<VarRef, Binding> for ResolvePass<'_, C> {
    fn fold_var(&mut self, var: VarRef) -> Binding {
        let resolved = self.resolve_ref(&var);
        self.record(&var, &resolved);
        Binding {
            name: var.name,
            resolved,
            location: var.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nested_sql_ir::plan::{Expr, Statement};
    use nested_sql_ir::{FrameKind, LocalDecl, ScopeId, ScopeTree, SourceLocation};

    fn reference(name: Identifier, qualifier: ScopeQualifier, position: RefPosition) -> VarRef {
        VarRef {
            name,
            qualifier,
            position,
            scope: ScopeId(1),
            location: SourceLocation::new(1, 8),
        }
    }

    /// A plan whose only statement is `var`, seen from a frame declaring `t`
    fn plan_of(var: VarRef) -> LogicalPlan {
        let mut scopes = ScopeTree::new();
        let root = scopes.add_frame(FrameKind::Statement, None);
        let item = scopes.add_frame(FrameKind::FromItem, Some(root));
        scopes.add_local(item, 0);
        LogicalPlan {
            statement: Statement::Query(Expr::Var(var)),
            locals: vec![LocalDecl {
                name: Identifier::insensitive("t"),
                index: 0,
            }],
            scopes,
        }
    }

    fn catalog(name: &str, case_sensitive: bool) -> Option<String> {
        let found = if case_sensitive {
            name == "t"
        } else {
            name.eq_ignore_ascii_case("t")
        };
        found.then(|| "db.t".to_string())
    }

    fn resolve_one(var: VarRef, allow_undefined: bool) -> (Binding, ProblemCollector) {
        let mut problems = ProblemCollector::new();
        let resolved = resolve(plan_of(var), &catalog, &mut problems, allow_undefined);
        let binding = resolved.statement.vars()[0].clone();
        (binding, problems)
    }

    #[test]
    fn test_from_source_prefers_catalog() {
        let var = reference(
            Identifier::insensitive("T"),
            ScopeQualifier::Default,
            RefPosition::FromSource,
        );
        let (binding, problems) = resolve_one(var, false);
        assert_eq!(binding.global_id(), Some("db.t"));
        assert!(problems.is_empty());
    }

    #[test]
    fn test_expression_prefers_local() {
        let var = reference(
            Identifier::insensitive("T"),
            ScopeQualifier::Default,
            RefPosition::Expression,
        );
        let (binding, _) = resolve_one(var, false);
        assert_eq!(binding.local_index(), Some(0));
    }

    #[test]
    fn test_from_source_miss_goes_dynamic_globals_first() {
        let var = reference(
            Identifier::insensitive("missing"),
            ScopeQualifier::Default,
            RefPosition::FromSource,
        );
        let (binding, problems) = resolve_one(var, true);
        assert_eq!(
            binding.resolved,
            Some(ResolvedRef::Dynamic {
                name: Identifier::insensitive("missing"),
                search_globals_first: true,
                candidate_locals: vec![0],
            })
        );
        assert!(problems.is_empty());
    }

    #[test]
    fn test_locals_only_never_reaches_catalog() {
        // Seen from the root frame no local is visible, but the catalog knows `t`
        let mut var = reference(
            Identifier::insensitive("t"),
            ScopeQualifier::LocalsOnly,
            RefPosition::Expression,
        );
        var.scope = ScopeId(0);
        let (binding, problems) = resolve_one(var, false);
        assert!(!binding.is_resolved());
        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems.problems()[0].details,
            ProblemDetails::UndefinedVariable {
                name: "t".to_string(),
                case_sensitive: false,
            }
        );
    }

    #[test]
    fn test_dml_target_never_goes_dynamic() {
        let var = reference(
            Identifier::insensitive("missing"),
            ScopeQualifier::Default,
            RefPosition::DmlTarget,
        );
        let (binding, problems) = resolve_one(var, true);
        assert!(!binding.is_resolved());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems.problems()[0].location, SourceLocation::new(1, 8));
    }
}
