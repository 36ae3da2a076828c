// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Plan-specific test helpers and custom assertions

use nested_sql_ir::{
    Binding, PhysicalPlan, Problem, ProblemDetails, ResolvedPlan, ResolvedRef, SourceLocation,
};

/// Custom assertion helpers for compiler tests
pub struct PlanAssertions;

impl PlanAssertions {
    /// Assert that a binding resolved to the local with the given index
    pub fn assert_local(binding: &Binding, index: u32) {
        match &binding.resolved {
            Some(ResolvedRef::Local(found)) => assert_eq!(
                *found, index,
                "Expected '{}' to bind local {}, found local {}",
                binding.name, index, found
            ),
            other => panic!(
                "Expected '{}' to bind local {}, found {:?}",
                binding.name, index, other
            ),
        }
    }

    /// Assert that a binding resolved to the catalog entity with the given id
    pub fn assert_global(binding: &Binding, id: &str) {
        match &binding.resolved {
            Some(ResolvedRef::Global(found)) => assert_eq!(
                found, id,
                "Expected '{}' to bind global '{}', found '{}'",
                binding.name, id, found
            ),
            other => panic!(
                "Expected '{}' to bind global '{}', found {:?}",
                binding.name, id, other
            ),
        }
    }

    /// Assert that a binding was deferred to the runtime
    pub fn assert_dynamic(binding: &Binding, search_globals_first: bool, candidates: &[u32]) {
        match &binding.resolved {
            Some(ResolvedRef::Dynamic {
                search_globals_first: found_first,
                candidate_locals,
                ..
            }) => {
                assert_eq!(
                    *found_first, search_globals_first,
                    "Dynamic '{}' has the wrong global search order",
                    binding.name
                );
                assert_eq!(
                    candidate_locals.as_slice(),
                    candidates,
                    "Dynamic '{}' has the wrong candidate locals",
                    binding.name
                );
            }
            other => panic!("Expected '{}' to be dynamic, found {:?}", binding.name, other),
        }
    }

    /// Assert that a binding failed to resolve
    pub fn assert_failed(binding: &Binding) {
        assert!(
            binding.resolved.is_none(),
            "Expected '{}' to stay unresolved, found {:?}",
            binding.name,
            binding.resolved
        );
    }

    /// Assert that the problem list holds exactly one problem, with the given
    /// location and details
    pub fn assert_single_problem(
        problems: &[Problem],
        line: u32,
        offset: u32,
        details: ProblemDetails,
    ) {
        assert_eq!(problems.len(), 1, "Expected one problem, found {:?}", problems);
        Self::assert_problem(&problems[0], line, offset, details);
    }

    /// Assert that a problem has the given location and details
    pub fn assert_problem(problem: &Problem, line: u32, offset: u32, details: ProblemDetails) {
        assert_eq!(
            problem.location,
            SourceLocation::new(line, offset),
            "Problem '{}' reported at the wrong location",
            problem.details
        );
        assert_eq!(problem.details, details, "Problem details mismatch");
    }

    /// Assert that every relational operator carries an implementation tag
    pub fn assert_all_tagged(plan: &PhysicalPlan) {
        for bexpr in plan.statement.bexprs() {
            assert!(
                bexpr.impl_tag.is_some(),
                "Operator '{}' has no implementation tag",
                bexpr.operator_name()
            );
        }
    }
}

/// Every binding in a resolved plan, in tree order
pub fn bindings(plan: &ResolvedPlan) -> Vec<&Binding> {
    plan.statement.vars()
}

/// Every binding in a resolved plan whose name has the given text
pub fn bindings_named<'a>(plan: &'a ResolvedPlan, name: &str) -> Vec<&'a Binding> {
    plan.statement
        .vars()
        .into_iter()
        .filter(|binding| binding.name.text == name)
        .collect()
}
