// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Nested SQL Compiler
//!
//! The three-pass pipeline in one call:
//!
//! ```text
//! ast::Statement ─build─→ LogicalPlan ─resolve─→ ResolvedPlan ─lower─→ PhysicalPlan
//!                    │                    │                      │
//!                    └──────────── ProblemCollector ─────────────┘
//! ```
//!
//! One [`ProblemCollector`] is created per compilation and shared by every
//! pass. [`Compiler::compile`] always completes and hands the problems back
//! with the plans; [`Compiler::compile_strict`] fails instead when any
//! problem was reported.
//!
//! A [`Compiler`] holds no mutable state, so one instance can compile
//! statements from several threads at once.
//!
//! ## Example
//!
//! ```rust
//! use nested_sql_compiler::Compiler;
//! use nested_sql_ir::ast::{Expr, Statement};
//! use nested_sql_ir::{Identifier, SourceLocation};
//!
//! let catalog = |name: &str, _: bool| {
//!     name.eq_ignore_ascii_case("orders").then(|| "shop.orders".to_string())
//! };
//! let statement = Statement::Query(Expr::var(
//!     Identifier::insensitive("Orders"),
//!     SourceLocation::new(1, 1),
//! ));
//!
//! let compilation = Compiler::new(catalog).compile(&statement);
//! assert!(compilation.problems.is_empty());
//! assert!(compilation.physical_plan.is_some());
//! ```

pub mod config;
pub mod error;

pub use config::CompilerConfig;
pub use error::{CompileError, CompileResult, ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use nested_sql_catalog::Catalog;
use nested_sql_ir::{
    ast, LocalDecl, PhysicalStatement, Problem, ProblemCollector, ResolvedPlan, ResolvedStatement,
};
use nested_sql_physical::PhysicalLowering;
use nested_sql_planner::LogicalPlanBuilder;
use nested_sql_semantic::BindingResolver;

/// Output of one compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compilation {
    /// The plan after binding resolution
    pub resolved_plan: ResolvedStatement,

    /// Every local declared by the statement, in index order
    pub locals: Vec<LocalDecl>,

    /// The lowered plan, absent when a DML target could not be resolved
    pub physical_plan: Option<PhysicalStatement>,

    /// Problems in the order the passes reported them
    pub problems: Vec<Problem>,
}

impl Compilation {
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Whether the physical plan can be handed to an engine
    pub fn is_executable(&self) -> bool {
        self.physical_plan.is_some() && self.problems.is_empty()
    }
}

/// The compilation pipeline bound to one catalog
#[derive(Debug, Clone)]
pub struct Compiler<C: Catalog> {
    catalog: C,
    config: CompilerConfig,
    lowering: PhysicalLowering,
}

impl<C: Catalog> Compiler<C> {
    /// Create a compiler with the default configuration
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            config: CompilerConfig::default(),
            lowering: PhysicalLowering::new(),
        }
    }

    /// Create a compiler with `config`, rejecting contradictory settings
    pub fn with_config(catalog: C, config: CompilerConfig) -> CompileResult<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            lowering: PhysicalLowering::new(),
        })
    }

    /// Replace the physical lowering stage, e.g. to change the default tag
    pub fn with_lowering(mut self, lowering: PhysicalLowering) -> Self {
        self.lowering = lowering;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Compile `statement`, collecting every problem
    ///
    /// The plans are always produced, except the physical plan when lowering
    /// hits a DML target the resolver could not bind.
    #[instrument(skip_all, fields(allow_undefined = self.config.allow_undefined_variables))]
    pub fn compile(&self, statement: &ast::Statement) -> Compilation {
        let mut problems = ProblemCollector::new();
        let resolved = self.build_and_resolve(statement, &mut problems);

        let resolved_plan = resolved.statement.clone();
        let locals = resolved.locals.clone();
        let physical_plan = match self.lowering.lower(resolved) {
            Ok(physical) => Some(physical.statement),
            Err(e) => {
                warn!(error = %e, "Physical lowering skipped");
                None
            }
        };

        debug!(
            problems = problems.len(),
            lowered = physical_plan.is_some(),
            "Compiled statement"
        );

        Compilation {
            resolved_plan,
            locals,
            physical_plan,
            problems: problems.into_problems(),
        }
    }

    /// Compile `statement`, failing when any problem was reported
    #[instrument(skip_all)]
    pub fn compile_strict(&self, statement: &ast::Statement) -> CompileResult<Compilation> {
        let mut problems = ProblemCollector::new();
        let resolved = self.build_and_resolve(statement, &mut problems);

        if problems.has_problems() {
            debug!(problems = problems.len(), "Strict compilation rejected");
            return Err(CompileError::Problems(problems.into_problems()));
        }

        let resolved_plan = resolved.statement.clone();
        let physical = self.lowering.lower(resolved)?;
        Ok(Compilation {
            resolved_plan,
            locals: physical.locals,
            physical_plan: Some(physical.statement),
            problems: Vec::new(),
        })
    }

    /// Compile `statement` in the mode the configuration selects
    pub fn run(&self, statement: &ast::Statement) -> CompileResult<Compilation> {
        if self.config.strict {
            self.compile_strict(statement)
        } else {
            Ok(self.compile(statement))
        }
    }

    fn build_and_resolve(
        &self,
        statement: &ast::Statement,
        problems: &mut ProblemCollector,
    ) -> ResolvedPlan {
        let logical = LogicalPlanBuilder::new(problems).build(statement);
        BindingResolver::new(&self.catalog, problems)
            .allow_undefined(self.config.allow_undefined_variables)
            .resolve(logical)
    }
}
