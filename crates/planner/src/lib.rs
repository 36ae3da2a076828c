// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Nested SQL - Planner
//!
//! First compiler pass: syntax tree in, unresolved logical plan out.
//!
//! ```text
//! ast::Statement → LogicalPlanBuilder → LogicalPlan { statement, locals, scopes }
//!                        │
//!                        └── ScopeTracker (frames, local numbering)
//! ```
//!
//! - [`ScopeTracker`]: frame stack and dense local numbering
//! - [`LogicalPlanBuilder`]: lowers clauses into relational operators,
//!   synthesizes missing aliases, expands `SELECT *` and shapes DML batches
//!
//! ## Usage
//!
//! ```rust
//! use nested_sql_ir::ast::{Expr, Statement};
//! use nested_sql_ir::{Identifier, ProblemCollector, SourceLocation};
//! use nested_sql_planner::LogicalPlanBuilder;
//!
//! let statement = Statement::Query(Expr::var(
//!     Identifier::insensitive("orders"),
//!     SourceLocation::new(1, 1),
//! ));
//!
//! let mut problems = ProblemCollector::new();
//! let plan = LogicalPlanBuilder::new(&mut problems).build(&statement);
//! assert!(plan.locals.is_empty());
//! assert!(problems.is_empty());
//! ```

pub mod alias;
pub mod builder;
pub mod scope;

pub use builder::LogicalPlanBuilder;
pub use scope::ScopeTracker;
