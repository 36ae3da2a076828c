// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Nested SQL - Physical Lowering
//!
//! Third compiler pass: resolved plan in, execution-ready plan out.
//!
//! - every relational operator gets an [`ImplTag`](nested_sql_ir::plan::ImplTag)
//! - DML operations become [`DmlCommand`](nested_sql_ir::plan::DmlCommand)
//!   records: `{ action, target_unique_id, rows }`
//!
//! ## Usage
//!
//! ```rust
//! use nested_sql_ir::plan::{Bexpr, BexprKind, Expr, Statement};
//! use nested_sql_ir::ResolvedPlan;
//! use nested_sql_physical::lower;
//!
//! let plan = ResolvedPlan {
//!     statement: Statement::Query(Expr::Query(Box::new(Bexpr::new(BexprKind::Unit)))),
//!     locals: Vec::new(),
//! };
//!
//! let physical = lower(plan).unwrap();
//! assert!(physical.statement.bexprs()[0].impl_tag.is_some());
//! ```

pub mod error;
pub mod lower;

pub use error::{PhysicalError, PhysicalResult};
pub use lower::{lower, PhysicalLowering};
