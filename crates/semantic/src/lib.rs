// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Nested SQL - Semantic Analysis Layer
//!
//! Second compiler pass: binds every variable reference of a logical plan.
//!
//! ## Overview
//!
//! A reference binds to one of:
//! - **Global**: an entity the [`Catalog`](nested_sql_catalog::Catalog) knows
//! - **Local**: a variable declared by the query (FROM aliases, LET, GROUP BY)
//! - **Dynamic**: left for the runtime, with the locals it should try
//!
//! ```text
//! LogicalPlan ──→ BindingResolver ──→ ResolvedPlan
//!                   │        │
//!                   │        └── Catalog::lookup(name, case_sensitive)
//!                   └── LocalLookup (frame history from the planner)
//! ```
//!
//! Locals are searched nearest frame first and never across a subquery
//! boundary. Inside one frame the first declared local wins, so
//! `FROM t AS a AT "A"` binds a bare `a` to the `AS` local.
//!
//! Unresolvable references are reported as `UndefinedVariable` problems unless
//! undefined variables are allowed, in which case they become dynamic.

pub mod lookup;
pub mod resolver;

pub use lookup::LocalLookup;
pub use resolver::{resolve, BindingResolver};
