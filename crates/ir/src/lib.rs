// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Nested SQL - Intermediate Representation
//!
//! This crate holds every tree and record exchanged between the compiler passes
//! for a SQL-like query language over nested, schemaless data.
//!
//! ## Pipeline
//!
//! ```text
//! ast::Statement → LogicalPlan → ResolvedPlan → PhysicalPlan
//!     (parser)      (planner)     (semantic)     (physical)
//! ```
//!
//! - [`ast`]: the syntax tree handed over by an external parser
//! - [`plan`]: one generic plan shape shared by all three passes. The type
//!   parameter is the payload of a variable reference: [`VarRef`] before
//!   binding resolution, [`Binding`] afterwards
//! - [`scope`]: the frame history recorded while locals are declared
//! - [`problem`]: structured diagnostics and the per-compilation
//!   [`ProblemCollector`]
//!
//! ## Design
//!
//! Every tree is a closed enum per node category (scalar, relational,
//! statement), so adding a node kind is a compile error in every pass until it
//! is handled. Trees are built once per pass and never mutated in place.

pub mod ast;
pub mod binding;
pub mod ident;
pub mod location;
pub mod operators;
pub mod plan;
pub mod problem;
pub mod scope;
pub mod visit;

// Re-export commonly used types
pub use binding::{Binding, LocalDecl, RefPosition, ResolvedRef, VarDecl, VarRef};
pub use ident::{CaseSensitivity, Identifier, ScopeQualifier};
pub use location::SourceLocation;
pub use operators::{
    BinaryOp, CollectionKind, JoinKind, Literal, NullsOrder, SetOpKind, SetQuantifier,
    SortOrder, UnaryOp,
};
pub use plan::{
    Bexpr, BexprKind, DmlAction, DmlCommand, DmlOperation, ImplTag, LogicalPlan,
    LogicalStatement, PhysicalPlan, PhysicalStatement, ResolvedPlan, ResolvedStatement,
};
pub use problem::{Problem, ProblemCollector, ProblemDetails, ProblemSeverity};
pub use scope::{Frame, FrameKind, ScopeId, ScopeTree};
