// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Variable references and declarations
//!
//! A variable reference goes through exactly one transition:
//!
//! ```text
//!            ┌──> Global(unique_id)
//!            ├──> Local(index)
//! VarRef ────┼──> Dynamic { name, search_globals_first, candidate_locals }
//!            └──> Failed (Binding::resolved == None)
//! ```
//!
//! [`VarRef`] is the payload of the logical plan, [`Binding`] the payload of
//! the resolved and physical plans.

use serde::{Deserialize, Serialize};

use crate::ident::{Identifier, ScopeQualifier};
use crate::location::SourceLocation;
use crate::scope::ScopeId;

/// Where an unresolved reference sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefPosition {
    /// Any value position
    #[default]
    Expression,
    /// The whole source expression of a FROM item (`FROM t AS x`)
    FromSource,
    /// The target collection of a data-mutation operation
    DmlTarget,
}

/// Unresolved variable reference emitted by the logical plan builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarRef {
    pub name: Identifier,
    pub qualifier: ScopeQualifier,
    pub position: RefPosition,
    /// Frame that was current when the reference was lowered
    pub scope: ScopeId,
    pub location: SourceLocation,
}

/// Outcome of binding resolution for one reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedRef {
    /// Catalog entity
    Global(String),
    /// Local variable slot
    Local(u32),
    /// Left for the runtime to resolve per row
    Dynamic {
        name: Identifier,
        search_globals_first: bool,
        /// Every local visible at the reference, nearest scope first
        candidate_locals: Vec<u32>,
    },
}

/// Resolved variable reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub name: Identifier,
    /// `None` when resolution failed and a problem was reported
    pub resolved: Option<ResolvedRef>,
    pub location: SourceLocation,
}

impl Binding {
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// The catalog id, if this binding resolved to a global
    pub fn global_id(&self) -> Option<&str> {
        match &self.resolved {
            Some(ResolvedRef::Global(id)) => Some(id),
            _ => None,
        }
    }

    /// The local slot, if this binding resolved to a local
    pub fn local_index(&self) -> Option<u32> {
        match &self.resolved {
            Some(ResolvedRef::Local(index)) => Some(*index),
            _ => None,
        }
    }
}

/// A local declaration embedded in a plan operator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: Identifier,
    pub index: u32,
    pub location: SourceLocation,
}

impl VarDecl {
    pub fn to_local(&self) -> LocalDecl {
        LocalDecl {
            name: self.name.clone(),
            index: self.index,
        }
    }
}

/// Flat statement-level record of a declared local
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalDecl {
    pub name: Identifier,
    pub index: u32,
}
