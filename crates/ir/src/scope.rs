// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Frame history
//!
//! While the logical plan builder declares locals it records every frame it
//! opens in a [`ScopeTree`]. Each unresolved reference remembers the frame that
//! was current at its position, so the binding resolver can replay the exact
//! visibility the builder saw without re-walking the syntax tree.
//!
//! ## Frame nesting
//!
//! ```text
//! Statement
//! └── Query                      SELECT ... FROM t AS a, a.kids AS k LET 1 AS one
//!     └── FromItem [a]
//!         └── FromItem [k]       (sees a: correlated join chain)
//!             └── Let [one]
//!                 └── Query      nested subquery: hides every outer frame
//! ```
//!
//! Later declarations are always nested inside earlier ones, so walking the
//! parent chain visits locals nearest-first.

use serde::{Deserialize, Serialize};

/// Identifier of a frame in a [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// What opened a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Root frame of a statement
    Statement,
    /// Subquery boundary; frames outside it are not statically visible
    Query,
    /// One FROM item (AS/AT/BY declarations)
    FromItem,
    /// One LET binding
    Let,
    /// GROUP BY keys and GROUP AS
    GroupBy,
    /// Source of a data-mutation statement
    DmlSource,
}

/// A recorded frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: FrameKind,
    /// Local indices declared directly in this frame, in declaration order
    pub locals: Vec<u32>,
}

impl Frame {
    pub fn is_query_boundary(&self) -> bool {
        matches!(self.kind, FrameKind::Query | FrameKind::Statement)
    }
}

/// All frames opened while building one statement
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScopeTree {
    frames: Vec<Frame>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new frame and return its id
    pub fn add_frame(&mut self, kind: FrameKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.frames.len() as u32);
        self.frames.push(Frame {
            id,
            parent,
            kind,
            locals: Vec::new(),
        });
        id
    }

    /// Attach a local index to a frame
    ///
    /// Unknown frame ids are ignored; ids are only minted by [`ScopeTree::add_frame`].
    pub fn add_local(&mut self, scope: ScopeId, index: u32) {
        if let Some(frame) = self.frames.get_mut(scope.0 as usize) {
            frame.locals.push(index);
        }
    }

    pub fn frame(&self, id: ScopeId) -> Option<&Frame> {
        self.frames.get(id.0 as usize)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterate a frame and its ancestors, nearest first
    pub fn ancestors(&self, id: ScopeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Frames whose locals can be bound statically from `id`: the chain up to
    /// and including the nearest query boundary
    pub fn static_frames(&self, id: ScopeId) -> impl Iterator<Item = &Frame> + '_ {
        let mut done = false;
        self.ancestors(id).take_while(move |frame| {
            if done {
                return false;
            }
            done = frame.is_query_boundary();
            true
        })
    }

    /// Every local visible from `id`, nearest frame first and last-declared
    /// first within a frame
    pub fn visible_locals(&self, id: ScopeId) -> Vec<u32> {
        self.ancestors(id)
            .flat_map(|frame| frame.locals.iter().rev().copied())
            .collect()
    }
}

/// Iterator over a frame chain, see [`ScopeTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a ScopeTree,
    next: Option<ScopeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Frame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.tree.frame(self.next?)?;
        self.next = frame.parent;
        Some(frame)
    }
}
