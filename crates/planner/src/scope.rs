// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Scope tracking for the logical plan builder
//!
//! [`ScopeTracker`] owns the frame stack while one statement is built. It
//! hands out dense local indices and records every frame it opens in a
//! [`ScopeTree`], so the binding resolver can later replay what was visible
//! at each reference.

use tracing::trace;

use nested_sql_ir::{
    CaseSensitivity, FrameKind, Identifier, LocalDecl, ScopeId, ScopeTree,
};

/// Frame stack and local counter for one statement
///
/// The tracker starts with a [`FrameKind::Statement`] root frame that is never
/// popped.
///
/// # Examples
///
/// ```
/// use nested_sql_ir::{CaseSensitivity, FrameKind};
/// use nested_sql_planner::ScopeTracker;
///
/// let mut scopes = ScopeTracker::new();
/// let mark = scopes.depth();
/// scopes.push_frame(FrameKind::FromItem);
/// assert_eq!(scopes.declare("a", CaseSensitivity::Insensitive), 0);
/// assert_eq!(scopes.declare("b", CaseSensitivity::Insensitive), 1);
/// assert_eq!(scopes.current_frame().len(), 2);
///
/// scopes.pop_to(mark);
/// assert!(scopes.current_frame().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ScopeTracker {
    tree: ScopeTree,
    stack: Vec<ScopeId>,
    locals: Vec<LocalDecl>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        let mut tree = ScopeTree::new();
        let root = tree.add_frame(FrameKind::Statement, None);
        Self {
            tree,
            stack: vec![root],
            locals: Vec::new(),
        }
    }

    /// Declare a local in the current frame and return its index
    ///
    /// Duplicate names are not checked here.
    pub fn declare(&mut self, name: impl Into<String>, case: CaseSensitivity) -> u32 {
        let index = self.locals.len() as u32;
        let name = Identifier::new(name, case);
        trace!(name = %name, index, scope = self.current_scope().0, "Declared local");

        self.tree.add_local(self.current_scope(), index);
        self.locals.push(LocalDecl { name, index });
        index
    }

    /// Locals declared directly in the current frame, in declaration order
    pub fn current_frame(&self) -> Vec<LocalDecl> {
        self.tree
            .frame(self.current_scope())
            .map(|frame| {
                frame
                    .locals
                    .iter()
                    .filter_map(|index| self.locals.get(*index as usize).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Id of the innermost open frame
    pub fn current_scope(&self) -> ScopeId {
        // The root frame is never popped
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }

    /// Open a frame nested in the current one
    pub fn push_frame(&mut self, kind: FrameKind) -> ScopeId {
        let id = self.tree.add_frame(kind, Some(self.current_scope()));
        self.stack.push(id);
        id
    }

    /// Close the current frame; the root frame stays open
    pub fn pop_frame(&mut self) -> Option<ScopeId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Number of open frames, for use with [`ScopeTracker::pop_to`]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close frames until `depth` frames remain open
    pub fn pop_to(&mut self, depth: usize) {
        while self.stack.len() > depth.max(1) {
            self.stack.pop();
        }
    }

    /// Every local declared so far, ordered by index
    pub fn locals(&self) -> &[LocalDecl] {
        &self.locals
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    pub fn into_parts(self) -> (Vec<LocalDecl>, ScopeTree) {
        (self.locals, self.tree)
    }
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense_across_frames() {
        let mut scopes = ScopeTracker::new();
        scopes.push_frame(FrameKind::Query);
        scopes.push_frame(FrameKind::FromItem);
        assert_eq!(scopes.declare("a", CaseSensitivity::Insensitive), 0);
        assert_eq!(scopes.declare("b", CaseSensitivity::Insensitive), 1);
        scopes.push_frame(FrameKind::Query);
        scopes.push_frame(FrameKind::FromItem);
        assert_eq!(scopes.declare("c", CaseSensitivity::Sensitive), 2);

        let (locals, tree) = scopes.into_parts();
        assert_eq!(locals.len(), 3);
        assert_eq!(locals[2].name, Identifier::sensitive("c"));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_pop_frame_keeps_root() {
        let mut scopes = ScopeTracker::new();
        assert_eq!(scopes.pop_frame(), None);
        let id = scopes.push_frame(FrameKind::Let);
        assert_eq!(scopes.current_scope(), id);
        assert_eq!(scopes.pop_frame(), Some(id));
        assert_eq!(scopes.current_scope(), ScopeId(0));
    }

    #[test]
    fn test_current_frame_only_lists_own_locals() {
        let mut scopes = ScopeTracker::new();
        scopes.push_frame(FrameKind::FromItem);
        scopes.declare("a", CaseSensitivity::Insensitive);
        scopes.push_frame(FrameKind::FromItem);
        scopes.declare("b", CaseSensitivity::Insensitive);

        let frame = scopes.current_frame();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].index, 1);
    }

    #[test]
    fn test_pop_to_never_closes_root() {
        let mut scopes = ScopeTracker::new();
        scopes.push_frame(FrameKind::Query);
        scopes.push_frame(FrameKind::FromItem);
        scopes.pop_to(0);
        assert_eq!(scopes.depth(), 1);
    }
}
