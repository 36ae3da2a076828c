// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Static local lookup over the frame history of one statement

use nested_sql_ir::{Identifier, LocalDecl, ScopeId, ScopeTree};

/// Answers "which local does this name bind to" for references of one plan
#[derive(Debug, Clone, Copy)]
pub struct LocalLookup<'a> {
    scopes: &'a ScopeTree,
    locals: &'a [LocalDecl],
}

impl<'a> LocalLookup<'a> {
    pub fn new(scopes: &'a ScopeTree, locals: &'a [LocalDecl]) -> Self {
        Self { scopes, locals }
    }

    /// The local `name` statically binds to from `scope`
    ///
    /// Frames are searched nearest first, stopping after the enclosing query
    /// boundary. Within a frame the first declared match wins.
    pub fn find(&self, name: &Identifier, scope: ScopeId) -> Option<u32> {
        self.scopes.static_frames(scope).find_map(|frame| {
            frame
                .locals
                .iter()
                .copied()
                .find(|index| self.matches(*index, name))
        })
    }

    /// Every local visible from `scope`, outer queries included, nearest first
    pub fn candidates(&self, scope: ScopeId) -> Vec<u32> {
        self.scopes.visible_locals(scope)
    }

    fn matches(&self, index: u32, name: &Identifier) -> bool {
        self.locals
            .get(index as usize)
            .is_some_and(|local| name.matches(&local.name.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nested_sql_ir::{CaseSensitivity, FrameKind};

    fn local(name: &str, index: u32) -> LocalDecl {
        LocalDecl {
            name: Identifier::new(name, CaseSensitivity::Insensitive),
            index,
        }
    }

    /// `FROM a AS s AT S, b AS s` followed by a subquery declaring `x`
    fn sample() -> (ScopeTree, Vec<LocalDecl>, ScopeId, ScopeId) {
        let mut tree = ScopeTree::new();
        let root = tree.add_frame(FrameKind::Statement, None);
        let query = tree.add_frame(FrameKind::Query, Some(root));
        let first = tree.add_frame(FrameKind::FromItem, Some(query));
        tree.add_local(first, 0);
        tree.add_local(first, 1);
        let second = tree.add_frame(FrameKind::FromItem, Some(first));
        tree.add_local(second, 2);
        let sub = tree.add_frame(FrameKind::Query, Some(second));
        let sub_item = tree.add_frame(FrameKind::FromItem, Some(sub));
        tree.add_local(sub_item, 3);

        let locals = vec![local("s", 0), local("S", 1), local("s", 2), local("x", 3)];
        (tree, locals, first, sub_item)
    }

    #[test]
    fn test_first_declared_wins_within_frame() {
        let (tree, locals, first, _) = sample();
        let lookup = LocalLookup::new(&tree, &locals);
        assert_eq!(lookup.find(&Identifier::insensitive("S"), first), Some(0));
        assert_eq!(lookup.find(&Identifier::sensitive("S"), first), Some(1));
    }

    #[test]
    fn test_nearest_frame_wins() {
        let (tree, locals, first, _) = sample();
        let lookup = LocalLookup::new(&tree, &locals);
        let second = ScopeId(first.0 + 1);
        assert_eq!(lookup.find(&Identifier::insensitive("s"), second), Some(2));
    }

    #[test]
    fn test_outer_query_is_not_statically_visible() {
        let (tree, locals, _, sub_item) = sample();
        let lookup = LocalLookup::new(&tree, &locals);
        assert_eq!(lookup.find(&Identifier::insensitive("s"), sub_item), None);
        assert_eq!(lookup.find(&Identifier::insensitive("X"), sub_item), Some(3));
        assert_eq!(lookup.candidates(sub_item), vec![3, 2, 1, 0]);
    }
}
