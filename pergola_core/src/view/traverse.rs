// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, ViewId};
use super::store::ViewTree;

/// An iterator over the direct children of a view, bottom-most first.
///
/// Created by [`ViewTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a ViewTree,
    current: u32,
}

impl Iterator for Children<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator over the direct children of a view, top-most first.
///
/// This is hit-testing and dispatch order. Created by
/// [`ViewTree::children_rev`].
#[derive(Debug)]
pub struct ChildrenRev<'a> {
    tree: &'a ViewTree,
    current: u32,
}

impl Iterator for ChildrenRev<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.prev_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator over the strict ancestors of a view, innermost first.
///
/// Created by [`ViewTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a ViewTree,
    current: u32,
}

impl Iterator for Ancestors<'_> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.parent[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

impl ViewTree {
    /// Returns an iterator over the direct children of a view in paint order.
    #[must_use]
    pub fn children(&self, id: ViewId) -> Children<'_> {
        self.validate(id);
        Children {
            tree: self,
            current: self.first_child[id.idx as usize],
        }
    }

    /// Returns an iterator over the direct children of a view, top-most
    /// first.
    #[must_use]
    pub fn children_rev(&self, id: ViewId) -> ChildrenRev<'_> {
        self.validate(id);
        ChildrenRev {
            tree: self,
            current: self.last_child[id.idx as usize],
        }
    }

    /// Returns an iterator from the parent of `id` up to its root.
    #[must_use]
    pub fn ancestors(&self, id: ViewId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors {
            tree: self,
            current: self.parent[id.idx as usize],
        }
    }

    /// Returns the nearest frame that is `id` or one of its ancestors.
    #[must_use]
    pub fn frame_of(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        if self.frame[id.idx as usize].is_some() {
            return Some(id);
        }
        self.ancestors(id)
            .find(|a| self.frame[a.idx as usize].is_some())
    }

    /// Returns the window that is `id` or contains it.
    #[must_use]
    pub fn window_of(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        if self.window[id.idx as usize].is_some() {
            return Some(id);
        }
        self.ancestors(id)
            .find(|a| self.window[a.idx as usize].is_some())
    }
}
