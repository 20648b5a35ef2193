// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draining accumulated invalidation into a change set.
//!
//! Mutations mark [`dirty`](crate::dirty) channels as they happen;
//! [`ViewTree::collect_changes`] drains them:
//!
//! 1. **REFRESH**: drain affected indices (the marked views plus every
//!    ancestor reached by eager propagation), dropping slots freed since.
//! 2. **TOPOLOGY**: drain and reduce to a single flag.
//! 3. Move the added/destroyed lifecycle lists out.

use alloc::vec::Vec;

use super::id::ViewId;
use super::store::ViewTree;
use crate::dirty;

/// The changes accumulated since the previous [`ViewTree::collect_changes`].
#[derive(Clone, Debug, Default)]
pub struct TreeChanges {
    /// Views created since the last collect, in creation order. Some may
    /// already be destroyed again.
    pub added: Vec<ViewId>,
    /// Views destroyed since the last collect. These handles are stale.
    pub destroyed: Vec<ViewId>,
    /// Live views whose drawn content changed, directly or through a
    /// descendant.
    pub refreshed: Vec<ViewId>,
    /// Whether any insert, remove, create or destroy happened.
    pub topology_changed: bool,
}

impl TreeChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.added.clear();
        self.destroyed.clear();
        self.refreshed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.destroyed.is_empty()
            && self.refreshed.is_empty()
            && !self.topology_changed
    }
}

impl ViewTree {
    /// Drains every invalidation channel and returns what changed.
    pub fn collect_changes(&mut self) -> TreeChanges {
        let mut changes = TreeChanges::default();
        self.collect_changes_into(&mut changes);
        changes
    }

    /// Like [`collect_changes`](Self::collect_changes), but reuses a
    /// caller-provided buffer.
    pub fn collect_changes_into(&mut self, changes: &mut TreeChanges) {
        changes.clear();

        let refreshed: Vec<u32> = self
            .dirty
            .drain(dirty::REFRESH)
            .affected()
            .deterministic()
            .run()
            .collect();
        changes.refreshed.extend(
            refreshed
                .into_iter()
                .filter(|&idx| idx < self.len && self.live[idx as usize])
                .map(|idx| self.id_at(idx)),
        );

        let topology: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();
        changes.topology_changed = !topology.is_empty();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_destroyed, &mut changes.destroyed);
    }
}
