// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyboard focus within a frame.
//!
//! Every frame has at most one focused view. Focus changes always send
//! `focus_off` to the old view before `focus_on` reaches the new one, and the
//! frame's record already names the new view while both hooks run.

use super::id::{INVALID, ViewId};
use super::store::ViewTree;
use crate::error::TreeError;
use crate::trace::FocusKind;

impl ViewTree {
    /// Returns the focused view of `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAFrame`] if `frame` is not a frame.
    pub fn focused_view(&self, frame: ViewId) -> Result<Option<ViewId>, TreeError> {
        Ok(self.frame_data(frame)?.focused)
    }

    /// Moves `frame`'s focus to `view`, or clears it with `None`.
    ///
    /// Setting the view that is already focused does nothing. The view does
    /// not need the [`focusable`](super::ViewFlags::focusable) flag; that
    /// flag only steers click-to-focus and focus recovery.
    ///
    /// # Errors
    ///
    /// Fails if `frame` is not a frame or `view` is not inside it.
    pub fn set_focused_view(
        &mut self,
        frame: ViewId,
        view: Option<ViewId>,
    ) -> Result<(), TreeError> {
        let previous = self.frame_data(frame)?.focused;
        if let Some(v) = view {
            self.validate(v);
            if !self.is_ancestor_idx(frame.idx, v.idx) {
                return Err(TreeError::NotAChild {
                    parent: frame,
                    child: v,
                });
            }
        }
        if previous == view {
            return Ok(());
        }
        self.frame_data_mut(frame)?.focused = view;
        if let Some(old) = previous {
            self.notify_focus(frame, old, FocusKind::Off);
        }
        // The old view's hook may have moved focus elsewhere.
        if let Some(new) = view
            && self.frame[frame.idx as usize]
                .as_ref()
                .is_some_and(|f| f.focused == Some(new))
        {
            self.notify_focus(frame, new, FocusKind::On);
        }
        Ok(())
    }

    /// The nearest focusable view from `leaf` up to, but excluding, `frame`.
    pub(crate) fn focus_target(&self, frame: u32, leaf: u32) -> Option<ViewId> {
        let mut cur = leaf;
        while cur != INVALID && cur != frame {
            if self.flags[cur as usize].focusable {
                return Some(self.id_at(cur));
            }
            cur = self.parent[cur as usize];
        }
        None
    }
}
