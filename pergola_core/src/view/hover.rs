// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-testing and hover tracking.
//!
//! Each frame tracks a hover chain: the path of views from just below the
//! frame down to the deepest visible view under the cursor. The window tracks
//! which frame is hovered.
//!
//! ## Lookup
//!
//! [`find_view_under_cursor`](ViewTree::find_view_under_cursor) is the
//! reference: starting at the frame it tests children top-most first,
//! converting the point into each child's space (minus the parent's scroll
//! offset and the child's position), takes the first visible child whose
//! widget contains it, and repeats inside that child.
//!
//! [`recheck_view_under_cursor`](ViewTree::recheck_view_under_cursor) reuses
//! the cached chain. It walks the chain from the top and keeps each level
//! while the view is still visible, still contains the point, and no later
//! sibling contains it either. From the deepest kept view it descends like
//! the full scan. Those three conditions are exactly what makes the full scan
//! pick that view at that level, so both always agree.
//!
//! ## Transitions
//!
//! Switching from an old chain to a new one sends `hover_out` to the views
//! only in the old chain, innermost first, then `hover_in` to the views only
//! in the new chain, outermost first. Views in the shared prefix hear
//! nothing.

use alloc::vec::Vec;

use kurbo::Point;

use super::id::{INVALID, ViewId};
use super::store::ViewTree;
use crate::config::HoverRecheck;
use crate::error::TreeError;

impl ViewTree {
    /// Returns the deepest visible view of `frame` under `position` (window
    /// coordinates), scanning from the top.
    ///
    /// Returns `None` if the point is outside the frame or hits no child.
    #[must_use]
    pub fn find_view_under_cursor(&self, frame: ViewId, position: Point) -> Option<ViewId> {
        self.validate(frame);
        let local = position - self.origin_vec(frame.idx);
        self.scan_path(frame.idx, local)
            .last()
            .map(|&idx| self.id_at(idx))
    }

    /// Like [`find_view_under_cursor`](Self::find_view_under_cursor), but
    /// starts from `frame`'s current hover chain.
    #[must_use]
    pub fn recheck_view_under_cursor(&self, frame: ViewId, position: Point) -> Option<ViewId> {
        self.validate(frame);
        let local = position - self.origin_vec(frame.idx);
        self.recheck_path(frame.idx, local)
            .last()
            .map(|&idx| self.id_at(idx))
    }

    /// Returns the deepest view of `frame`'s hover chain.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAFrame`] if `frame` is not a frame.
    pub fn hovered_view(&self, frame: ViewId) -> Result<Option<ViewId>, TreeError> {
        Ok(self.frame_data(frame)?.hovered)
    }

    /// Moves the window's hover state to `position`.
    ///
    /// Updates the hovered frame, clears the hover chain of every other
    /// frame, and updates the hovered frame's chain using the window's
    /// [`HoverRecheck`] strategy. Dispatching a mouse move does this
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn update_hover(&mut self, window: ViewId, position: Point) -> Result<(), TreeError> {
        let data = self.window_data_mut(window)?;
        data.cursor = Some(position);
        let strategy = data.config.hover;
        let old_frame = data.hovered_frame;

        let new_frame = self.frame_at(window.idx, position);

        // Frames other than the hovered one have no hover chain.
        let frames: Vec<ViewId> = self
            .children(window)
            .filter(|f| Some(*f) != new_frame && self.frame[f.idx as usize].is_some())
            .collect();
        for frame in frames {
            if self.is_alive(frame) {
                self.set_hover_path(frame, Vec::new(), position);
            }
        }

        if old_frame != new_frame {
            self.window_data_mut(window)?.hovered_frame = new_frame;
            if let Some(old) = old_frame {
                self.notify_hover_out(window, &[old], position);
            }
            if let Some(new) = new_frame {
                self.notify_hover_in(window, &[new], position);
            }
        }

        if let Some(frame) = new_frame
            && self.is_alive(frame)
            && self.parent[frame.idx as usize] == window.idx
        {
            let local = position - self.origin_vec(frame.idx);
            let path = match strategy {
                HoverRecheck::Incremental => self.recheck_path(frame.idx, local),
                HoverRecheck::FullScan => self.scan_path(frame.idx, local),
            };
            self.set_hover_path(frame, path, position);
        }
        Ok(())
    }

    /// Re-runs hover tracking at the window's last known cursor position.
    ///
    /// Call after programmatic tree changes (moving, hiding, inserting views)
    /// to bring hover state up to date without waiting for the next pointer
    /// move.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn refresh_hover(&mut self, window: ViewId) -> Result<(), TreeError> {
        match self.window_data(window)?.cursor {
            Some(position) => self.update_hover(window, position),
            None => Ok(()),
        }
    }

    /// The top-most visible frame of `window` containing `position`.
    pub(crate) fn frame_at(&self, window: u32, position: Point) -> Option<ViewId> {
        let mut cur = self.last_child[window as usize];
        while cur != INVALID {
            let i = cur as usize;
            if self.frame[i].is_some() && self.visible[i] {
                let local = position - self.origin_vec(cur);
                if self.contains_at(cur, local) {
                    return Some(self.id_at(cur));
                }
            }
            cur = self.prev_sibling[i];
        }
        None
    }

    /// Full top-down scan. Returns the hover chain, outermost first.
    pub(crate) fn scan_path(&self, frame: u32, local: Point) -> Vec<u32> {
        let mut path = Vec::new();
        if self.visible[frame as usize] && self.contains_at(frame, local) {
            self.descend(frame, local, &mut path);
        }
        path
    }

    /// Incremental re-check against the frame's cached chain.
    pub(crate) fn recheck_path(&self, frame: u32, local: Point) -> Vec<u32> {
        let previous = self.frame[frame as usize]
            .as_ref()
            .and_then(|f| f.hovered)
            .filter(|&h| self.is_alive(h) && self.is_ancestor_idx(frame, h.idx));
        let Some(previous) = previous else {
            // Nothing cached, or the cached view left the frame.
            return self.scan_path(frame, local);
        };
        if !self.visible[frame as usize] || !self.contains_at(frame, local) {
            return Vec::new();
        }

        let mut cached: Vec<u32> = self
            .hover_chain(frame, previous.idx)
            .into_iter()
            .map(|id| id.idx)
            .collect();
        cached.reverse();

        let mut path = Vec::with_capacity(cached.len());
        let mut container = frame;
        let mut point = local;
        for idx in cached {
            let inner = point - self.offset[container as usize];
            let p = inner - self.position[idx as usize].to_vec2();
            if !self.visible[idx as usize]
                || !self.contains_at(idx, p)
                || self.occluded(idx, inner)
            {
                break;
            }
            path.push(idx);
            container = idx;
            point = p;
        }
        self.descend(container, point, &mut path);

        debug_assert_eq!(
            path,
            self.scan_path(frame, local),
            "incremental hover re-check diverged from a full scan"
        );
        path
    }

    /// Appends the chain below `container` hit by `local` (in
    /// `container`'s coordinates).
    fn descend(&self, container: u32, local: Point, path: &mut Vec<u32>) {
        let mut container = container;
        let mut local = local;
        'levels: loop {
            let inner = local - self.offset[container as usize];
            let mut child = self.last_child[container as usize];
            while child != INVALID {
                let i = child as usize;
                if self.visible[i] {
                    let p = inner - self.position[i].to_vec2();
                    if self.contains_at(child, p) {
                        path.push(child);
                        container = child;
                        local = p;
                        continue 'levels;
                    }
                }
                child = self.prev_sibling[i];
            }
            return;
        }
    }

    /// Whether a later (higher) sibling of `idx` is hit by `inner`, given in
    /// the parent's content coordinates.
    fn occluded(&self, idx: u32, inner: Point) -> bool {
        let mut sibling = self.next_sibling[idx as usize];
        while sibling != INVALID {
            let i = sibling as usize;
            if self.visible[i] && self.contains_at(sibling, inner - self.position[i].to_vec2()) {
                return true;
            }
            sibling = self.next_sibling[i];
        }
        false
    }

    /// Replaces `frame`'s hover chain with `new` (outermost first) and sends
    /// the transition notifications.
    pub(crate) fn set_hover_path(&mut self, frame: ViewId, new: Vec<u32>, position: Point) {
        let leaf = new.last().map(|&idx| self.id_at(idx));
        let Some(data) = self.frame[frame.idx as usize].as_mut() else {
            return;
        };
        let previous = core::mem::replace(&mut data.hovered, leaf);

        let mut old: Vec<u32> = match previous {
            Some(h) if self.is_alive(h) && self.is_ancestor_idx(frame.idx, h.idx) => self
                .hover_chain(frame.idx, h.idx)
                .into_iter()
                .map(|id| id.idx)
                .collect(),
            _ => Vec::new(),
        };
        old.reverse();

        let common = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let leaving: Vec<ViewId> = old[common..].iter().rev().map(|&i| self.id_at(i)).collect();
        let entering: Vec<ViewId> = new[common..].iter().map(|&i| self.id_at(i)).collect();
        self.notify_hover_out(frame, &leaving, position);
        self.notify_hover_in(frame, &entering, position);
    }
}
