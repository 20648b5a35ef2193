// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The draw pass, offscreen frame buffers and nested stencil clipping.
//!
//! [`ViewTree::draw`] runs in three steps:
//!
//! 1. **Prepare** (mutable): drain changes, release queued buffers, flag
//!    every buffered frame whose subtree changed, and allocate or resize
//!    buffers. A failed allocation turns that frame into a direct draw.
//! 2. **Paint** (shared): walk the window depth-first, bottom-most child
//!    first. A buffered frame either composites its cached buffer or redraws
//!    into it first.
//! 3. **Finish** (mutable): clear refresh flags, record the stencil depth and
//!    emit composite trace events.
//!
//! ## Stencil nesting
//!
//! Clips nest through an integer depth. Pushing fills the clip shape into
//! the stencil with `Increment` while testing against the current depth, so
//! only pixels already inside every enclosing clip reach the new depth.
//! Popping fills the same shape with `Decrement` at the new depth. Draws in
//! between test for equality with the depth.
//!
//! An offscreen buffer has its own stencil plane, so a buffered frame starts
//! from depth zero and must end there. Unbalanced nesting trips a debug
//! assertion.

use alloc::vec::Vec;
use core::mem;

use kurbo::{Point, Rect, Size, Vec2};

use super::changes::TreeChanges;
use super::id::{INVALID, ViewId};
use super::store::ViewTree;
use crate::error::TreeError;
use crate::event::Response;
use crate::render::{
    BufferId, ClipShape, CompositeOutcome, Renderer, Rgba8, StencilOp, StencilState,
};
use crate::trace::CompositeTraceEvent;

/// What [`ViewTree::draw`] did.
#[derive(Clone, Debug, Default)]
pub struct DrawReport {
    /// The changes drained at the start of the pass.
    ///
    /// These cover the whole tree, not just the drawn window: with several
    /// windows, whichever draws first receives the others' changes too.
    /// Buffered frames of other windows still pick up their refresh marks.
    pub changes: TreeChanges,
    /// How each visible frame of the window was painted, bottom-most first.
    pub composites: Vec<(ViewId, CompositeOutcome)>,
}

impl DrawReport {
    /// Returns the outcome recorded for `frame`.
    #[must_use]
    pub fn outcome(&self, frame: ViewId) -> Option<CompositeOutcome> {
        self.composites
            .iter()
            .find(|(f, _)| *f == frame)
            .map(|&(_, outcome)| outcome)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Pushing,
    Popping,
}

/// Nested clip state over a stencil plane.
///
/// Every `begin_push`/`end_push` pair must be matched by a later
/// `begin_pop`/`end_pop` pair, innermost first.
#[derive(Clone, Debug)]
pub struct StencilStack {
    depth: u32,
    shapes: Vec<ClipShape>,
    phase: Phase,
    max_depth: u32,
}

impl StencilStack {
    /// Creates an empty stack for a stencil plane holding values up to
    /// `max_depth`.
    #[must_use]
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            shapes: Vec::new(),
            phase: Phase::Idle,
            max_depth,
        }
    }

    /// The current nesting depth, never above the stack's `max_depth`.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Starts pushing `shape`: fills it into the stencil, incrementing only
    /// where the current depth is reached.
    pub fn begin_push(&mut self, renderer: &mut dyn Renderer, shape: ClipShape) {
        debug_assert_eq!(self.phase, Phase::Idle, "begin_push inside another stencil step");
        self.phase = Phase::Pushing;
        renderer.set_stencil(StencilState {
            enabled: true,
            reference: self.depth,
            op: StencilOp::Increment,
        });
        renderer.fill_stencil(&shape);
        self.shapes.push(shape);
    }

    /// Finishes a push. Subsequent fills are clipped to the new depth.
    pub fn end_push(&mut self, renderer: &mut dyn Renderer) {
        debug_assert_eq!(self.phase, Phase::Pushing, "end_push without begin_push");
        self.phase = Phase::Idle;
        debug_assert!(
            self.depth < self.max_depth,
            "clip nesting exceeds the stencil range ({})",
            self.max_depth
        );
        self.depth = self.nesting();
        self.apply(renderer);
    }

    /// Starts popping the innermost clip: fills its shape with `Decrement`.
    pub fn begin_pop(&mut self, renderer: &mut dyn Renderer) {
        debug_assert_eq!(self.phase, Phase::Idle, "begin_pop inside another stencil step");
        debug_assert!(!self.shapes.is_empty(), "stencil pop without a matching push");
        self.phase = Phase::Popping;
        if let Some(shape) = self.shapes.last() {
            renderer.set_stencil(StencilState {
                enabled: true,
                reference: self.depth,
                op: StencilOp::Decrement,
            });
            renderer.fill_stencil(shape);
        }
    }

    /// Finishes a pop. Never goes below zero.
    pub fn end_pop(&mut self, renderer: &mut dyn Renderer) {
        debug_assert_eq!(self.phase, Phase::Popping, "end_pop without begin_pop");
        self.phase = Phase::Idle;
        self.shapes.pop();
        self.depth = self.nesting();
        self.apply(renderer);
    }

    /// Open clips, clamped to what the stencil plane can hold.
    fn nesting(&self) -> u32 {
        u32::try_from(self.shapes.len())
            .unwrap_or(u32::MAX)
            .min(self.max_depth)
    }

    /// Re-sends the stencil state matching the current depth.
    pub fn apply(&self, renderer: &mut dyn Renderer) {
        if self.depth == 0 {
            renderer.set_stencil(StencilState::DISABLED);
        } else {
            renderer.set_stencil(StencilState {
                enabled: true,
                reference: self.depth,
                op: StencilOp::Keep,
            });
        }
    }
}

/// How a frame is painted in this pass.
#[derive(Clone, Copy, Debug)]
enum Plan {
    Cached(BufferId),
    Refresh(BufferId),
    Fallback,
}

/// Drawing context handed to the draw hooks of one view.
///
/// Shapes passed in are in the view's local coordinates; the context
/// translates them to the current target.
pub struct DrawCx<'a> {
    tree: &'a ViewTree,
    renderer: &'a mut dyn Renderer,
    stencil: StencilStack,
    plans: &'a [(u32, Plan)],
    origin: Vec2,
    id: ViewId,
}

impl core::fmt::Debug for DrawCx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawCx")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .field("stencil", &self.stencil)
            .finish_non_exhaustive()
    }
}

impl<'a> DrawCx<'a> {
    /// The view being drawn.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The tree being drawn.
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &'a ViewTree {
        self.tree
    }

    /// The view's size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.tree.size[self.id.idx as usize]
    }

    /// The view's rectangle in the current target.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO + self.origin, self.size())
    }

    /// The view's outline (honoring round corners) in the current target.
    #[must_use]
    pub fn shape(&self) -> ClipShape {
        self.tree.shape_at(self.id.idx).translated(self.origin)
    }

    /// Fills the view's outline.
    pub fn fill(&mut self, color: Rgba8) {
        let shape = self.shape();
        self.renderer.fill(&shape, color);
    }

    /// Fills a shape given in local coordinates.
    pub fn fill_shape(&mut self, shape: &ClipShape, color: Rgba8) {
        self.renderer.fill(&shape.translated(self.origin), color);
    }

    /// Direct access to the backend.
    pub fn renderer(&mut self) -> &mut dyn Renderer {
        &mut *self.renderer
    }

    /// The current clip nesting depth.
    #[must_use]
    pub fn stencil_depth(&self) -> u32 {
        self.stencil.depth()
    }

    /// Clips subsequent drawing to `shape` (local coordinates) until the
    /// matching [`pop_clip`](Self::pop_clip).
    pub fn push_clip(&mut self, shape: ClipShape) {
        self.begin_push_stencil(shape);
        self.end_push_stencil();
    }

    /// Removes the innermost clip.
    pub fn pop_clip(&mut self) {
        self.begin_pop_stencil();
        self.end_pop_stencil();
    }

    /// First half of [`push_clip`](Self::push_clip). Fills issued before
    /// [`end_push_stencil`](Self::end_push_stencil) draw into the stencil.
    pub fn begin_push_stencil(&mut self, shape: ClipShape) {
        self.stencil
            .begin_push(self.renderer, shape.translated(self.origin));
    }

    /// Second half of [`push_clip`](Self::push_clip).
    pub fn end_push_stencil(&mut self) {
        self.stencil.end_push(self.renderer);
    }

    /// First half of [`pop_clip`](Self::pop_clip).
    pub fn begin_pop_stencil(&mut self) {
        self.stencil.begin_pop(self.renderer);
    }

    /// Second half of [`pop_clip`](Self::pop_clip).
    pub fn end_pop_stencil(&mut self) {
        self.stencil.end_pop(self.renderer);
    }

    /// Draws every visible child, bottom-most first.
    ///
    /// Only needed from a [`Widget::draw`](crate::widget::Widget::draw) that
    /// returns [`Response::Finish`], typically to wrap the children in a clip.
    pub fn draw_children(&mut self) {
        let tree = self.tree;
        let parent = self.id.idx;
        let base = self.origin + tree.offset[parent as usize];
        let mut child = tree.first_child[parent as usize];
        while child != INVALID {
            let origin = base + tree.position[child as usize].to_vec2();
            self.draw_view(child, origin);
            child = tree.next_sibling[child as usize];
        }
    }

    fn draw_view(&mut self, idx: u32, origin: Vec2) {
        let tree = self.tree;
        if !tree.visible[idx as usize] {
            return;
        }
        match self.plan(idx) {
            Some(Plan::Cached(buffer)) => {
                let dest = Rect::from_origin_size(Point::ZERO + origin, tree.size[idx as usize]);
                self.renderer.composite_buffer(buffer, dest);
            }
            Some(Plan::Refresh(buffer)) => {
                self.renderer.begin_buffer(buffer);
                let max_depth = self.stencil.max_depth;
                let outer = mem::replace(&mut self.stencil, StencilStack::new(max_depth));
                self.stencil.apply(self.renderer);
                self.draw_content(idx, Vec2::ZERO);
                debug_assert_eq!(
                    self.stencil.depth(),
                    0,
                    "unbalanced stencil nesting in offscreen pass"
                );
                self.stencil = outer;
                self.renderer.end_buffer(buffer);
                self.stencil.apply(self.renderer);
                let dest = Rect::from_origin_size(Point::ZERO + origin, tree.size[idx as usize]);
                self.renderer.composite_buffer(buffer, dest);
            }
            Some(Plan::Fallback) | None => self.draw_content(idx, origin),
        }
    }

    fn draw_content(&mut self, idx: u32, origin: Vec2) {
        let tree = self.tree;
        let Some(widget) = tree.widget_ref(idx) else {
            return;
        };
        let saved = (self.id, self.origin);
        self.id = tree.id_at(idx);
        self.origin = origin;

        if widget.pre_draw(self) {
            if widget.draw(self) == Response::Ignore {
                self.draw_children();
            }
            widget.post_draw(self);
        }

        (self.id, self.origin) = saved;
    }

    fn plan(&self, idx: u32) -> Option<Plan> {
        self.plans
            .iter()
            .find(|(frame, _)| *frame == idx)
            .map(|&(_, plan)| plan)
    }
}

impl ViewTree {
    /// Draws `window` through `renderer`.
    ///
    /// Buffered frames re-render into their offscreen buffer only when
    /// something inside them changed since the last draw; otherwise their
    /// cached buffer is composited. Buffers queued for release by
    /// [`destroy`](Self::destroy) and
    /// [`disable_view_buffer`](Self::disable_view_buffer) are freed first,
    /// whichever window they belonged to, so windows sharing a tree must
    /// share a renderer's buffer namespace.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn draw(
        &mut self,
        window: ViewId,
        renderer: &mut dyn Renderer,
    ) -> Result<DrawReport, TreeError> {
        let max_depth = self.window_data(window)?.config.max_stencil_depth;
        let changes = self.collect_changes();

        for buffer in self.pending_released_buffers.drain(..) {
            renderer.release_buffer(buffer);
        }
        for id in &changes.refreshed {
            if let Some(buffer) = self.frame[id.idx as usize]
                .as_mut()
                .and_then(|f| f.buffer.as_mut())
            {
                buffer.refresh = true;
            }
        }

        let (plans, composites) = self.prepare_buffers(window.idx, renderer);

        let depth = {
            let mut cx = DrawCx {
                tree: self,
                renderer,
                stencil: StencilStack::new(max_depth),
                plans: &plans,
                origin: Vec2::ZERO,
                id: window,
            };
            cx.draw_content(window.idx, Vec2::ZERO);
            let depth = cx.stencil.depth();
            if depth != 0 {
                cx.renderer.set_stencil(StencilState::DISABLED);
            }
            depth
        };
        debug_assert_eq!(depth, 0, "unbalanced stencil nesting in window pass");

        for &(idx, plan) in &plans {
            if let Plan::Refresh(_) = plan
                && let Some(buffer) = self.frame[idx as usize]
                    .as_mut()
                    .and_then(|f| f.buffer.as_mut())
            {
                buffer.refresh = false;
            }
        }
        self.window_data_mut(window)?.stencil_count = depth;
        for &(frame, outcome) in &composites {
            self.tracer.composite(&CompositeTraceEvent { frame, outcome });
        }

        Ok(DrawReport {
            changes,
            composites,
        })
    }

    /// Allocates buffers for the visible frames of `window` and decides how
    /// each one is painted.
    fn prepare_buffers(
        &mut self,
        window: u32,
        renderer: &mut dyn Renderer,
    ) -> (Vec<(u32, Plan)>, Vec<(ViewId, CompositeOutcome)>) {
        let mut plans = Vec::new();
        let mut composites = Vec::new();
        let mut cur = self.first_child[window as usize];
        while cur != INVALID {
            let i = cur as usize;
            let next = self.next_sibling[i];
            let size = self.size[i];
            let id = self.id_at(cur);
            let visible = self.visible[i];
            let Some(data) = self.frame[i].as_mut() else {
                cur = next;
                continue;
            };
            if !visible {
                cur = next;
                continue;
            }
            let Some(buffer) = data.buffer.as_mut() else {
                composites.push((id, CompositeOutcome::Direct));
                cur = next;
                continue;
            };

            if buffer.handle.is_none() || buffer.size != size {
                if let Some(old) = buffer.handle.take() {
                    renderer.release_buffer(old);
                }
                buffer.refresh = true;
                if size.width > 0.0
                    && size.height > 0.0
                    && let Ok(handle) = renderer.create_buffer(size)
                {
                    buffer.handle = Some(handle);
                    buffer.size = size;
                }
            }

            let (plan, outcome) = match buffer.handle {
                Some(handle) if buffer.refresh => (Plan::Refresh(handle), CompositeOutcome::Refreshed),
                Some(handle) => (Plan::Cached(handle), CompositeOutcome::Cached),
                None => (Plan::Fallback, CompositeOutcome::Fallback),
            };
            plans.push((cur, plan));
            composites.push((id, outcome));
            cur = next;
        }
        (plans, composites)
    }
}
