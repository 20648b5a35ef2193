// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays view storage with allocation, topology and destruction.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::ops::{Deref, DerefMut};

use kurbo::{Point, Size, Vec2};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::deferred::Deferred;
use super::frame::{FrameData, WindowData};
use super::geometry::RoundCorners;
use super::id::{INVALID, ViewId};
use crate::dirty;
use crate::error::TreeError;
use crate::event::HoverEvent;
use crate::render::BufferId;
use crate::trace::{FocusKind, FocusTraceEvent, HoverKind, HoverTraceEvent, TraceSink, Tracer};
use crate::widget::Widget;

/// Per-view configuration flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewFlags {
    /// Whether the view can receive keyboard focus.
    ///
    /// Ignored for frames, whose window-level focus follows
    /// [`FrameFlags::focusable`](super::FrameFlags::focusable).
    pub focusable: bool,
    /// Whether the view is owned by its parent and destroyed with it.
    ///
    /// Unmanaged views are detached, not destroyed, when their parent goes
    /// away; their owner must destroy them explicitly.
    pub managed: bool,
    /// Whether the view draws with an embossed look. Interpreted by widgets.
    pub emboss: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            focusable: false,
            managed: true,
            emboss: false,
        }
    }
}

/// Interaction state bits maintained by the hover engine, the focus manager
/// and pointer capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ViewState {
    /// The view is on its frame's hover chain (or, for a frame, is the
    /// window's hovered frame).
    pub hovered: bool,
    /// The view is its frame's focused view (or, for a frame, the window's
    /// focused frame).
    pub focused: bool,
    /// The view holds pointer capture.
    pub pressed: bool,
}

/// Struct-of-arrays storage for every view of every window.
///
/// Views are addressed by [`ViewId`] handles. Each view occupies a slot in
/// parallel arrays; destroyed views are recycled through a free list and
/// generation counters turn old handles stale.
#[derive(Debug)]
pub struct ViewTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) subview_count: Vec<u32>,

    // -- Geometry --
    pub(crate) position: Vec<Point>,
    pub(crate) offset: Vec<Vec2>,
    pub(crate) size: Vec<Size>,
    pub(crate) visible: Vec<bool>,

    // -- Flags and state --
    pub(crate) flags: Vec<ViewFlags>,
    pub(crate) state: Vec<ViewState>,
    pub(crate) round: Vec<RoundCorners>,
    pub(crate) corner_radius: Vec<f64>,

    // -- Payloads --
    pub(crate) widget: Vec<Option<Box<dyn Widget>>>,
    pub(crate) frame: Vec<Option<FrameData>>,
    pub(crate) window: Vec<Option<Box<WindowData>>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<ViewId>,
    pub(crate) pending_destroyed: Vec<ViewId>,
    pub(crate) pending_released_buffers: Vec<BufferId>,
    pub(crate) deferred: Vec<Deferred>,

    pub(crate) tracer: Tracer,
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            subview_count: Vec::new(),
            position: Vec::new(),
            offset: Vec::new(),
            size: Vec::new(),
            visible: Vec::new(),
            flags: Vec::new(),
            state: Vec::new(),
            round: Vec::new(),
            corner_radius: Vec::new(),
            widget: Vec::new(),
            frame: Vec::new(),
            window: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
            pending_destroyed: Vec::new(),
            pending_released_buffers: Vec::new(),
            deferred: Vec::new(),
            tracer: Tracer::none(),
        }
    }

    /// Installs a trace sink. Events are only delivered with the `trace`
    /// feature enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Removes the installed trace sink, if any.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.take()
    }

    // -- Allocation API --

    /// Creates a detached, visible view of zero size driven by `widget`.
    pub fn create_view<W: Widget>(&mut self, widget: W) -> ViewId {
        self.alloc(Box::new(widget))
    }

    pub(crate) fn alloc(&mut self, widget: Box<dyn Widget>) -> ViewId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Generation was already bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.subview_count[i] = 0;
            self.position[i] = Point::ZERO;
            self.offset[i] = Vec2::ZERO;
            self.size[i] = Size::ZERO;
            self.visible[i] = true;
            self.flags[i] = ViewFlags::default();
            self.state[i] = ViewState::default();
            self.round[i] = RoundCorners::NONE;
            self.corner_radius[i] = 0.0;
            self.widget[i] = Some(widget);
            self.frame[i] = None;
            self.window[i] = None;
            self.live[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.subview_count.push(0);
            self.position.push(Point::ZERO);
            self.offset.push(Vec2::ZERO);
            self.size.push(Size::ZERO);
            self.visible.push(true);
            self.flags.push(ViewFlags::default());
            self.state.push(ViewState::default());
            self.round.push(RoundCorners::NONE);
            self.corner_radius.push(0.0);
            self.widget.push(Some(widget));
            self.frame.push(None);
            self.window.push(None);
            self.generation.push(0);
            self.live.push(true);
            idx
        };

        let id = self.id_at(idx);
        self.pending_added.push(id);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        id
    }

    /// Returns whether the given handle refers to a live view.
    #[must_use]
    pub fn is_alive(&self, id: ViewId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.live[id.idx as usize]
    }

    /// Destroys `id`, its managed descendants, and releases every hover,
    /// focus and capture reference into the subtree.
    ///
    /// Unmanaged children are detached and survive as roots. If `id` is a
    /// frame with an offscreen buffer, the buffer is released on the next
    /// [`draw`](Self::draw).
    ///
    /// Focus lost this way moves to the closest preceding focusable sibling
    /// of `id`, if there is one.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: ViewId) {
        self.validate(id);
        self.release_tracking(id);
        // Focus and hover hooks may have destroyed it already.
        if !self.is_alive(id) {
            return;
        }
        if self.parent[id.idx as usize] != INVALID {
            self.unlink_from_parent(id.idx);
        }
        self.destroy_detached(id.idx);
    }

    // -- Topology API --

    /// Inserts `child` into `parent` at `index` (clamped to the child count).
    ///
    /// Index 0 is the bottom of the paint order; the last child is drawn on
    /// top and hit-tested first. Inserting does not trigger layout; callers
    /// that need it issue a resize.
    ///
    /// # Errors
    ///
    /// Fails without changing the tree if `child == parent`, if `child` is
    /// already attached, or if `child` is an ancestor of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn insert(&mut self, parent: ViewId, index: usize, child: ViewId) -> Result<(), TreeError> {
        self.validate(parent);
        self.validate(child);
        self.check_insert(parent, child)?;

        let mut before = self.first_child[parent.idx as usize];
        let mut i = 0;
        while before != INVALID && i < index {
            before = self.next_sibling[before as usize];
            i += 1;
        }
        self.link_before(parent.idx, child.idx, before);
        Ok(())
    }

    /// Inserts `child` as the bottom-most child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn push_front(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        self.insert(parent, 0, child)
    }

    /// Inserts `child` as the top-most child of `parent`.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn push_back(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        self.validate(parent);
        self.validate(child);
        self.check_insert(parent, child)?;
        self.link_before(parent.idx, child.idx, INVALID);
        Ok(())
    }

    /// Detaches `child` from `parent` without destroying it.
    ///
    /// Hover, focus and capture references into the detached subtree are
    /// released first, exactly as for [`destroy`](Self::destroy).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAChild`] if `child`'s parent is not `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove(&mut self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return Err(TreeError::NotAChild { parent, child });
        }
        self.release_tracking(child);
        if self.is_alive(child) && self.parent[child.idx as usize] == parent.idx {
            self.unlink_from_parent(child.idx);
        }
        Ok(())
    }

    /// Removes every child of `parent`: managed children are destroyed,
    /// unmanaged ones are detached.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn clear_children(&mut self, parent: ViewId) {
        self.validate(parent);
        let children: Vec<ViewId> = self.children(parent).collect();
        for child in children {
            if !self.is_alive(child) || self.parent[child.idx as usize] != parent.idx {
                continue;
            }
            if self.flags[child.idx as usize].managed {
                self.destroy(child);
            } else {
                // Just checked that `parent` owns it.
                let _ = self.remove(parent, child);
            }
        }
    }

    // -- Navigation --

    /// Returns the parent of a view, if attached.
    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.opt_id(self.parent[id.idx as usize])
    }

    /// Returns the bottom-most child.
    #[must_use]
    pub fn first_child(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.opt_id(self.first_child[id.idx as usize])
    }

    /// Returns the top-most child.
    #[must_use]
    pub fn last_child(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.opt_id(self.last_child[id.idx as usize])
    }

    /// Returns the sibling drawn immediately above this view.
    #[must_use]
    pub fn next_sibling(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.opt_id(self.next_sibling[id.idx as usize])
    }

    /// Returns the sibling drawn immediately below this view.
    #[must_use]
    pub fn previous_sibling(&self, id: ViewId) -> Option<ViewId> {
        self.validate(id);
        self.opt_id(self.prev_sibling[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn subview_count(&self, id: ViewId) -> usize {
        self.validate(id);
        self.subview_count[id.idx as usize] as usize
    }

    /// Returns the position of `child` among its siblings, bottom-most first.
    #[must_use]
    pub fn index_of(&self, child: ViewId) -> Option<usize> {
        self.validate(child);
        let mut i = 0;
        let mut cur = self.prev_sibling[child.idx as usize];
        if self.parent[child.idx as usize] == INVALID {
            return None;
        }
        while cur != INVALID {
            i += 1;
            cur = self.prev_sibling[cur as usize];
        }
        Some(i)
    }

    /// Returns whether `ancestor` is a strict ancestor of `view`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: ViewId, view: ViewId) -> bool {
        self.validate(ancestor);
        self.validate(view);
        self.is_ancestor_idx(ancestor.idx, view.idx)
    }

    // -- Flags and state --

    /// Returns the configuration flags of a view.
    #[must_use]
    pub fn flags(&self, id: ViewId) -> ViewFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Replaces the configuration flags of a view.
    pub fn set_flags(&mut self, id: ViewId, flags: ViewFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
        self.dirty.mark_with(id.idx, dirty::REFRESH, &EagerPolicy);
    }

    /// Returns the interaction state bits of a view.
    #[must_use]
    pub fn state(&self, id: ViewId) -> ViewState {
        self.validate(id);
        self.state[id.idx as usize]
    }

    /// Marks a view's drawn content as changed.
    ///
    /// The mark propagates to every ancestor, so an enclosing buffered frame
    /// re-renders its buffer on the next draw.
    pub fn request_refresh(&mut self, id: ViewId) {
        self.validate(id);
        self.dirty.mark_with(id.idx, dirty::REFRESH, &EagerPolicy);
    }

    // -- Widgets --

    /// Returns the view's widget if it is a `W`.
    ///
    /// Returns `None` while the widget is running one of its own hooks.
    #[must_use]
    pub fn widget<W: Widget>(&self, id: ViewId) -> Option<&W> {
        self.validate(id);
        let widget: &dyn Any = self.widget[id.idx as usize].as_deref()?;
        widget.downcast_ref::<W>()
    }

    /// Returns the view's widget mutably if it is a `W`.
    ///
    /// Widget state changed this way is not automatically refreshed; call
    /// [`request_refresh`](Self::request_refresh) if it affects drawing.
    #[must_use]
    pub fn widget_mut<W: Widget>(&mut self, id: ViewId) -> Option<&mut W> {
        self.validate(id);
        let widget: &mut dyn Any = self.widget[id.idx as usize].as_deref_mut()?;
        widget.downcast_mut::<W>()
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: ViewId) {
        assert!(
            self.is_alive(id),
            "stale ViewId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> ViewId {
        ViewId::new(idx, self.generation[idx as usize])
    }

    #[inline]
    pub(crate) fn opt_id(&self, idx: u32) -> Option<ViewId> {
        (idx != INVALID).then(|| self.id_at(idx))
    }

    pub(crate) fn is_ancestor_idx(&self, ancestor: u32, view: u32) -> bool {
        let mut cur = self.parent[view as usize];
        while cur != INVALID {
            if cur == ancestor {
                return true;
            }
            cur = self.parent[cur as usize];
        }
        false
    }

    /// `view` is `root` or inside its subtree.
    pub(crate) fn in_subtree(&self, root: u32, view: u32) -> bool {
        view == root || self.is_ancestor_idx(root, view)
    }

    fn check_insert(&self, parent: ViewId, child: ViewId) -> Result<(), TreeError> {
        if parent == child {
            return Err(TreeError::SelfInsertion(child));
        }
        let current = self.parent[child.idx as usize];
        if current != INVALID {
            return Err(TreeError::AlreadyAttached {
                child,
                parent: self.id_at(current),
            });
        }
        if self.is_ancestor_idx(child.idx, parent.idx) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        Ok(())
    }

    /// Links detached `c` into `p` before sibling `before` (or last, if
    /// `before` is [`INVALID`]).
    pub(crate) fn link_before(&mut self, p: u32, c: u32, before: u32) {
        self.splice_before(p, c, before);

        // The parent's drawn content depends on the child.
        let _ = self.dirty.add_dependency(p, c, dirty::REFRESH);
        self.dirty.mark_with(c, dirty::REFRESH, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Removes `idx` from its parent's child list.
    pub(crate) fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        self.splice_out(idx);

        self.dirty.remove_dependency(p, idx, dirty::REFRESH);
        self.dirty.mark_with(p, dirty::REFRESH, &EagerPolicy);
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Sibling-list surgery for [`link_before`](Self::link_before), without
    /// touching dirty state.
    pub(crate) fn splice_before(&mut self, p: u32, c: u32, before: u32) {
        self.parent[c as usize] = p;
        if before == INVALID {
            let last = self.last_child[p as usize];
            self.prev_sibling[c as usize] = last;
            self.next_sibling[c as usize] = INVALID;
            if last == INVALID {
                self.first_child[p as usize] = c;
            } else {
                self.next_sibling[last as usize] = c;
            }
            self.last_child[p as usize] = c;
        } else {
            let prev = self.prev_sibling[before as usize];
            self.prev_sibling[c as usize] = prev;
            self.next_sibling[c as usize] = before;
            if prev == INVALID {
                self.first_child[p as usize] = c;
            } else {
                self.next_sibling[prev as usize] = c;
            }
            self.prev_sibling[before as usize] = c;
        }
        self.subview_count[p as usize] += 1;
    }

    /// Sibling-list surgery for [`unlink_from_parent`](Self::unlink_from_parent),
    /// without touching dirty state.
    pub(crate) fn splice_out(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next == INVALID {
            self.last_child[p as usize] = prev;
        } else {
            self.prev_sibling[next as usize] = prev;
        }
        self.subview_count[p as usize] -= 1;

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Frees a detached subtree root, destroying managed descendants and
    /// detaching unmanaged ones.
    fn destroy_detached(&mut self, idx: u32) {
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            let next = self.next_sibling[child as usize];
            self.unlink_from_parent(child);
            if self.flags[child as usize].managed {
                self.destroy_detached(child);
            }
            child = next;
        }

        let id = self.id_at(idx);
        let i = idx as usize;
        if let Some(buffer) = self.frame[i].take().and_then(|f| f.buffer).and_then(|b| b.handle) {
            self.pending_released_buffers.push(buffer);
        }
        self.window[i] = None;
        // `None` if the widget is mid-hook; it is dropped when the hook returns.
        self.widget[i] = None;
        self.state[i] = ViewState::default();

        self.dirty.remove_key(idx);
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.live[i] = false;
        self.free_list.push(idx);
        self.pending_destroyed.push(id);
        self.dirty.mark(idx, dirty::TOPOLOGY);
    }

    /// Calls a `&mut self` hook on the widget of `id` with a [`ViewCx`].
    ///
    /// Returns `default` if the widget is already running a hook. The widget
    /// is put back only if the view survived the call, and calls queued for
    /// it meanwhile are replayed.
    ///
    /// Queries that cannot wait, such as [`preferred_size`](Self::preferred_size)
    /// or hit-testing, see the view's current size and rectangle while its
    /// widget is out.
    pub(crate) fn with_widget<R>(
        &mut self,
        id: ViewId,
        default: R,
        f: impl FnOnce(&mut dyn Widget, &mut ViewCx<'_>) -> R,
    ) -> R {
        if !self.is_alive(id) {
            return default;
        }
        let Some(mut widget) = self.widget[id.idx as usize].take() else {
            return default;
        };
        let result = {
            let mut cx = ViewCx { tree: self, id };
            f(widget.as_mut(), &mut cx)
        };
        if self.is_alive(id) {
            self.widget[id.idx as usize] = Some(widget);
        }
        if !self.deferred.is_empty() {
            self.flush_deferred();
        }
        result
    }

    pub(crate) fn widget_ref(&self, idx: u32) -> Option<&dyn Widget> {
        self.widget[idx as usize].as_deref()
    }

    pub(crate) fn set_hovered_bit(&mut self, idx: u32, on: bool) {
        if self.state[idx as usize].hovered != on {
            self.state[idx as usize].hovered = on;
            self.dirty.mark_with(idx, dirty::REFRESH, &EagerPolicy);
        }
    }

    pub(crate) fn set_focused_bit(&mut self, idx: u32, on: bool) {
        if self.state[idx as usize].focused != on {
            self.state[idx as usize].focused = on;
            self.dirty.mark_with(idx, dirty::REFRESH, &EagerPolicy);
        }
    }

    pub(crate) fn set_pressed_bit(&mut self, idx: u32, on: bool) {
        if self.state[idx as usize].pressed != on {
            self.state[idx as usize].pressed = on;
            self.dirty.mark_with(idx, dirty::REFRESH, &EagerPolicy);
        }
    }

    /// Sends `hover_out` to `views` in order, skipping any that died.
    pub(crate) fn notify_hover_out(&mut self, scope: ViewId, views: &[ViewId], position: Point) {
        let event = HoverEvent { position };
        for &view in views {
            if !self.is_alive(view) {
                continue;
            }
            self.set_hovered_bit(view.idx, false);
            self.tracer.hover(&HoverTraceEvent {
                scope,
                view,
                kind: HoverKind::Out,
            });
            self.deliver_hover(view, event, HoverKind::Out);
        }
    }

    /// Sends `hover_in` to `views` in order, skipping any that died.
    pub(crate) fn notify_hover_in(&mut self, scope: ViewId, views: &[ViewId], position: Point) {
        let event = HoverEvent { position };
        for &view in views {
            if !self.is_alive(view) {
                continue;
            }
            self.set_hovered_bit(view.idx, true);
            self.tracer.hover(&HoverTraceEvent {
                scope,
                view,
                kind: HoverKind::In,
            });
            self.deliver_hover(view, event, HoverKind::In);
        }
    }

    pub(crate) fn notify_focus(&mut self, scope: ViewId, view: ViewId, kind: FocusKind) {
        if !self.is_alive(view) {
            return;
        }
        self.set_focused_bit(view.idx, kind == FocusKind::On);
        self.tracer.focus(&FocusTraceEvent { scope, view, kind });
        self.deliver_focus(view, kind);
    }

    /// Clears every hover, focus and capture reference that points into the
    /// subtree rooted at `root`, before that subtree is detached or freed.
    pub(crate) fn release_tracking(&mut self, root: ViewId) {
        let r = root.idx;

        // Frame-level references: the frame enclosing `root`.
        let mut frame = self.parent[r as usize];
        while frame != INVALID && self.frame[frame as usize].is_none() {
            frame = self.parent[frame as usize];
        }
        if frame != INVALID {
            self.release_frame_tracking(self.id_at(frame), root);
        }

        // Window-level references: frames inside `root` (or `root` itself).
        let mut window = self.parent[r as usize];
        while window != INVALID && self.window[window as usize].is_none() {
            window = self.parent[window as usize];
        }
        if window != INVALID {
            self.release_window_tracking(self.id_at(window), root);
        }
    }

    fn release_frame_tracking(&mut self, frame: ViewId, root: ViewId) {
        let Some(data) = self.frame[frame.idx as usize].as_ref() else {
            return;
        };
        let (hovered, focused, pressed) = (data.hovered, data.focused, data.pressed);
        let r = root.idx;

        if let Some(h) = hovered
            && self.is_alive(h)
            && self.in_subtree(r, h.idx)
        {
            let chain = self.hover_chain(frame.idx, h.idx);
            if let Some(data) = self.frame[frame.idx as usize].as_mut() {
                data.hovered = None;
            }
            let position = self.window_cursor(frame.idx);
            self.notify_hover_out(frame, &chain, position);
        }

        if let Some(p) = pressed
            && self.is_alive(p)
            && self.in_subtree(r, p.idx)
        {
            self.set_pressed_bit(p.idx, false);
            if let Some(data) = self.frame[frame.idx as usize].as_mut() {
                data.pressed = None;
            }
        }

        if let Some(f) = focused
            && self.is_alive(f)
            && self.in_subtree(r, f.idx)
        {
            if let Some(data) = self.frame[frame.idx as usize].as_mut() {
                data.focused = None;
            }
            self.notify_focus(frame, f, FocusKind::Off);
            if self.is_alive(root)
                && let Some(replacement) = self.preceding_focusable(r)
                && let Some(data) = self.frame[frame.idx as usize].as_mut()
                && data.focused.is_none()
            {
                data.focused = Some(replacement);
                self.notify_focus(frame, replacement, FocusKind::On);
            }
        }
    }

    fn release_window_tracking(&mut self, window: ViewId, root: ViewId) {
        let Some(data) = self.window[window.idx as usize].as_deref() else {
            return;
        };
        let r = root.idx;
        let hits = |tree: &Self, f: Option<ViewId>| {
            f.is_some_and(|f| tree.is_alive(f) && tree.in_subtree(r, f.idx))
        };
        let hovered = hits(self, data.hovered_frame).then_some(data.hovered_frame).flatten();
        let focused = hits(self, data.focused_frame).then_some(data.focused_frame).flatten();
        let clear_active = hits(self, data.active_frame);
        let clear_pressed = hits(self, data.pressed_frame);

        if let Some(data) = self.window[window.idx as usize].as_deref_mut() {
            if clear_active {
                data.active_frame = None;
            }
            if clear_pressed {
                data.pressed_frame = None;
            }
        }

        if let Some(frame) = hovered {
            if let Some(data) = self.window[window.idx as usize].as_deref_mut() {
                data.hovered_frame = None;
            }
            let position = self.window_cursor(window.idx);
            self.notify_hover_out(window, &[frame], position);
        }

        if let Some(frame) = focused {
            if let Some(data) = self.window[window.idx as usize].as_deref_mut() {
                data.focused_frame = None;
            }
            self.notify_focus(window, frame, FocusKind::Off);
            // Only a frame that is itself the removed root has siblings in the
            // window's stack to fall back to.
            if frame == root
                && self.is_alive(root)
                && let Some(replacement) = self.preceding_focusable(r)
                && let Some(data) = self.window[window.idx as usize].as_deref_mut()
                && data.focused_frame.is_none()
            {
                data.focused_frame = Some(replacement);
                self.notify_focus(window, replacement, FocusKind::On);
            }
        }
    }

    /// The closest visible focusable sibling below `idx` in z-order.
    fn preceding_focusable(&self, idx: u32) -> Option<ViewId> {
        let mut cur = self.prev_sibling[idx as usize];
        while cur != INVALID {
            let i = cur as usize;
            let focusable = match &self.frame[i] {
                Some(frame) => frame.flags.focusable,
                None => self.flags[i].focusable,
            };
            if focusable && self.visible[i] {
                return Some(self.id_at(cur));
            }
            cur = self.prev_sibling[i];
        }
        None
    }

    /// Views on the hover chain from just below `frame` down to `leaf`,
    /// innermost first.
    pub(crate) fn hover_chain(&self, frame: u32, leaf: u32) -> Vec<ViewId> {
        let mut chain = Vec::new();
        let mut cur = leaf;
        while cur != INVALID && cur != frame {
            chain.push(self.id_at(cur));
            cur = self.parent[cur as usize];
        }
        chain
    }

    /// Last known cursor position of the window containing `idx`.
    pub(crate) fn window_cursor(&self, idx: u32) -> Point {
        let mut cur = idx;
        while cur != INVALID {
            if let Some(window) = self.window[cur as usize].as_deref() {
                return window.cursor.unwrap_or(Point::ZERO);
            }
            cur = self.parent[cur as usize];
        }
        Point::ZERO
    }
}

/// Mutable access to the tree from inside a widget hook.
///
/// Dereferences to [`ViewTree`]; [`id`](Self::id) names the view whose hook
/// is running.
#[derive(Debug)]
pub struct ViewCx<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl ViewCx<'_> {
    /// The view whose hook is running.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Marks this view's drawn content as changed.
    pub fn request_refresh(&mut self) {
        let id = self.id;
        self.tree.request_refresh(id);
    }
}

impl Deref for ViewCx<'_> {
    type Target = ViewTree;

    fn deref(&self) -> &ViewTree {
        self.tree
    }
}

impl DerefMut for ViewCx<'_> {
    fn deref_mut(&mut self) -> &mut ViewTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::testing::XorShift;

    fn chain(tree: &mut ViewTree, n: usize) -> (ViewId, Vec<ViewId>) {
        let parent = tree.create_view(());
        let kids: Vec<ViewId> = (0..n).map(|_| tree.create_view(())).collect();
        for &k in &kids {
            tree.push_back(parent, k).unwrap();
        }
        (parent, kids)
    }

    fn assert_links(tree: &ViewTree, parent: ViewId) {
        let forward: Vec<ViewId> = tree.children(parent).collect();
        let mut backward: Vec<ViewId> = tree.children_rev(parent).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), tree.subview_count(parent));
        for (i, &c) in forward.iter().enumerate() {
            assert_eq!(tree.parent(c), Some(parent));
            assert_eq!(tree.index_of(c), Some(i));
        }
        assert_eq!(tree.first_child(parent), forward.first().copied());
        assert_eq!(tree.last_child(parent), forward.last().copied());
    }

    #[test]
    fn create_and_destroy() {
        let mut tree = ViewTree::new();
        let id = tree.create_view(());
        assert!(tree.is_alive(id));
        tree.destroy(id);
        assert!(!tree.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut tree = ViewTree::new();
        let id1 = tree.create_view(());
        tree.destroy(id1);
        let id2 = tree.create_view(());
        assert!(!tree.is_alive(id1));
        assert!(tree.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
    }

    #[test]
    #[should_panic(expected = "stale ViewId")]
    fn stale_handle_panics() {
        let mut tree = ViewTree::new();
        let id = tree.create_view(());
        tree.destroy(id);
        let _ = tree.parent(id);
    }

    #[test]
    fn insert_at_index_orders_children() {
        let mut tree = ViewTree::new();
        let (parent, kids) = chain(&mut tree, 3);
        let extra = tree.create_view(());
        tree.insert(parent, 1, extra).unwrap();
        let order: Vec<ViewId> = tree.children(parent).collect();
        assert_eq!(order, vec![kids[0], extra, kids[1], kids[2]]);
        assert_links(&tree, parent);

        let front = tree.create_view(());
        tree.push_front(parent, front).unwrap();
        assert_eq!(tree.first_child(parent), Some(front));
        let tail = tree.create_view(());
        tree.insert(parent, 99, tail).unwrap();
        assert_eq!(tree.last_child(parent), Some(tail));
        assert_links(&tree, parent);
    }

    #[test]
    fn structural_errors_leave_tree_unchanged() {
        let mut tree = ViewTree::new();
        let (parent, kids) = chain(&mut tree, 2);
        let other = tree.create_view(());

        assert_eq!(
            tree.push_back(parent, parent),
            Err(TreeError::SelfInsertion(parent))
        );
        assert_eq!(
            tree.push_back(other, kids[0]),
            Err(TreeError::AlreadyAttached {
                child: kids[0],
                parent
            })
        );
        assert_eq!(
            tree.remove(other, kids[1]),
            Err(TreeError::NotAChild {
                parent: other,
                child: kids[1]
            })
        );
        assert_eq!(
            tree.push_back(kids[0], parent),
            Err(TreeError::WouldCycle {
                parent: kids[0],
                child: parent
            })
        );
        assert_eq!(tree.subview_count(other), 0);
        assert_links(&tree, parent);
    }

    #[test]
    fn remove_detaches_without_destroying() {
        let mut tree = ViewTree::new();
        let (parent, kids) = chain(&mut tree, 3);
        tree.remove(parent, kids[1]).unwrap();
        assert!(tree.is_alive(kids[1]));
        assert_eq!(tree.parent(kids[1]), None);
        assert_eq!(tree.next_sibling(kids[0]), Some(kids[2]));
        assert_eq!(tree.previous_sibling(kids[2]), Some(kids[0]));
        assert_links(&tree, parent);
    }

    #[test]
    fn destroy_frees_managed_and_detaches_unmanaged() {
        let mut tree = ViewTree::new();
        let (parent, kids) = chain(&mut tree, 2);
        let grandchild = tree.create_view(());
        tree.push_back(kids[0], grandchild).unwrap();
        tree.set_flags(
            kids[1],
            ViewFlags {
                managed: false,
                ..ViewFlags::default()
            },
        );

        tree.destroy(parent);
        assert!(!tree.is_alive(parent));
        assert!(!tree.is_alive(kids[0]));
        assert!(!tree.is_alive(grandchild));
        assert!(tree.is_alive(kids[1]));
        assert_eq!(tree.parent(kids[1]), None);
    }

    #[test]
    fn clear_children_applies_ownership_policy() {
        let mut tree = ViewTree::new();
        let (parent, kids) = chain(&mut tree, 3);
        tree.set_flags(
            kids[2],
            ViewFlags {
                managed: false,
                ..ViewFlags::default()
            },
        );
        tree.clear_children(parent);
        assert_eq!(tree.subview_count(parent), 0);
        assert!(!tree.is_alive(kids[0]));
        assert!(!tree.is_alive(kids[1]));
        assert!(tree.is_alive(kids[2]));
    }

    #[test]
    fn downcast_widget() {
        #[derive(Debug, PartialEq)]
        struct Label(u32);
        impl Widget for Label {}

        let mut tree = ViewTree::new();
        let id = tree.create_view(Label(7));
        assert_eq!(tree.widget::<Label>(id), Some(&Label(7)));
        assert!(tree.widget::<()>(id).is_none());
        if let Some(label) = tree.widget_mut::<Label>(id) {
            label.0 = 8;
        }
        assert_eq!(tree.widget::<Label>(id), Some(&Label(8)));
    }

    #[test]
    fn random_operations_keep_links_consistent() {
        let mut rng = XorShift::new(0x5eed);
        let mut tree = ViewTree::new();
        let parents: Vec<ViewId> = (0..4).map(|_| tree.create_view(())).collect();
        let mut pool: Vec<ViewId> = (0..24).map(|_| tree.create_view(())).collect();

        for _ in 0..2000 {
            let child = pool[rng.below(pool.len())];
            let parent = parents[rng.below(parents.len())];
            match rng.below(4) {
                0 => {
                    let idx = rng.below(8);
                    let _ = tree.insert(parent, idx, child);
                }
                1 => {
                    let _ = tree.push_front(parent, child);
                }
                2 => {
                    if let Some(p) = tree.parent(child) {
                        tree.remove(p, child).unwrap();
                    }
                }
                _ => {
                    if rng.below(10) == 0 {
                        tree.destroy(child);
                        let slot = pool.iter().position(|&c| c == child).unwrap();
                        pool[slot] = tree.create_view(());
                    }
                }
            }
            for &p in &parents {
                assert_links(&tree, p);
            }
        }
    }
}
