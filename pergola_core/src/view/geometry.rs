// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry update protocol, coordinate transforms and view shapes.
//!
//! Every change to a view's size, position or visibility goes through one of
//! two paths:
//!
//! - **Requested** ([`resize`](ViewTree::resize), [`move_to`](ViewTree::move_to),
//!   [`set_visible`](ViewTree::set_visible) and their `request_*` forms). The
//!   target's widget and then its parent's widget are asked through the
//!   matching `*_update_test` hook; either can veto. An accepted change is
//!   stored, the target's `*_updated` hook runs, and unless the request came
//!   from the parent itself the parent's `report_*_update` hook runs.
//! - **Trusted** ([`set_child_geometry`](ViewTree::set_child_geometry)). A
//!   container applying its own layout stores the values directly. No tests
//!   run and nothing is reported back, so layout passes cannot loop.
//!
//! A vetoed request is not an error; the call returns `false` and the stored
//! geometry is unchanged.
//!
//! A widget is out of its slot while one of its hooks runs. A request that
//! would have to be tested by such a widget (a button resizing itself from
//! `mouse_press`, or a child asking a container that is mid-hook) is queued
//! and replayed, tests included, as soon as that hook returns. The call
//! returns `false` because nothing has changed yet. Notifications for such a
//! widget are queued the same way.

use core::ops::BitOr;

use kurbo::{Point, Rect, RoundedRect, RoundedRectRadii, Size, Vec2};
use understory_dirty::EagerPolicy;

use super::deferred::Deferred;
use super::id::{INVALID, ViewId};
use super::store::ViewTree;
use crate::dirty;
use crate::render::ClipShape;
use crate::trace::{GeometryField, GeometryTraceEvent};

/// A proposed geometry change, alive for one update call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateRequest<T> {
    /// The view that issued the request: the target itself, a descendant, or
    /// the target's container.
    pub source: ViewId,
    /// The view whose geometry changes.
    pub target: ViewId,
    /// The proposed value.
    pub value: T,
}

/// A proposed size.
pub type SizeUpdateRequest = UpdateRequest<Size>;
/// A proposed position, in the parent's content coordinates.
pub type PositionUpdateRequest = UpdateRequest<Point>;
/// A proposed visibility.
pub type VisibilityUpdateRequest = UpdateRequest<bool>;

/// Which corners of a view are rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RoundCorners(u8);

impl RoundCorners {
    /// No rounded corners.
    pub const NONE: Self = Self(0);
    /// Top-left corner.
    pub const TOP_LEFT: Self = Self(1);
    /// Top-right corner.
    pub const TOP_RIGHT: Self = Self(1 << 1);
    /// Bottom-right corner.
    pub const BOTTOM_RIGHT: Self = Self(1 << 2);
    /// Bottom-left corner.
    pub const BOTTOM_LEFT: Self = Self(1 << 3);
    /// Both top corners.
    pub const TOP: Self = Self(Self::TOP_LEFT.0 | Self::TOP_RIGHT.0);
    /// Both bottom corners.
    pub const BOTTOM: Self = Self(Self::BOTTOM_LEFT.0 | Self::BOTTOM_RIGHT.0);
    /// All four corners.
    pub const ALL: Self = Self(0b1111);

    /// Returns whether every corner in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether no corner is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for RoundCorners {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Kinds of geometry change sharing the perform sequence.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Change {
    Size(Size),
    Position(Point),
    Visibility(bool),
}

impl Change {
    fn field(self) -> GeometryField {
        match self {
            Self::Size(_) => GeometryField::Size,
            Self::Position(_) => GeometryField::Position,
            Self::Visibility(_) => GeometryField::Visibility,
        }
    }
}

impl ViewTree {
    // -- Getters --

    /// Returns the position of a view in its parent's content coordinates.
    #[must_use]
    pub fn position(&self, id: ViewId) -> Point {
        self.validate(id);
        self.position[id.idx as usize]
    }

    /// Returns the size of a view.
    #[must_use]
    pub fn size(&self, id: ViewId) -> Size {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the scroll offset a view applies to its children.
    #[must_use]
    pub fn offset(&self, id: ViewId) -> Vec2 {
        self.validate(id);
        self.offset[id.idx as usize]
    }

    /// Returns whether a view is visible. Ancestors are not consulted.
    #[must_use]
    pub fn is_visible(&self, id: ViewId) -> bool {
        self.validate(id);
        self.visible[id.idx as usize]
    }

    /// Returns the view's rectangle in its parent's content coordinates.
    #[must_use]
    pub fn frame_rect(&self, id: ViewId) -> Rect {
        self.validate(id);
        Rect::from_origin_size(self.position[id.idx as usize], self.size[id.idx as usize])
    }

    // -- Requested changes --

    /// Asks for `id` to change its own size.
    ///
    /// Returns whether the view now has `size`.
    pub fn resize(&mut self, id: ViewId, size: Size) -> bool {
        self.request_size(id, id, size)
    }

    /// Asks for `target` to change size on behalf of `source`.
    ///
    /// Returns whether `target` now has `size`.
    pub fn request_size(&mut self, source: ViewId, target: ViewId, size: Size) -> bool {
        self.request(source, target, Change::Size(size))
    }

    /// Asks for `id` to move within its parent.
    ///
    /// Returns whether the view is now at `position`.
    pub fn move_to(&mut self, id: ViewId, position: Point) -> bool {
        self.request_position(id, id, position)
    }

    /// Asks for `target` to move on behalf of `source`.
    pub fn request_position(&mut self, source: ViewId, target: ViewId, position: Point) -> bool {
        self.request(source, target, Change::Position(position))
    }

    /// Asks for `id` to be shown or hidden.
    ///
    /// Returns whether the view now has the requested visibility.
    pub fn set_visible(&mut self, id: ViewId, visible: bool) -> bool {
        self.request_visibility(id, id, visible)
    }

    /// Asks for `target` to be shown or hidden on behalf of `source`.
    pub fn request_visibility(&mut self, source: ViewId, target: ViewId, visible: bool) -> bool {
        self.request(source, target, Change::Visibility(visible))
    }

    // -- Trusted changes --

    /// Places `child` as part of `container`'s layout pass.
    ///
    /// No update tests run and the container is not notified back.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale or if `child` is not a child of
    /// `container`.
    pub fn set_child_geometry(
        &mut self,
        container: ViewId,
        child: ViewId,
        position: Point,
        size: Size,
    ) {
        self.validate(container);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == container.idx,
            "{child:?} is not a child of {container:?}"
        );
        if self.position[child.idx as usize] != position {
            self.perform(container, child, Change::Position(position));
        }
        if self.is_alive(child) && self.size[child.idx as usize] != size {
            self.perform(container, child, Change::Size(size));
        }
    }

    /// Sets the scroll offset `id` applies to its children.
    ///
    /// Hit-testing, coordinate conversion and drawing all honor it.
    pub fn set_offset(&mut self, id: ViewId, offset: Vec2) {
        self.validate(id);
        if self.offset[id.idx as usize] != offset {
            self.offset[id.idx as usize] = offset;
            self.dirty.mark_with(id.idx, dirty::REFRESH, &EagerPolicy);
        }
    }

    /// Sets which corners are rounded and their radius.
    pub fn set_corners(&mut self, id: ViewId, corners: RoundCorners, radius: f64) {
        self.validate(id);
        self.round[id.idx as usize] = corners;
        self.corner_radius[id.idx as usize] = radius.max(0.0);
        self.dirty.mark_with(id.idx, dirty::REFRESH, &EagerPolicy);
    }

    /// Returns the rounded corners of a view and their radius.
    #[must_use]
    pub fn corners(&self, id: ViewId) -> (RoundCorners, f64) {
        self.validate(id);
        (
            self.round[id.idx as usize],
            self.corner_radius[id.idx as usize],
        )
    }

    /// Returns the view's outline in its local coordinates.
    #[must_use]
    pub fn shape(&self, id: ViewId) -> ClipShape {
        self.validate(id);
        self.shape_at(id.idx)
    }

    pub(crate) fn shape_at(&self, idx: u32) -> ClipShape {
        let i = idx as usize;
        let rect = self.size[i].to_rect();
        let corners = self.round[i];
        let r = self.corner_radius[i];
        if corners.is_empty() || r <= 0.0 {
            return ClipShape::Rect(rect);
        }
        let pick = |c: RoundCorners| if corners.contains(c) { r } else { 0.0 };
        let radii = RoundedRectRadii::new(
            pick(RoundCorners::TOP_LEFT),
            pick(RoundCorners::TOP_RIGHT),
            pick(RoundCorners::BOTTOM_RIGHT),
            pick(RoundCorners::BOTTOM_LEFT),
        );
        ClipShape::RoundedRect(RoundedRect::from_rect(rect, radii))
    }

    // -- Coordinates --

    /// Returns the origin of `id` in its window's coordinates.
    ///
    /// Sums each view's position and its parent's scroll offset up to the
    /// root. A detached root has origin zero.
    #[must_use]
    pub fn origin_in_window(&self, id: ViewId) -> Point {
        self.validate(id);
        Point::ZERO + self.origin_vec(id.idx)
    }

    /// Converts a window point into `id`'s local coordinates.
    #[must_use]
    pub fn to_local(&self, id: ViewId, window_point: Point) -> Point {
        self.validate(id);
        window_point - self.origin_vec(id.idx)
    }

    pub(crate) fn origin_vec(&self, idx: u32) -> Vec2 {
        let mut origin = Vec2::ZERO;
        let mut cur = idx;
        loop {
            let p = self.parent[cur as usize];
            if p == INVALID {
                return origin;
            }
            origin += self.position[cur as usize].to_vec2() + self.offset[p as usize];
            cur = p;
        }
    }

    /// Whether `local` (in `idx`'s coordinates) hits the view.
    pub(crate) fn contains_at(&self, idx: u32, local: Point) -> bool {
        let size = self.size[idx as usize];
        match self.widget_ref(idx) {
            Some(w) => w.contains(size, local),
            None => size.to_rect().contains(local),
        }
    }

    // -- Protocol --

    pub(crate) fn request(&mut self, source: ViewId, target: ViewId, change: Change) -> bool {
        self.validate(source);
        self.validate(target);
        let t = target.idx as usize;
        let unchanged = match change {
            Change::Size(s) => self.size[t] == s,
            Change::Position(p) => self.position[t] == p,
            Change::Visibility(v) => self.visible[t] == v,
        };
        if unchanged {
            return true;
        }

        let parent = self.parent[t];
        if self.in_hook(target) || (parent != INVALID && self.in_hook(self.id_at(parent))) {
            self.defer(Deferred::Request {
                source,
                target,
                change,
            });
            return false;
        }
        let mut vetoed_by = None;
        if !self.passes_test(target.idx, source, target, change) {
            vetoed_by = Some(target);
        } else if parent != INVALID && !self.passes_test(parent, source, target, change) {
            vetoed_by = Some(self.id_at(parent));
        }
        self.tracer.geometry(&GeometryTraceEvent {
            source,
            target,
            field: change.field(),
            vetoed_by,
        });
        if vetoed_by.is_some() {
            return false;
        }

        self.perform(source, target, change);
        true
    }

    fn passes_test(&self, tester: u32, source: ViewId, target: ViewId, change: Change) -> bool {
        let Some(widget) = self.widget_ref(tester) else {
            return true;
        };
        let id = self.id_at(tester);
        match change {
            Change::Size(value) => widget.size_update_test(
                self,
                id,
                &UpdateRequest {
                    source,
                    target,
                    value,
                },
            ),
            Change::Position(value) => widget.position_update_test(
                self,
                id,
                &UpdateRequest {
                    source,
                    target,
                    value,
                },
            ),
            Change::Visibility(value) => widget.visibility_update_test(
                self,
                id,
                &UpdateRequest {
                    source,
                    target,
                    value,
                },
            ),
        }
    }

    /// Stores an accepted change, notifies the target and, unless the parent
    /// issued it, reports it to the parent.
    fn perform(&mut self, source: ViewId, target: ViewId, change: Change) {
        let t = target.idx;
        // Captured before any hook can detach or destroy the target.
        let parent = self.opt_id(self.parent[t as usize]);

        match change {
            Change::Size(size) => {
                self.size[t as usize] = size;
                self.dirty.mark_with(t, dirty::REFRESH, &EagerPolicy);
            }
            Change::Position(position) => {
                self.position[t as usize] = position;
                // The view's own pixels are unchanged; only its container
                // needs to redraw.
                self.mark_container_refresh(t, parent);
            }
            Change::Visibility(visible) => {
                self.visible[t as usize] = visible;
                self.mark_container_refresh(t, parent);
            }
        }

        self.deliver_updated(source, target, change);
        if let Some(parent) = parent.filter(|&p| p != source) {
            self.deliver_report(parent, source, target, change);
        }
    }

    /// Runs `target`'s `*_updated` hook for a stored change.
    pub(crate) fn deliver_updated(&mut self, source: ViewId, target: ViewId, change: Change) {
        if self.in_hook(target) {
            self.defer(Deferred::Updated {
                source,
                target,
                change,
            });
            return;
        }
        match change {
            Change::Size(value) => {
                let request = UpdateRequest {
                    source,
                    target,
                    value,
                };
                self.with_widget(target, (), |w, cx| w.size_updated(cx, &request));
            }
            Change::Position(value) => {
                let request = UpdateRequest {
                    source,
                    target,
                    value,
                };
                self.with_widget(target, (), |w, cx| w.position_updated(cx, &request));
            }
            Change::Visibility(value) => {
                let request = UpdateRequest {
                    source,
                    target,
                    value,
                };
                self.with_widget(target, (), |w, cx| w.visibility_updated(cx, &request));
            }
        }
    }

    /// Runs `parent`'s `report_*_update` hook for a stored change to `target`.
    pub(crate) fn deliver_report(
        &mut self,
        parent: ViewId,
        source: ViewId,
        target: ViewId,
        change: Change,
    ) {
        if self.in_hook(parent) {
            self.defer(Deferred::Report {
                parent,
                source,
                target,
                change,
            });
            return;
        }
        match change {
            Change::Size(value) => {
                let request = UpdateRequest {
                    source,
                    target,
                    value,
                };
                self.with_widget(parent, (), |w, cx| w.report_size_update(cx, &request));
            }
            Change::Position(value) => {
                let request = UpdateRequest {
                    source,
                    target,
                    value,
                };
                self.with_widget(parent, (), |w, cx| {
                    w.report_position_update(cx, &request);
                });
            }
            Change::Visibility(value) => {
                let request = UpdateRequest {
                    source,
                    target,
                    value,
                };
                self.with_widget(parent, (), |w, cx| {
                    w.report_visibility_update(cx, &request);
                });
            }
        }
    }

    fn mark_container_refresh(&mut self, idx: u32, parent: Option<ViewId>) {
        match parent {
            Some(p) => self.dirty.mark_with(p.idx, dirty::REFRESH, &EagerPolicy),
            None => self.dirty.mark_with(idx, dirty::REFRESH, &EagerPolicy),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::testing::{Log, Scripted};
    use crate::widget::Widget;

    /// Accepts requests only from itself.
    #[derive(Debug)]
    struct Jealous;

    impl Widget for Jealous {
        fn size_update_test(&self, _: &ViewTree, id: ViewId, request: &SizeUpdateRequest) -> bool {
            request.source == id
        }
    }

    #[test]
    fn container_vetoes_child_resize() {
        let mut tree = ViewTree::new();
        let container = tree.create_view(Jealous);
        let child = tree.create_view(());
        tree.push_back(container, child).unwrap();
        tree.set_child_geometry(container, child, Point::ZERO, Size::new(10.0, 10.0));

        assert!(!tree.resize(child, Size::new(50.0, 50.0)));
        assert_eq!(tree.size(child), Size::new(10.0, 10.0));

        // The container can still resize itself.
        assert!(tree.resize(container, Size::new(80.0, 40.0)));
        assert_eq!(tree.size(container), Size::new(80.0, 40.0));
    }

    #[test]
    fn self_resize_notifies_target_then_parent() {
        let log = Log::default();
        let mut tree = ViewTree::new();
        let parent = tree.create_view(Scripted::new("P", &log));
        let child = tree.create_view(Scripted::new("C", &log));
        tree.push_back(parent, child).unwrap();

        assert!(tree.resize(child, Size::new(3.0, 4.0)));
        assert_eq!(log.take(), vec!["C.size_updated", "P.report_size"]);

        // Unchanged value: no hooks.
        assert!(tree.resize(child, Size::new(3.0, 4.0)));
        assert!(log.take().is_empty());
    }

    #[test]
    fn trusted_path_skips_tests_and_reports() {
        let log = Log::default();
        let mut tree = ViewTree::new();
        let parent = tree.create_view(Scripted::new("P", &log).veto_children());
        let child = tree.create_view(Scripted::new("C", &log));
        tree.push_back(parent, child).unwrap();

        tree.set_child_geometry(parent, child, Point::new(1.0, 2.0), Size::new(5.0, 5.0));
        assert_eq!(tree.position(child), Point::new(1.0, 2.0));
        assert_eq!(tree.size(child), Size::new(5.0, 5.0));
        assert_eq!(log.take(), vec!["C.position_updated", "C.size_updated"]);
    }

    #[test]
    fn visibility_request_can_be_vetoed_by_target() {
        #[derive(Debug)]
        struct AlwaysShown;
        impl Widget for AlwaysShown {
            fn visibility_update_test(
                &self,
                _: &ViewTree,
                _: ViewId,
                request: &VisibilityUpdateRequest,
            ) -> bool {
                request.value
            }
        }

        let mut tree = ViewTree::new();
        let v = tree.create_view(AlwaysShown);
        assert!(!tree.set_visible(v, false));
        assert!(tree.is_visible(v));
    }

    #[test]
    fn coordinates_accumulate_positions_and_offsets() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(());
        let mid = tree.create_view(());
        let leaf = tree.create_view(());
        tree.push_back(root, mid).unwrap();
        tree.push_back(mid, leaf).unwrap();
        assert!(tree.move_to(mid, Point::new(10.0, 20.0)));
        assert!(tree.move_to(leaf, Point::new(1.0, 2.0)));
        tree.set_offset(mid, Vec2::new(-5.0, 0.0));

        assert_eq!(tree.origin_in_window(leaf), Point::new(6.0, 22.0));
        assert_eq!(
            tree.to_local(leaf, Point::new(16.0, 32.0)),
            Point::new(10.0, 10.0)
        );
        assert_eq!(tree.origin_in_window(root), Point::ZERO);
    }

    #[test]
    fn shape_follows_round_corners() {
        let mut tree = ViewTree::new();
        let v = tree.create_view(());
        assert!(tree.resize(v, Size::new(40.0, 20.0)));
        assert_eq!(tree.shape(v), ClipShape::Rect(Rect::new(0.0, 0.0, 40.0, 20.0)));

        tree.set_corners(v, RoundCorners::TOP, 4.0);
        match tree.shape(v) {
            ClipShape::RoundedRect(rr) => {
                let radii = rr.radii();
                assert_eq!(radii.top_left, 4.0);
                assert_eq!(radii.top_right, 4.0);
                assert_eq!(radii.bottom_left, 0.0);
            }
            ClipShape::Rect(_) => panic!("expected rounded shape"),
        }
        assert!((RoundCorners::TOP | RoundCorners::BOTTOM).contains(RoundCorners::ALL));
    }

    #[test]
    fn position_change_refreshes_container_not_view() {
        let mut tree = ViewTree::new();
        let root = tree.create_view(());
        let child = tree.create_view(());
        let sibling = tree.create_view(());
        tree.push_back(root, child).unwrap();
        tree.push_back(root, sibling).unwrap();
        let _ = tree.collect_changes();

        assert!(tree.move_to(child, Point::new(3.0, 3.0)));
        let refreshed: Vec<ViewId> = tree.collect_changes().refreshed;
        assert_eq!(refreshed, vec![root]);
    }
}
