// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability set every concrete widget implements.
//!
//! A view's behavior comes from the boxed [`Widget`] stored in its slot. Every
//! hook has a default, so a plain container is `()` and a leaf widget only
//! overrides what it needs.
//!
//! # Hook families
//!
//! - **Measurement**: [`preferred_size`](Widget::preferred_size),
//!   [`expand_x`](Widget::expand_x), [`expand_y`](Widget::expand_y) and
//!   [`contains`](Widget::contains). These take `&self` and a shared tree.
//! - **Geometry protocol**: the `*_update_test` predicates (veto or accept),
//!   the `*_updated` notifications delivered to the target after a change has
//!   been stored, and the `report_*_update` notifications delivered to the
//!   parent of a view that changed itself.
//! - **Drawing**: [`pre_draw`](Widget::pre_draw), [`draw`](Widget::draw),
//!   [`post_draw`](Widget::post_draw).
//! - **Input**: press, release, move, key, context menu, focus and hover.
//!
//! # Re-entrancy
//!
//! While one of a view's `&mut self` hooks runs, its widget is taken out of
//! the tree. Hooks of that same view triggered from inside the call (for
//! example a `size_updated` caused by the widget resizing itself) are skipped
//! and default behavior applies. A hook may destroy its own view; the widget
//! is then dropped when the hook returns.

use core::any::Any;
use core::fmt::Debug;

use kurbo::{Point, Size};

use crate::event::{ContextMenuEvent, HoverEvent, KeyEvent, MouseEvent, Response};
use crate::view::{
    DrawCx, PositionUpdateRequest, SizeUpdateRequest, ViewCx, ViewId, ViewTree,
    VisibilityUpdateRequest,
};

/// Behavior attached to a view.
pub trait Widget: Any + Debug {
    /// The size this widget would like, used by layout containers.
    ///
    /// Defaults to the view's current size.
    fn preferred_size(&self, tree: &ViewTree, id: ViewId) -> Size {
        tree.size(id)
    }

    /// Whether a layout container may grow or shrink this view horizontally
    /// beyond its preferred width.
    fn expand_x(&self) -> bool {
        false
    }

    /// Whether a layout container may grow or shrink this view vertically
    /// beyond its preferred height.
    fn expand_y(&self) -> bool {
        false
    }

    /// Whether `point` (in local coordinates) hits the view.
    ///
    /// Defaults to the view's rectangle.
    fn contains(&self, size: Size, point: Point) -> bool {
        size.to_rect().contains(point)
    }

    /// Called on the target and on its parent before a size change is applied.
    /// Returning `false` vetoes the change.
    fn size_update_test(&self, tree: &ViewTree, id: ViewId, request: &SizeUpdateRequest) -> bool {
        _ = (tree, id, request);
        true
    }

    /// Called on the target and on its parent before a position change is
    /// applied. Returning `false` vetoes the change.
    fn position_update_test(
        &self,
        tree: &ViewTree,
        id: ViewId,
        request: &PositionUpdateRequest,
    ) -> bool {
        _ = (tree, id, request);
        true
    }

    /// Called on the target and on its parent before a visibility change is
    /// applied. Returning `false` vetoes the change.
    fn visibility_update_test(
        &self,
        tree: &ViewTree,
        id: ViewId,
        request: &VisibilityUpdateRequest,
    ) -> bool {
        _ = (tree, id, request);
        true
    }

    /// The view's size was just stored. Containers re-run their layout here.
    fn size_updated(&mut self, cx: &mut ViewCx<'_>, request: &SizeUpdateRequest) {
        _ = (cx, request);
    }

    /// The view's position was just stored.
    fn position_updated(&mut self, cx: &mut ViewCx<'_>, request: &PositionUpdateRequest) {
        _ = (cx, request);
    }

    /// The view's visibility was just stored.
    fn visibility_updated(&mut self, cx: &mut ViewCx<'_>, request: &VisibilityUpdateRequest) {
        _ = (cx, request);
    }

    /// A child changed its own size.
    fn report_size_update(&mut self, cx: &mut ViewCx<'_>, request: &SizeUpdateRequest) {
        _ = (cx, request);
    }

    /// A child changed its own position.
    fn report_position_update(&mut self, cx: &mut ViewCx<'_>, request: &PositionUpdateRequest) {
        _ = (cx, request);
    }

    /// A child changed its own visibility.
    fn report_visibility_update(
        &mut self,
        cx: &mut ViewCx<'_>,
        request: &VisibilityUpdateRequest,
    ) {
        _ = (cx, request);
    }

    /// Runs before the view draws. Returning `false` skips the view, its
    /// children and [`post_draw`](Self::post_draw).
    fn pre_draw(&self, cx: &mut DrawCx<'_>) -> bool {
        _ = cx;
        true
    }

    /// Draws the view's own content.
    ///
    /// Return [`Response::Finish`] if this hook already drew the children
    /// (through [`DrawCx::draw_children`]); otherwise the tree draws them
    /// after it returns.
    fn draw(&self, cx: &mut DrawCx<'_>) -> Response {
        _ = cx;
        Response::Ignore
    }

    /// Runs after the view and its children have drawn.
    fn post_draw(&self, cx: &mut DrawCx<'_>) {
        _ = cx;
    }

    /// A mouse button went down over the view (or the view has capture).
    fn mouse_press(&mut self, cx: &mut ViewCx<'_>, event: &MouseEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }

    /// A mouse button went up.
    fn mouse_release(&mut self, cx: &mut ViewCx<'_>, event: &MouseEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }

    /// The cursor moved.
    fn mouse_move(&mut self, cx: &mut ViewCx<'_>, event: &MouseEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }

    /// A key was pressed while the view had focus.
    fn key_press(&mut self, cx: &mut ViewCx<'_>, event: &KeyEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }

    /// A context menu was requested.
    fn context_menu_press(&mut self, cx: &mut ViewCx<'_>, event: &ContextMenuEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }

    /// The view gained focus.
    fn focus_on(&mut self, cx: &mut ViewCx<'_>) -> Response {
        _ = cx;
        Response::Ignore
    }

    /// The view lost focus.
    fn focus_off(&mut self, cx: &mut ViewCx<'_>) -> Response {
        _ = cx;
        Response::Ignore
    }

    /// The view joined the hover chain.
    fn hover_in(&mut self, cx: &mut ViewCx<'_>, event: &HoverEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }

    /// The view left the hover chain.
    fn hover_out(&mut self, cx: &mut ViewCx<'_>, event: &HoverEvent) -> Response {
        _ = (cx, event);
        Response::Ignore
    }
}

/// A plain container with default behavior.
impl Widget for () {}
