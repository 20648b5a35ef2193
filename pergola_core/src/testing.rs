// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared test fixtures: an event log, a scriptable widget, a recording
//! renderer and a seeded random source.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Rect, Size};

use crate::event::{ContextMenuEvent, HoverEvent, KeyEvent, MouseEvent, Response};
use crate::render::{BufferId, ClipShape, RenderError, Renderer, Rgba8, StencilState};
use crate::view::{
    DrawCx, PositionUpdateRequest, SizeUpdateRequest, ViewCx, ViewId, ViewTree,
    VisibilityUpdateRequest,
};
use crate::widget::Widget;

/// A shared, ordered record of `"name.hook"` entries.
#[derive(Clone, Debug, Default)]
pub(crate) struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    pub(crate) fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    /// Drains and returns everything logged so far.
    pub(crate) fn take(&self) -> Vec<String> {
        core::mem::take(&mut *self.0.borrow_mut())
    }
}

/// A widget that logs every hook it receives and answers as scripted.
#[derive(Debug)]
pub(crate) struct Scripted {
    name: &'static str,
    log: Log,
    veto_children: bool,
    preferred: Option<Size>,
    expand: (bool, bool),
    press: Response,
    release: Response,
    moved: Response,
    destroy_on_key: bool,
    close_frame_on_key: bool,
    skip_draw: bool,
}

impl Scripted {
    pub(crate) fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            veto_children: false,
            preferred: None,
            expand: (false, false),
            press: Response::Ignore,
            release: Response::Ignore,
            moved: Response::Ignore,
            destroy_on_key: false,
            close_frame_on_key: false,
            skip_draw: false,
        }
    }

    /// Rejects every geometry request on a child that the child did not
    /// originate itself.
    pub(crate) fn veto_children(mut self) -> Self {
        self.veto_children = true;
        self
    }

    pub(crate) fn preferred(mut self, size: Size) -> Self {
        self.preferred = Some(size);
        self
    }

    pub(crate) fn expanding(mut self, x: bool, y: bool) -> Self {
        self.expand = (x, y);
        self
    }

    pub(crate) fn press_response(mut self, response: Response) -> Self {
        self.press = response;
        self
    }

    pub(crate) fn release_response(mut self, response: Response) -> Self {
        self.release = response;
        self
    }

    pub(crate) fn move_response(mut self, response: Response) -> Self {
        self.moved = response;
        self
    }

    /// Destroys its own view from the key hook.
    pub(crate) fn destroy_on_key(mut self) -> Self {
        self.destroy_on_key = true;
        self
    }

    /// Destroys the enclosing frame from the key hook.
    pub(crate) fn close_frame_on_key(mut self) -> Self {
        self.close_frame_on_key = true;
        self
    }

    /// Vetoes drawing in `pre_draw`.
    pub(crate) fn skip_draw(mut self) -> Self {
        self.skip_draw = true;
        self
    }

    pub(crate) fn set_preferred(&mut self, size: Size) {
        self.preferred = Some(size);
    }

    fn record(&self, hook: &str) {
        self.log.push(format!("{}.{hook}", self.name));
    }

    fn allows(&self, id: ViewId, target: ViewId, source: ViewId) -> bool {
        !self.veto_children || target == id || source == id
    }
}

impl Widget for Scripted {
    fn preferred_size(&self, tree: &ViewTree, id: ViewId) -> Size {
        self.preferred.unwrap_or_else(|| tree.size(id))
    }

    fn expand_x(&self) -> bool {
        self.expand.0
    }

    fn expand_y(&self) -> bool {
        self.expand.1
    }

    fn size_update_test(&self, _: &ViewTree, id: ViewId, request: &SizeUpdateRequest) -> bool {
        self.allows(id, request.target, request.source)
    }

    fn position_update_test(
        &self,
        _: &ViewTree,
        id: ViewId,
        request: &PositionUpdateRequest,
    ) -> bool {
        self.allows(id, request.target, request.source)
    }

    fn visibility_update_test(
        &self,
        _: &ViewTree,
        id: ViewId,
        request: &VisibilityUpdateRequest,
    ) -> bool {
        self.allows(id, request.target, request.source)
    }

    fn size_updated(&mut self, _: &mut ViewCx<'_>, _: &SizeUpdateRequest) {
        self.record("size_updated");
    }

    fn position_updated(&mut self, _: &mut ViewCx<'_>, _: &PositionUpdateRequest) {
        self.record("position_updated");
    }

    fn visibility_updated(&mut self, _: &mut ViewCx<'_>, _: &VisibilityUpdateRequest) {
        self.record("visibility_updated");
    }

    fn report_size_update(&mut self, _: &mut ViewCx<'_>, _: &SizeUpdateRequest) {
        self.record("report_size");
    }

    fn report_position_update(&mut self, _: &mut ViewCx<'_>, _: &PositionUpdateRequest) {
        self.record("report_position");
    }

    fn report_visibility_update(&mut self, _: &mut ViewCx<'_>, _: &VisibilityUpdateRequest) {
        self.record("report_visibility");
    }

    fn pre_draw(&self, _: &mut DrawCx<'_>) -> bool {
        !self.skip_draw
    }

    fn draw(&self, _: &mut DrawCx<'_>) -> Response {
        self.record("draw");
        Response::Ignore
    }

    fn mouse_press(&mut self, _: &mut ViewCx<'_>, _: &MouseEvent) -> Response {
        self.record("press");
        self.press
    }

    fn mouse_release(&mut self, _: &mut ViewCx<'_>, _: &MouseEvent) -> Response {
        self.record("release");
        self.release
    }

    fn mouse_move(&mut self, _: &mut ViewCx<'_>, _: &MouseEvent) -> Response {
        self.record("move");
        self.moved
    }

    fn key_press(&mut self, cx: &mut ViewCx<'_>, _: &KeyEvent) -> Response {
        self.record("key");
        if self.destroy_on_key {
            let id = cx.id();
            cx.destroy(id);
            return Response::Finish;
        }
        if self.close_frame_on_key {
            let id = cx.id();
            if let Some(frame) = cx.frame_of(id) {
                cx.destroy(frame);
            }
            return Response::Finish;
        }
        Response::Ignore
    }

    fn context_menu_press(&mut self, _: &mut ViewCx<'_>, _: &ContextMenuEvent) -> Response {
        self.record("menu");
        Response::Ignore
    }

    fn focus_on(&mut self, _: &mut ViewCx<'_>) -> Response {
        self.record("focus_on");
        Response::Ignore
    }

    fn focus_off(&mut self, _: &mut ViewCx<'_>) -> Response {
        self.record("focus_off");
        Response::Ignore
    }

    fn hover_in(&mut self, _: &mut ViewCx<'_>, _: &HoverEvent) -> Response {
        self.record("hover_in");
        Response::Ignore
    }

    fn hover_out(&mut self, _: &mut ViewCx<'_>, _: &HoverEvent) -> Response {
        self.record("hover_out");
        Response::Ignore
    }
}

/// One call received by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    SetStencil(StencilState),
    FillStencil(ClipShape),
    Fill(ClipShape, Rgba8),
    CreateBuffer(Size),
    BeginBuffer(BufferId),
    EndBuffer(BufferId),
    Composite(BufferId, Rect),
    ReleaseBuffer(BufferId),
}

/// A renderer that records calls instead of drawing.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    calls: Vec<Call>,
    next_buffer: u32,
    created: usize,
    fail_buffers: bool,
}

impl RecordingRenderer {
    /// A renderer whose buffer allocations always fail.
    pub(crate) fn failing() -> Self {
        Self {
            fail_buffers: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Forgets recorded calls; buffer numbering continues.
    pub(crate) fn clear(&mut self) {
        self.calls.clear();
    }

    /// Number of successful allocations.
    pub(crate) fn buffers_created(&self) -> usize {
        self.created
    }
}

impl Renderer for RecordingRenderer {
    fn set_stencil(&mut self, state: StencilState) {
        self.calls.push(Call::SetStencil(state));
    }

    fn fill_stencil(&mut self, shape: &ClipShape) {
        self.calls.push(Call::FillStencil(*shape));
    }

    fn fill(&mut self, shape: &ClipShape, color: Rgba8) {
        self.calls.push(Call::Fill(*shape, color));
    }

    fn create_buffer(&mut self, size: Size) -> Result<BufferId, RenderError> {
        self.calls.push(Call::CreateBuffer(size));
        if self.fail_buffers {
            return Err(RenderError::BufferAllocation(size));
        }
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.created += 1;
        Ok(id)
    }

    fn begin_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::BeginBuffer(buffer));
    }

    fn end_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::EndBuffer(buffer));
    }

    fn composite_buffer(&mut self, buffer: BufferId, dest: Rect) {
        self.calls.push(Call::Composite(buffer, dest));
    }

    fn release_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::ReleaseBuffer(buffer));
    }
}

/// Seeded xorshift64 for property-style tests.
#[derive(Clone, Debug)]
pub(crate) struct XorShift(u64);

impl XorShift {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `0..n`.
    pub(crate) fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Uniform in `lo..hi`; `lo` when the range is empty.
    pub(crate) fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64;
        lo + (hi - lo) * unit
    }
}
