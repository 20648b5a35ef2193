// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for dispatch, geometry and compositing.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! view tree calls at each interesting transition. All method bodies default
//! to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional boxed sink and is owned by the
//! [`ViewTree`](crate::view::ViewTree). When the `trace` feature is **off**,
//! every `Tracer` emit compiles to nothing. When **on**, each emit performs a
//! single `Option` branch before dispatching.

use alloc::boxed::Box;

use crate::render::CompositeOutcome;
use crate::view::ViewId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Direction of a hover transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoverKind {
    /// The view joined the hover chain.
    In,
    /// The view left the hover chain.
    Out,
}

/// Direction of a focus transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusKind {
    /// The view gained focus.
    On,
    /// The view lost focus.
    Off,
}

/// Which window entry point was called.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchKind {
    /// [`ViewTree::dispatch_mouse_press`](crate::view::ViewTree::dispatch_mouse_press).
    MousePress,
    /// [`ViewTree::dispatch_mouse_release`](crate::view::ViewTree::dispatch_mouse_release).
    MouseRelease,
    /// [`ViewTree::dispatch_mouse_move`](crate::view::ViewTree::dispatch_mouse_move).
    MouseMove,
    /// [`ViewTree::dispatch_key_press`](crate::view::ViewTree::dispatch_key_press).
    KeyPress,
    /// [`ViewTree::dispatch_context_menu_press`](crate::view::ViewTree::dispatch_context_menu_press).
    ContextMenu,
}

/// Which geometry field a request targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryField {
    /// Size.
    Size,
    /// Position within the parent.
    Position,
    /// Visibility.
    Visibility,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every hover notification delivered to a view.
#[derive(Clone, Copy, Debug)]
pub struct HoverTraceEvent {
    /// The frame whose hover chain changed, or the window for frame-level
    /// hover.
    pub scope: ViewId,
    /// The notified view.
    pub view: ViewId,
    /// Whether the view entered or left the chain.
    pub kind: HoverKind,
}

/// Emitted for every focus notification delivered to a view.
#[derive(Clone, Copy, Debug)]
pub struct FocusTraceEvent {
    /// The frame (or window, for frame focus) owning the focus slot.
    pub scope: ViewId,
    /// The notified view.
    pub view: ViewId,
    /// Whether the view gained or lost focus.
    pub kind: FocusKind,
}

/// Emitted once per window-level dispatch call.
#[derive(Clone, Copy, Debug)]
pub struct DispatchTraceEvent {
    /// The window that received the event.
    pub window: ViewId,
    /// The entry point.
    pub kind: DispatchKind,
    /// The view whose handler returned `Finish`, if any.
    pub handled_by: Option<ViewId>,
}

/// Emitted for every geometry request that reaches the test phase.
#[derive(Clone, Copy, Debug)]
pub struct GeometryTraceEvent {
    /// The view that issued the request.
    pub source: ViewId,
    /// The view whose geometry would change.
    pub target: ViewId,
    /// Which field.
    pub field: GeometryField,
    /// The view that vetoed the request, or `None` if it was applied.
    pub vetoed_by: Option<ViewId>,
}

/// Emitted for each frame drawn through an offscreen buffer.
#[derive(Clone, Copy, Debug)]
pub struct CompositeTraceEvent {
    /// The buffered frame.
    pub frame: ViewId,
    /// What the draw pass did with its buffer.
    pub outcome: CompositeOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the view tree.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for each hover notification.
    fn on_hover(&mut self, e: &HoverTraceEvent) {
        _ = e;
    }

    /// Called for each focus notification.
    fn on_focus(&mut self, e: &FocusTraceEvent) {
        _ = e;
    }

    /// Called once per window-level dispatch.
    fn on_dispatch(&mut self, e: &DispatchTraceEvent) {
        _ = e;
    }

    /// Called for each geometry request that was tested.
    fn on_geometry(&mut self, e: &GeometryTraceEvent) {
        _ = e;
    }

    /// Called for each buffered frame in a draw pass.
    fn on_composite(&mut self, e: &CompositeTraceEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owning wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every emit compiles to nothing and
/// [`Tracer::new`] drops the sink immediately.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Removes and returns the sink, leaving a silent tracer.
    ///
    /// Always `None` without the `trace` feature.
    pub fn take(&mut self) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            self.sink.take()
        }
        #[cfg(not(feature = "trace"))]
        {
            None
        }
    }

    /// Emits a [`HoverTraceEvent`].
    #[inline]
    pub fn hover(&mut self, e: &HoverTraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_hover(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FocusTraceEvent`].
    #[inline]
    pub fn focus(&mut self, e: &FocusTraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_focus(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DispatchTraceEvent`].
    #[inline]
    pub fn dispatch(&mut self, e: &DispatchTraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dispatch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GeometryTraceEvent`].
    #[inline]
    pub fn geometry(&mut self, e: &GeometryTraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_geometry(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompositeTraceEvent`].
    #[inline]
    pub fn composite(&mut self, e: &CompositeTraceEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_composite(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
