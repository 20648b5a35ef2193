// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a shared
//! byte buffer as fixed-size little-endian records. The sink is usually moved
//! into a [`ViewTree`](pergola_core::view::ViewTree), so the bytes are read
//! back through a [`Recording`] handle taken beforehand. [`decode`] turns
//! them into an iterator of [`RecordedEvent`].

use std::cell::RefCell;
use std::rc::Rc;

use pergola_core::render::CompositeOutcome;
use pergola_core::trace::{
    CompositeTraceEvent, DispatchKind, DispatchTraceEvent, FocusKind, FocusTraceEvent,
    GeometryField, GeometryTraceEvent, HoverKind, HoverTraceEvent, TraceSink,
};
use pergola_core::view::ViewId;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_HOVER: u8 = 1;
const TAG_FOCUS: u8 = 2;
const TAG_DISPATCH: u8 = 3;
const TAG_GEOMETRY: u8 = 4;
const TAG_COMPOSITE: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A read handle on the bytes written by a [`RecorderSink`].
#[derive(Clone, Debug, Default)]
pub struct Recording(Rc<RefCell<Vec<u8>>>);

impl Recording {
    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    /// Number of recorded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Recording,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that keeps reading the buffer after the sink has been
    /// handed to a tree.
    #[must_use]
    pub fn recording(&self) -> Recording {
        self.buf.clone()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.to_bytes()
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.0.borrow_mut().push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.0.borrow_mut().extend_from_slice(&v.to_le_bytes());
    }

    fn write_view(&mut self, v: ViewId) {
        self.write_u32(v.index());
        self.write_u32(v.generation());
    }

    fn write_option_view(&mut self, v: Option<ViewId>) {
        match v {
            Some(view) => {
                self.write_u8(1);
                self.write_view(view);
            }
            None => {
                self.write_u8(0);
                self.write_u32(0);
                self.write_u32(0);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_hover(&mut self, e: &HoverTraceEvent) {
        self.write_u8(TAG_HOVER);
        self.write_view(e.scope);
        self.write_view(e.view);
        self.write_u8(u8::from(e.kind == HoverKind::In));
    }

    fn on_focus(&mut self, e: &FocusTraceEvent) {
        self.write_u8(TAG_FOCUS);
        self.write_view(e.scope);
        self.write_view(e.view);
        self.write_u8(u8::from(e.kind == FocusKind::On));
    }

    fn on_dispatch(&mut self, e: &DispatchTraceEvent) {
        self.write_u8(TAG_DISPATCH);
        self.write_view(e.window);
        self.write_u8(match e.kind {
            DispatchKind::MousePress => 0,
            DispatchKind::MouseRelease => 1,
            DispatchKind::MouseMove => 2,
            DispatchKind::KeyPress => 3,
            DispatchKind::ContextMenu => 4,
        });
        self.write_option_view(e.handled_by);
    }

    fn on_geometry(&mut self, e: &GeometryTraceEvent) {
        self.write_u8(TAG_GEOMETRY);
        self.write_view(e.source);
        self.write_view(e.target);
        self.write_u8(match e.field {
            GeometryField::Size => 0,
            GeometryField::Position => 1,
            GeometryField::Visibility => 2,
        });
        self.write_option_view(e.vetoed_by);
    }

    fn on_composite(&mut self, e: &CompositeTraceEvent) {
        self.write_u8(TAG_COMPOSITE);
        self.write_view(e.frame);
        self.write_u8(match e.outcome {
            CompositeOutcome::Direct => 0,
            CompositeOutcome::Cached => 1,
            CompositeOutcome::Refreshed => 2,
            CompositeOutcome::Fallback => 3,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A view handle as stored in a recording.
///
/// Live [`ViewId`]s can only be minted by a tree, so decoded events carry the
/// raw slot index and generation instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewRef {
    /// Arena slot.
    pub index: u32,
    /// Slot generation at the time of the event.
    pub generation: u32,
}

impl From<ViewId> for ViewRef {
    fn from(id: ViewId) -> Self {
        Self {
            index: id.index(),
            generation: id.generation(),
        }
    }
}

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`HoverTraceEvent`].
    Hover {
        /// Frame or window owning the hover chain.
        scope: ViewRef,
        /// The notified view.
        view: ViewRef,
        /// Direction.
        kind: HoverKind,
    },
    /// A [`FocusTraceEvent`].
    Focus {
        /// Frame or window owning the focus slot.
        scope: ViewRef,
        /// The notified view.
        view: ViewRef,
        /// Direction.
        kind: FocusKind,
    },
    /// A [`DispatchTraceEvent`].
    Dispatch {
        /// The receiving window.
        window: ViewRef,
        /// The entry point.
        kind: DispatchKind,
        /// The consuming view, if any.
        handled_by: Option<ViewRef>,
    },
    /// A [`GeometryTraceEvent`].
    Geometry {
        /// Requesting view.
        source: ViewRef,
        /// View whose geometry would change.
        target: ViewRef,
        /// Which field.
        field: GeometryField,
        /// The vetoing view, if any.
        vetoed_by: Option<ViewRef>,
    },
    /// A [`CompositeTraceEvent`].
    Composite {
        /// The buffered frame.
        frame: ViewRef,
        /// What the draw pass did.
        outcome: CompositeOutcome,
    },
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated or unrecognized record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let bytes = self.data.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    fn read_view(&mut self) -> Option<ViewRef> {
        Some(ViewRef {
            index: self.read_u32()?,
            generation: self.read_u32()?,
        })
    }

    fn read_option_view(&mut self) -> Option<Option<ViewRef>> {
        let present = self.read_u8()?;
        let view = self.read_view()?;
        Some((present != 0).then_some(view))
    }

    fn read_event(&mut self) -> Option<RecordedEvent> {
        let event = match self.read_u8()? {
            TAG_HOVER => RecordedEvent::Hover {
                scope: self.read_view()?,
                view: self.read_view()?,
                kind: if self.read_u8()? != 0 {
                    HoverKind::In
                } else {
                    HoverKind::Out
                },
            },
            TAG_FOCUS => RecordedEvent::Focus {
                scope: self.read_view()?,
                view: self.read_view()?,
                kind: if self.read_u8()? != 0 {
                    FocusKind::On
                } else {
                    FocusKind::Off
                },
            },
            TAG_DISPATCH => RecordedEvent::Dispatch {
                window: self.read_view()?,
                kind: match self.read_u8()? {
                    0 => DispatchKind::MousePress,
                    1 => DispatchKind::MouseRelease,
                    2 => DispatchKind::MouseMove,
                    3 => DispatchKind::KeyPress,
                    4 => DispatchKind::ContextMenu,
                    _ => return None,
                },
                handled_by: self.read_option_view()?,
            },
            TAG_GEOMETRY => RecordedEvent::Geometry {
                source: self.read_view()?,
                target: self.read_view()?,
                field: match self.read_u8()? {
                    0 => GeometryField::Size,
                    1 => GeometryField::Position,
                    2 => GeometryField::Visibility,
                    _ => return None,
                },
                vetoed_by: self.read_option_view()?,
            },
            TAG_COMPOSITE => RecordedEvent::Composite {
                frame: self.read_view()?,
                outcome: match self.read_u8()? {
                    0 => CompositeOutcome::Direct,
                    1 => CompositeOutcome::Cached,
                    2 => CompositeOutcome::Refreshed,
                    3 => CompositeOutcome::Fallback,
                    _ => return None,
                },
            },
            _ => return None,
        };
        Some(event)
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        let event = self.read_event();
        if event.is_none() {
            self.pos = self.data.len();
        }
        event
    }
}
