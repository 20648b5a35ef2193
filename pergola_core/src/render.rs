// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The rendering backend contract.
//!
//! The core never produces pixels. During [`ViewTree::draw`](crate::view::ViewTree::draw)
//! it drives a [`Renderer`] through three kinds of calls:
//!
//! - stencil state changes and stencil shape fills, issued by the nested clip
//!   protocol in [`DrawCx`](crate::view::DrawCx);
//! - offscreen buffer management for buffered frames (create, bind, unbind,
//!   composite, release);
//! - content fills issued by widgets from their draw hooks.

use core::fmt;

use kurbo::{Rect, RoundedRect, Shape, Size, Vec2};

/// An opaque reference to an offscreen color + depth/stencil target owned by
/// the backend.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

impl fmt::Debug for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BufferId({})", self.0)
    }
}

/// A shape used for clipping and for filling view backgrounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipShape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A rectangle with per-corner radii.
    RoundedRect(RoundedRect),
}

impl ClipShape {
    /// Returns the bounding rectangle.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(r) => *r,
            Self::RoundedRect(rr) => rr.rect(),
        }
    }

    /// Returns whether `point` lies inside the shape.
    #[must_use]
    pub fn contains(&self, point: kurbo::Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(point),
            Self::RoundedRect(rr) => rr.contains(point),
        }
    }

    /// Returns the shape translated by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        match self {
            Self::Rect(r) => Self::Rect(*r + offset),
            Self::RoundedRect(rr) => {
                let rect = rr.rect() + offset;
                Self::RoundedRect(RoundedRect::from_rect(rect, rr.radii()))
            }
        }
    }

    /// Returns the outline as a path, for backends that tessellate.
    #[must_use]
    pub fn to_path(&self, tolerance: f64) -> kurbo::BezPath {
        match self {
            Self::Rect(r) => r.to_path(tolerance),
            Self::RoundedRect(rr) => rr.to_path(tolerance),
        }
    }
}

/// An 8-bit-per-channel straight-alpha color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Creates a color from its components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// What a stencil test writes when it passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StencilOp {
    /// Leave the stencil value unchanged; only test against it.
    Keep,
    /// Increment the stencil value where the fill lands.
    Increment,
    /// Decrement the stencil value where the fill lands.
    Decrement,
}

/// Full stencil configuration for subsequent draw calls.
///
/// Draw calls pass where the stored stencil value equals `reference`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StencilState {
    /// Whether stencil testing is active at all.
    pub enabled: bool,
    /// The value fragments must match.
    pub reference: u32,
    /// The write operation applied to passing fragments.
    pub op: StencilOp,
}

impl StencilState {
    /// Stencil testing off.
    pub const DISABLED: Self = Self {
        enabled: false,
        reference: 0,
        op: StencilOp::Keep,
    };
}

/// A backend failure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderError {
    /// The backend could not allocate an offscreen target of the given size.
    BufferAllocation(Size),
    /// The backend does not implement offscreen targets.
    Unsupported,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferAllocation(size) => {
                write!(f, "failed to allocate a {}x{} offscreen buffer", size.width, size.height)
            }
            Self::Unsupported => f.write_str("offscreen buffers are not supported"),
        }
    }
}

impl core::error::Error for RenderError {}

/// What the draw pass did for a frame that renders through a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeOutcome {
    /// The frame is not buffered; its subtree was drawn directly.
    Direct,
    /// The cached buffer was composited without redrawing.
    Cached,
    /// The subtree was redrawn into the buffer, then composited.
    Refreshed,
    /// Buffer allocation failed; the subtree was drawn directly.
    Fallback,
}

/// The capability surface the view tree draws through.
///
/// Buffer methods have defaults that report [`RenderError::Unsupported`], so
/// a backend without offscreen targets only implements the stencil and fill
/// calls and every buffered frame falls back to direct drawing.
pub trait Renderer {
    /// Sets stencil state for subsequent fills.
    fn set_stencil(&mut self, state: StencilState);

    /// Fills `shape` into the stencil plane only (no color writes), using the
    /// current stencil state.
    fn fill_stencil(&mut self, shape: &ClipShape);

    /// Fills `shape` with `color`, subject to the current stencil state.
    fn fill(&mut self, shape: &ClipShape, color: Rgba8);

    /// Allocates an offscreen target of `size` logical pixels.
    fn create_buffer(&mut self, size: Size) -> Result<BufferId, RenderError> {
        _ = size;
        Err(RenderError::Unsupported)
    }

    /// Redirects subsequent drawing into `buffer` and clears it.
    ///
    /// The buffer has its own stencil plane, cleared to zero.
    fn begin_buffer(&mut self, buffer: BufferId) {
        _ = buffer;
    }

    /// Restores drawing to the previous target.
    fn end_buffer(&mut self, buffer: BufferId) {
        _ = buffer;
    }

    /// Draws `buffer` as a single textured quad covering `dest` in the
    /// current target.
    fn composite_buffer(&mut self, buffer: BufferId, dest: Rect) {
        _ = (buffer, dest);
    }

    /// Frees an offscreen target.
    fn release_buffer(&mut self, buffer: BufferId) {
        _ = buffer;
    }
}
