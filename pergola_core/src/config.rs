// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-window behavior configuration.

/// How the hover engine finds the view under the cursor on pointer moves.
///
/// Both strategies produce identical hover transitions; the full scan is the
/// reference and the incremental re-check only avoids re-testing views that
/// cannot have changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HoverRecheck {
    /// Re-validate the previously hovered chain and re-descend only from the
    /// deepest node that is still the topmost hit.
    Incremental,
    /// Scan the frame from the top on every move.
    FullScan,
}

/// Configuration for a window, passed to
/// [`ViewTree::create_window`](crate::view::ViewTree::create_window).
#[derive(Clone, Copy, Debug)]
pub struct WindowConfig {
    /// Hover lookup strategy.
    pub hover: HoverRecheck,
    /// Whether a press on a focusable view focuses it before the press is
    /// delivered.
    pub click_to_focus: bool,
    /// Whether a press that lands inside a floating frame moves that frame to
    /// the top of the stack.
    pub raise_on_press: bool,
    /// Whether frames added with [`FrameFlags::floating`](crate::view::FrameFlags::floating)
    /// render through an offscreen buffer.
    pub buffer_floating_frames: bool,
    /// Number of nested clip levels the stencil buffer can hold.
    ///
    /// 255 for the common 8-bit stencil attachment.
    pub max_stencil_depth: u32,
}

impl WindowConfig {
    /// Default configuration for a desktop window.
    #[must_use]
    pub const fn desktop() -> Self {
        Self {
            hover: HoverRecheck::Incremental,
            click_to_focus: true,
            raise_on_press: true,
            buffer_floating_frames: true,
            max_stencil_depth: 255,
        }
    }

    /// Configuration with every optional behavior disabled.
    ///
    /// Useful for embedding and for tests that want to observe the raw
    /// dispatch rules.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            hover: HoverRecheck::FullScan,
            click_to_focus: false,
            raise_on_press: false,
            buffer_floating_frames: false,
            max_stencil_depth: 255,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::desktop()
    }
}
