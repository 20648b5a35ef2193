// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational view handles.

use core::fmt;

/// Link value meaning "no parent", "no sibling" or "no child".
pub const INVALID: u32 = u32::MAX;

/// Names one view of a [`ViewTree`](super::ViewTree).
///
/// Windows and frames are views too, so the same handle addresses all three.
/// The tree bumps a slot's generation when its view is destroyed. Any
/// `ViewId` kept across calls (a hover chain leaf, the focused view, the
/// frame holding pointer capture) therefore never aliases a newer view in the
/// same slot; [`ViewTree::is_alive`](super::ViewTree::is_alive) says whether
/// it still refers to anything.
///
/// Ordering follows slot index, then generation. It is stable but says
/// nothing about tree order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ViewId {
    #[inline]
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// The slot the view lives in. Slots are recycled, so this alone does not
    /// identify a view.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// How many views occupied the slot before this one.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "View({}:{})", self.idx, self.generation)
    }
}
