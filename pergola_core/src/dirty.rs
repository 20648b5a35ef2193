// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation channel constants.
//!
//! Pergola uses multi-channel dirty tracking (via [`understory_dirty`]) to
//! carry "this needs redrawing" information from a changed view to the
//! containers whose cached output depends on it.
//!
//! # Propagation semantics
//!
//! - **Upward**: [`REFRESH`] has a dependency edge from every parent to each
//!   of its children and is marked with
//!   [`EagerPolicy`](understory_dirty::EagerPolicy). Marking a view
//!   therefore marks its whole ancestor chain, which is how a change deep in
//!   a buffered frame reaches that frame's offscreen cache.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on the parent of every
//!   insert/remove and on created or destroyed views. It is local-only.
//!
//! # Consumption
//!
//! [`ViewTree::collect_changes`](crate::view::ViewTree::collect_changes)
//! drains both channels into a [`TreeChanges`](crate::view::TreeChanges);
//! [`ViewTree::draw`](crate::view::ViewTree::draw) calls it before painting
//! and flags the offscreen buffers of every refreshed frame.

use understory_dirty::Channel;

/// Drawn content changed. Propagates to every ancestor.
pub const REFRESH: Channel = Channel::new(0);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(1);
