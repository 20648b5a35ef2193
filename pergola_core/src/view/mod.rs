// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View tree data model.
//!
//! A *view* is a node in the retained UI tree. Each view has:
//!
//! - An identity ([`ViewId`]): a generational handle that becomes stale when
//!   the view is destroyed, so no operation can reach freed storage.
//! - Topology: parent, first/last child and sibling links forming an ordered
//!   tree. Child order is paint order; the last child is on top.
//! - **Geometry** negotiated through the update protocol:
//!   [`position`](ViewTree::position), [`size`](ViewTree::size) and
//!   [`visibility`](ViewTree::is_visible), plus a scroll
//!   [`offset`](ViewTree::offset) and [round corners](RoundCorners).
//! - **Interaction state** ([`ViewState`]) owned by the hover engine, the
//!   focus manager and pointer capture.
//! - A boxed [`Widget`](crate::widget::Widget) supplying behavior.
//!
//! Windows are root views whose children are *frames*. Frames carry the
//! per-frame hover chain, focused view and pointer capture, and may render
//! through an offscreen buffer.
//!
//! # Dirty tracking
//!
//! Mutations mark [`dirty`](crate::dirty) channels:
//!
//! - **REFRESH**: drawn content changed. Propagates to every ancestor, which
//!   is how a buffered frame learns that its cache is stale.
//! - **TOPOLOGY**: structural change (insert, remove, create, destroy).
//!
//! [`ViewTree::collect_changes`] and [`ViewTree::draw`] drain them.

mod changes;
mod deferred;
mod dispatch;
mod draw;
mod focus;
mod frame;
mod geometry;
mod hover;
mod id;
mod store;
mod traverse;

pub use changes::TreeChanges;
pub use draw::{DrawCx, DrawReport, StencilStack};
pub use frame::{CursorShape, FrameFlags};
pub use geometry::{
    PositionUpdateRequest, RoundCorners, SizeUpdateRequest, UpdateRequest,
    VisibilityUpdateRequest,
};
pub use id::{INVALID, ViewId};
pub use store::{ViewCx, ViewFlags, ViewState, ViewTree};
pub use traverse::{Ancestors, Children, ChildrenRev};
