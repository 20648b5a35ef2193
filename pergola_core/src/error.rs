// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural error type for tree mutations.

use core::fmt;

use crate::view::ViewId;

/// A rejected structural tree operation.
///
/// Every operation that returns this error leaves the tree unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// A view was asked to become its own child.
    SelfInsertion(ViewId),
    /// The child is already attached to a parent; detach it first.
    AlreadyAttached {
        /// The child being inserted.
        child: ViewId,
        /// Its current parent.
        parent: ViewId,
    },
    /// The view is not a child of the given parent.
    NotAChild {
        /// The supposed parent.
        parent: ViewId,
        /// The view that is not its child.
        child: ViewId,
    },
    /// Inserting would make a view its own ancestor.
    WouldCycle {
        /// The would-be parent.
        parent: ViewId,
        /// The child, which is an ancestor of `parent`.
        child: ViewId,
    },
    /// The operation requires a frame.
    NotAFrame(ViewId),
    /// The operation requires a window.
    NotAWindow(ViewId),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfInsertion(id) => write!(f, "{id:?} cannot be inserted into itself"),
            Self::AlreadyAttached { child, parent } => {
                write!(f, "{child:?} is already attached to {parent:?}")
            }
            Self::NotAChild { parent, child } => {
                write!(f, "{child:?} is not a child of {parent:?}")
            }
            Self::WouldCycle { parent, child } => {
                write!(f, "inserting {child:?} into {parent:?} would create a cycle")
            }
            Self::NotAFrame(id) => write!(f, "{id:?} is not a frame"),
            Self::NotAWindow(id) => write!(f, "{id:?} is not a window"),
        }
    }
}

impl core::error::Error for TreeError {}
