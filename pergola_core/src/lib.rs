// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode view tree with geometry negotiation, hover/focus tracking
//! and frame compositing.
//!
//! `pergola_core` owns the part of a GUI toolkit that decides *what* gets
//! drawn and *who* receives an event. Concrete widgets plug in through the
//! [`Widget`](widget::Widget) trait; pixels are produced by a backend through
//! the [`Renderer`](render::Renderer) trait. The crate is `no_std` compatible
//! (with `alloc`) and stores views in struct-of-arrays columns addressed by
//! generational handles.
//!
//! # Architecture
//!
//! ```text
//!   host input ──► ViewTree::dispatch_*(window) ──► frames, topmost first
//!                                                      │
//!                  ┌───────────────────────────────────┘
//!                  ▼
//!   hover engine / focus manager ──► Widget hooks ──► Response::{Finish, Ignore}
//!
//!   Widget::resize request ──► *_update_test (target, parent) ──► perform
//!                                                      │
//!                  ┌───────────────────────────────────┘
//!                  ▼
//!   dirty::REFRESH ──► ViewTree::draw(window) ──► offscreen buffers ──► Renderer
//! ```
//!
//! **[`view`]**: The arena ([`ViewTree`](view::ViewTree)) and everything
//! that walks it: topology, the geometry update protocol, hit-testing and
//! hover, focus, frames and windows, event dispatch, and the draw pass.
//!
//! **[`widget`]**: The capability set every concrete widget implements.
//!
//! **[`layout`]**: The linear distribution algorithm and the
//! [`LinearLayout`](layout::LinearLayout) container built on it.
//!
//! **[`render`]**: The backend contract: offscreen buffers, stencil state,
//! clip shapes.
//!
//! **[`dirty`]**: Invalidation channels via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! dispatch instrumentation.
//!
//! # Threading
//!
//! Everything here runs on the UI thread. No operation blocks or suspends;
//! handlers may destroy views (including themselves) mid-dispatch, and the
//! dispatch code re-checks liveness after every handler call.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod dirty;
pub mod error;
pub mod event;
pub mod layout;
pub mod render;
pub mod trace;
pub mod view;
pub mod widget;

#[cfg(test)]
pub(crate) mod testing;
