// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for pergola dispatch
//! diagnostics.
//!
//! This crate provides [`TraceSink`](pergola_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//! - [`fanout::FanOutSink`]: forwards every event to several sinks, since a
//!   [`ViewTree`](pergola_core::view::ViewTree) holds only one.

pub mod chrome;
pub mod fanout;
pub mod pretty;
pub mod recorder;
