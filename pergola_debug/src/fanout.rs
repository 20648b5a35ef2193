// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding one event stream to several sinks.

use pergola_core::trace::{
    CompositeTraceEvent, DispatchTraceEvent, FocusTraceEvent, GeometryTraceEvent,
    HoverTraceEvent, TraceSink,
};

/// A [`TraceSink`] that forwards every event to each inner sink, in the order
/// they were added.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Box<dyn TraceSink>>,
}

impl std::fmt::Debug for FanOutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl FanOutSink {
    /// Creates a sink with no outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an output.
    #[must_use]
    pub fn with(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl TraceSink for FanOutSink {
    fn on_hover(&mut self, e: &HoverTraceEvent) {
        for s in &mut self.sinks {
            s.on_hover(e);
        }
    }

    fn on_focus(&mut self, e: &FocusTraceEvent) {
        for s in &mut self.sinks {
            s.on_focus(e);
        }
    }

    fn on_dispatch(&mut self, e: &DispatchTraceEvent) {
        for s in &mut self.sinks {
            s.on_dispatch(e);
        }
    }

    fn on_geometry(&mut self, e: &GeometryTraceEvent) {
        for s in &mut self.sinks {
            s.on_geometry(e);
        }
    }

    fn on_composite(&mut self, e: &CompositeTraceEvent) {
        for s in &mut self.sinks {
            s.on_composite(e);
        }
    }
}
