// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use pergola_core::render::CompositeOutcome;
use pergola_core::trace::{
    CompositeTraceEvent, DispatchKind, DispatchTraceEvent, FocusKind, FocusTraceEvent,
    GeometryField, GeometryTraceEvent, HoverKind, HoverTraceEvent, TraceSink,
};
use pergola_core::view::ViewId;

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    lines: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, lines: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        self.lines += 1;
        let _ = writeln!(self.writer, "{args}");
    }
}

/// Short `index:generation` form used in every line.
pub(crate) fn short(id: ViewId) -> String {
    format!("{}:{}", id.index(), id.generation())
}

pub(crate) fn dispatch_name(kind: DispatchKind) -> &'static str {
    match kind {
        DispatchKind::MousePress => "press",
        DispatchKind::MouseRelease => "release",
        DispatchKind::MouseMove => "move",
        DispatchKind::KeyPress => "key",
        DispatchKind::ContextMenu => "menu",
    }
}

pub(crate) fn field_name(field: GeometryField) -> &'static str {
    match field {
        GeometryField::Size => "size",
        GeometryField::Position => "position",
        GeometryField::Visibility => "visibility",
    }
}

pub(crate) fn outcome_name(outcome: CompositeOutcome) -> &'static str {
    match outcome {
        CompositeOutcome::Direct => "direct",
        CompositeOutcome::Cached => "cached",
        CompositeOutcome::Refreshed => "refreshed",
        CompositeOutcome::Fallback => "FALLBACK",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_hover(&mut self, e: &HoverTraceEvent) {
        let dir = match e.kind {
            HoverKind::In => "in",
            HoverKind::Out => "out",
        };
        self.line(format_args!(
            "[hover:{dir}] scope={} view={}",
            short(e.scope),
            short(e.view),
        ));
    }

    fn on_focus(&mut self, e: &FocusTraceEvent) {
        let dir = match e.kind {
            FocusKind::On => "on",
            FocusKind::Off => "off",
        };
        self.line(format_args!(
            "[focus:{dir}] scope={} view={}",
            short(e.scope),
            short(e.view),
        ));
    }

    fn on_dispatch(&mut self, e: &DispatchTraceEvent) {
        let handled = e.handled_by.map_or_else(|| "-".to_owned(), short);
        self.line(format_args!(
            "[dispatch] window={} {} handled_by={handled}",
            short(e.window),
            dispatch_name(e.kind),
        ));
    }

    fn on_geometry(&mut self, e: &GeometryTraceEvent) {
        let verdict = match e.vetoed_by {
            Some(v) => format!("VETOED by {}", short(v)),
            None => "applied".to_owned(),
        };
        self.line(format_args!(
            "[geometry] {} source={} target={} {verdict}",
            field_name(e.field),
            short(e.source),
            short(e.target),
        ));
    }

    fn on_composite(&mut self, e: &CompositeTraceEvent) {
        self.line(format_args!(
            "[composite] frame={} {}",
            short(e.frame),
            outcome_name(e.outcome),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pergola_core::view::ViewTree;

    fn ids() -> (ViewId, ViewId) {
        let mut tree = ViewTree::new();
        (tree.create_view(()), tree.create_view(()))
    }

    #[test]
    fn pretty_print_hover() {
        let (a, b) = ids();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_hover(&HoverTraceEvent {
            scope: a,
            view: b,
            kind: HoverKind::In,
        });
        assert_eq!(sink.lines(), 1);
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.starts_with("[hover:in]"), "got: {output}");
        assert!(output.contains(&format!("view={}", short(b))), "got: {output}");
    }

    #[test]
    fn pretty_print_veto() {
        let (a, b) = ids();
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_geometry(&GeometryTraceEvent {
            source: b,
            target: b,
            field: GeometryField::Size,
            vetoed_by: Some(a),
        });
        sink.on_dispatch(&DispatchTraceEvent {
            window: a,
            kind: DispatchKind::KeyPress,
            handled_by: None,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(&format!("VETOED by {}", short(a))), "got: {output}");
        assert!(lines[1].contains("key handled_by=-"), "got: {output}");
    }
}
