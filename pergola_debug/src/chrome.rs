// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! The view tree has no clock, so event timestamps are sequence numbers: the
//! n-th recorded event lands at `n` microseconds. Events are instants, grouped
//! into tracks (`pid`) by the slot index of the frame, window or view they
//! concern.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use pergola_core::trace::{FocusKind, HoverKind};

use crate::pretty::{dispatch_name, field_name, outcome_name};
use crate::recorder::{RecordedEvent, ViewRef, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::Hover { scope, view, kind } => {
                let name = match kind {
                    HoverKind::In => "HoverIn",
                    HoverKind::Out => "HoverOut",
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Hover",
                    "ts": ts,
                    "pid": scope.index,
                    "tid": 0,
                    "s": "t",
                    "args": { "scope": label(scope), "view": label(view) }
                }));
            }
            RecordedEvent::Focus { scope, view, kind } => {
                let name = match kind {
                    FocusKind::On => "FocusOn",
                    FocusKind::Off => "FocusOff",
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Focus",
                    "ts": ts,
                    "pid": scope.index,
                    "tid": 0,
                    "s": "t",
                    "args": { "scope": label(scope), "view": label(view) }
                }));
            }
            RecordedEvent::Dispatch {
                window,
                kind,
                handled_by,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": dispatch_name(kind),
                    "cat": "Dispatch",
                    "ts": ts,
                    "pid": window.index,
                    "tid": 0,
                    "s": "p",
                    "args": { "handled_by": handled_by.map(label) }
                }));
            }
            RecordedEvent::Geometry {
                source,
                target,
                field,
                vetoed_by,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": field_name(field),
                    "cat": "Geometry",
                    "ts": ts,
                    "pid": target.index,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "source": label(source),
                        "target": label(target),
                        "vetoed_by": vetoed_by.map(label),
                    }
                }));
            }
            RecordedEvent::Composite { frame, outcome } => {
                events.push(json!({
                    "ph": "i",
                    "name": outcome_name(outcome),
                    "cat": "Composite",
                    "ts": ts,
                    "pid": frame.index,
                    "tid": 0,
                    "s": "t",
                    "args": { "frame": label(frame) }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn label(v: ViewRef) -> String {
    format!("{}:{}", v.index, v.generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use pergola_core::render::CompositeOutcome;
    use pergola_core::trace::{
        CompositeTraceEvent, DispatchKind, DispatchTraceEvent, HoverTraceEvent, TraceSink,
    };
    use pergola_core::view::ViewTree;

    #[test]
    fn export_produces_valid_json() {
        let mut tree = ViewTree::new();
        let (w, v) = (tree.create_view(()), tree.create_view(()));
        let mut rec = RecorderSink::new();
        rec.on_hover(&HoverTraceEvent {
            scope: w,
            view: v,
            kind: HoverKind::In,
        });
        rec.on_dispatch(&DispatchTraceEvent {
            window: w,
            kind: DispatchKind::MousePress,
            handled_by: None,
        });
        rec.on_composite(&CompositeTraceEvent {
            frame: v,
            outcome: CompositeOutcome::Cached,
        });

        let mut out = Vec::new();
        export(&rec.to_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["name"], "HoverIn");
        assert_eq!(parsed[0]["ts"], 0);

        assert_eq!(parsed[1]["cat"], "Dispatch");
        assert_eq!(parsed[1]["name"], "press");
        assert!(parsed[1]["args"]["handled_by"].is_null());

        assert_eq!(parsed[2]["name"], "cached");
        assert_eq!(parsed[2]["ts"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
