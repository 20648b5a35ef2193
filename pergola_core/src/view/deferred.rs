// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Calls that reach a widget while it is running one of its own hooks.
//!
//! A widget is moved out of its slot for the duration of a hook, so the tree
//! cannot ask it anything or notify it until the hook returns. Geometry
//! requests it would have to test, and notifications it would receive, are
//! queued here instead and replayed when the hook returns. Replay goes
//! through the normal path: tests run, notifications fire, and an item whose
//! view is still inside a hook (an outer one) is queued again.

use super::geometry::Change;
use super::id::ViewId;
use super::store::ViewTree;
use crate::event::HoverEvent;
use crate::trace::{FocusKind, HoverKind};

/// A call waiting for a widget to come back from a hook.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Deferred {
    /// A full request, tests included.
    Request {
        source: ViewId,
        target: ViewId,
        change: Change,
    },
    /// The target's `*_updated` hook for a change that was already stored.
    Updated {
        source: ViewId,
        target: ViewId,
        change: Change,
    },
    /// The parent's `report_*_update` hook for a stored change.
    Report {
        parent: ViewId,
        source: ViewId,
        target: ViewId,
        change: Change,
    },
    Hover {
        view: ViewId,
        event: HoverEvent,
        kind: HoverKind,
    },
    Focus {
        view: ViewId,
        kind: FocusKind,
    },
}

impl ViewTree {
    /// Whether `id` is alive with its widget checked out by a running hook.
    pub(crate) fn in_hook(&self, id: ViewId) -> bool {
        self.is_alive(id) && self.widget[id.idx as usize].is_none()
    }

    pub(crate) fn defer(&mut self, call: Deferred) {
        self.deferred.push(call);
    }

    /// Replays every queued call once, in queue order.
    pub(crate) fn flush_deferred(&mut self) {
        let pending = core::mem::take(&mut self.deferred);
        for call in pending {
            match call {
                Deferred::Request {
                    source,
                    target,
                    change,
                } => {
                    if self.is_alive(source) && self.is_alive(target) {
                        self.request(source, target, change);
                    }
                }
                Deferred::Updated {
                    source,
                    target,
                    change,
                } => {
                    if self.is_alive(target) {
                        self.deliver_updated(source, target, change);
                    }
                }
                Deferred::Report {
                    parent,
                    source,
                    target,
                    change,
                } => {
                    if self.is_alive(parent) {
                        self.deliver_report(parent, source, target, change);
                    }
                }
                Deferred::Hover { view, event, kind } => {
                    if self.is_alive(view) {
                        self.deliver_hover(view, event, kind);
                    }
                }
                Deferred::Focus { view, kind } => {
                    if self.is_alive(view) {
                        self.deliver_focus(view, kind);
                    }
                }
            }
        }
    }

    pub(crate) fn deliver_hover(&mut self, view: ViewId, event: HoverEvent, kind: HoverKind) {
        if self.in_hook(view) {
            self.defer(Deferred::Hover { view, event, kind });
            return;
        }
        self.with_widget(view, (), |w, cx| {
            match kind {
                HoverKind::In => w.hover_in(cx, &event),
                HoverKind::Out => w.hover_out(cx, &event),
            };
        });
    }

    pub(crate) fn deliver_focus(&mut self, view: ViewId, kind: FocusKind) {
        if self.in_hook(view) {
            self.defer(Deferred::Focus { view, kind });
            return;
        }
        self.with_widget(view, (), |w, cx| {
            match kind {
                FocusKind::On => w.focus_on(cx),
                FocusKind::Off => w.focus_off(cx),
            };
        });
    }
}
