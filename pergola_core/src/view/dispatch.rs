// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing window input to frames and views.
//!
//! Every entry point walks the window's frames from the top-most down and
//! stops at the first one that answers [`Response::Finish`]. While a frame
//! handles the event, it is the window's
//! [`active_frame`](ViewTree::active_frame).
//!
//! Inside a frame, pointer events go to the top-most child containing the
//! point, recursively; a view's own hook runs after its children ignored the
//! event. The frame's own hook runs last, even when the point lies outside
//! the frame.
//!
//! Handlers may destroy any view, including themselves and their frame.
//! Every step re-checks liveness and parentage before calling the next hook.

use alloc::vec::Vec;

use kurbo::Point;

use super::id::{INVALID, ViewId};
use super::store::{ViewCx, ViewTree};
use crate::error::TreeError;
use crate::event::{ContextMenuEvent, KeyEvent, MouseEvent, Response};
use crate::trace::{DispatchKind, DispatchTraceEvent};
use crate::widget::Widget;

type Hook<'h> = dyn FnMut(&mut dyn Widget, &mut ViewCx<'_>, Point) -> Response + 'h;

impl ViewTree {
    /// Delivers a mouse press.
    ///
    /// Before delivery the hover state is updated, a floating frame under
    /// the cursor is raised if the window is configured to, and click-to-focus
    /// moves focus to the nearest focusable view under the cursor. The view
    /// that consumes the press captures the pointer until the next release.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn dispatch_mouse_press(
        &mut self,
        window: ViewId,
        event: &MouseEvent,
    ) -> Result<Response, TreeError> {
        let config = self.window_config(window)?;
        self.update_hover(window, event.position)?;
        self.window_data_mut(window)?.button_down = true;

        if let Some(frame) = self.frame_at(window.idx, event.position) {
            let flags = self.frame_data(frame)?.flags;
            if config.raise_on_press && flags.floating {
                self.move_frame_to_top(frame)?;
            }
            if config.click_to_focus && self.is_alive(frame) {
                self.click_to_focus(window, frame, event.position)?;
            }
        }

        let frames = self.frame_stack(window.idx);
        let mut captured = None;
        let response = self.walk_frames(window, DispatchKind::MousePress, frames, |tree, frame| {
            let consumer = tree.deliver_pointer(frame, event.position, None, &mut |w, cx, local| {
                w.mouse_press(cx, &event.at_local(local))
            });
            if let Some(view) = consumer {
                captured = Some((frame, view));
            }
            consumer
        })?;

        if let Some((frame, view)) = captured
            && self.is_alive(frame)
            && self.is_alive(view)
        {
            self.release_capture(window);
            if let Some(data) = self.frame[frame.idx as usize].as_mut() {
                data.pressed = Some(view);
            }
            self.set_pressed_bit(view.idx, true);
            self.window_data_mut(window)?.pressed_frame = Some(frame);
        }
        Ok(response)
    }

    /// Delivers a mouse release.
    ///
    /// The view holding capture hears it first, wherever the pointer is. If
    /// it ignores the release, the frames are walked as usual. Capture ends
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn dispatch_mouse_release(
        &mut self,
        window: ViewId,
        event: &MouseEvent,
    ) -> Result<Response, TreeError> {
        self.update_hover(window, event.position)?;
        self.window_data_mut(window)?.button_down = false;

        let captured = self.captured(window);
        let mut response = Response::Ignore;
        if let Some((frame, view)) = captured {
            response = self.walk_frames(
                window,
                DispatchKind::MouseRelease,
                alloc::vec![frame],
                |tree, _| {
                    let local = event.position - tree.origin_vec(view.idx);
                    let r = tree.with_widget(view, Response::Ignore, |w, cx| {
                        w.mouse_release(cx, &event.at_local(local))
                    });
                    r.is_finish().then_some(view)
                },
            )?;
        }
        if !response.is_finish() {
            let frames = self.frame_stack(window.idx);
            let skip = captured.map(|(_, view)| view);
            response = self.walk_frames(window, DispatchKind::MouseRelease, frames, |tree, frame| {
                tree.deliver_pointer(frame, event.position, skip, &mut |w, cx, local| {
                    w.mouse_release(cx, &event.at_local(local))
                })
            })?;
        }

        if self.is_alive(window) {
            self.release_capture(window);
        }
        Ok(response)
    }

    /// Delivers a mouse move.
    ///
    /// The hover engine always runs first, whether or not anything consumes
    /// the move. While a view holds capture, only that view hears it.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn dispatch_mouse_move(
        &mut self,
        window: ViewId,
        event: &MouseEvent,
    ) -> Result<Response, TreeError> {
        self.update_hover(window, event.position)?;

        if let Some((frame, view)) = self.captured(window) {
            return self.walk_frames(
                window,
                DispatchKind::MouseMove,
                alloc::vec![frame],
                |tree, _| {
                    let local = event.position - tree.origin_vec(view.idx);
                    let r = tree.with_widget(view, Response::Ignore, |w, cx| {
                        w.mouse_move(cx, &event.at_local(local))
                    });
                    r.is_finish().then_some(view)
                },
            );
        }

        let frames = self.frame_stack(window.idx);
        self.walk_frames(window, DispatchKind::MouseMove, frames, |tree, frame| {
            tree.deliver_pointer(frame, event.position, None, &mut |w, cx, local| {
                w.mouse_move(cx, &event.at_local(local))
            })
        })
    }

    /// Delivers a key press.
    ///
    /// Goes to the focused frame if there is one, otherwise to each frame
    /// from the top. Within a frame, the focused view hears it first and the
    /// frame's own hook runs if that view ignored it. Views in between are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn dispatch_key_press(
        &mut self,
        window: ViewId,
        event: &KeyEvent,
    ) -> Result<Response, TreeError> {
        let frames = match self.window_data(window)?.focused_frame {
            Some(frame) => alloc::vec![frame],
            None => self.frame_stack(window.idx),
        };
        self.walk_frames(window, DispatchKind::KeyPress, frames, |tree, frame| {
            let focused = tree.frame[frame.idx as usize]
                .as_ref()
                .and_then(|f| f.focused)
                .filter(|&v| v != frame);
            if let Some(view) = focused {
                let r = tree.with_widget(view, Response::Ignore, |w, cx| w.key_press(cx, event));
                if r.is_finish() {
                    return Some(view);
                }
            }
            let r = tree.with_widget(frame, Response::Ignore, |w, cx| w.key_press(cx, event));
            r.is_finish().then_some(frame)
        })
    }

    /// Delivers a context-menu request.
    ///
    /// In each frame from the top, the event starts at the focused view (or,
    /// without one, the deepest view under the cursor) and bubbles outward
    /// through every ancestor up to and including the frame.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn dispatch_context_menu_press(
        &mut self,
        window: ViewId,
        event: &ContextMenuEvent,
    ) -> Result<Response, TreeError> {
        let frames = self.frame_stack(window.idx);
        self.walk_frames(window, DispatchKind::ContextMenu, frames, |tree, frame| {
            let focused = tree.frame[frame.idx as usize]
                .as_ref()
                .and_then(|f| f.focused)
                .filter(|&v| tree.is_alive(v));
            let start = focused.map(|v| v.idx).or_else(|| {
                let local = event.position - tree.origin_vec(frame.idx);
                tree.scan_path(frame.idx, local).last().copied()
            });
            let mut cur = start.unwrap_or(frame.idx);
            loop {
                let view = tree.id_at(cur);
                // Captured before the hook; it may detach or destroy `view`.
                let parent = tree.parent[cur as usize];
                let r = tree.with_widget(view, Response::Ignore, |w, cx| {
                    w.context_menu_press(cx, event)
                });
                if r.is_finish() {
                    return Some(view);
                }
                if cur == frame.idx || parent == INVALID || !tree.is_alive(frame) {
                    return None;
                }
                if !tree.in_subtree(frame.idx, parent) {
                    return None;
                }
                cur = parent;
            }
        })
    }

    /// The frames of `window`, top-most first.
    fn frame_stack(&self, window: u32) -> Vec<ViewId> {
        let mut frames = Vec::new();
        let mut cur = self.last_child[window as usize];
        while cur != INVALID {
            if self.frame[cur as usize].is_some() {
                frames.push(self.id_at(cur));
            }
            cur = self.prev_sibling[cur as usize];
        }
        frames
    }

    /// Runs `per_frame` on each frame until one returns the consuming view.
    fn walk_frames(
        &mut self,
        window: ViewId,
        kind: DispatchKind,
        frames: Vec<ViewId>,
        mut per_frame: impl FnMut(&mut Self, ViewId) -> Option<ViewId>,
    ) -> Result<Response, TreeError> {
        self.window_data(window)?;
        let mut handled_by = None;
        for frame in frames {
            if !self.is_alive(window) {
                break;
            }
            if !self.is_alive(frame)
                || self.parent[frame.idx as usize] != window.idx
                || !self.visible[frame.idx as usize]
            {
                continue;
            }
            self.window_data_mut(window)?.active_frame = Some(frame);
            let consumer = per_frame(self, frame);
            if let Some(data) = self.window[window.idx as usize].as_deref_mut() {
                data.active_frame = None;
            }
            if consumer.is_some() {
                handled_by = consumer;
                break;
            }
        }
        self.tracer.dispatch(&DispatchTraceEvent {
            window,
            kind,
            handled_by,
        });
        Ok(if handled_by.is_some() {
            Response::Finish
        } else {
            Response::Ignore
        })
    }

    /// Delivers a pointer event inside `frame`. Returns the consuming view.
    fn deliver_pointer(
        &mut self,
        frame: ViewId,
        position: Point,
        skip: Option<ViewId>,
        hook: &mut Hook<'_>,
    ) -> Option<ViewId> {
        let local = position - self.origin_vec(frame.idx);
        let inside = self.contains_at(frame.idx, local);
        self.deliver(frame, local, inside, skip, hook)
    }

    fn deliver(
        &mut self,
        view: ViewId,
        local: Point,
        descend: bool,
        skip: Option<ViewId>,
        hook: &mut Hook<'_>,
    ) -> Option<ViewId> {
        if descend {
            let inner = local - self.offset[view.idx as usize];
            let children: Vec<ViewId> = self.children_rev(view).collect();
            for child in children {
                let c = child.idx as usize;
                if !self.is_alive(view)
                    || !self.is_alive(child)
                    || self.parent[c] != view.idx
                    || !self.visible[c]
                {
                    continue;
                }
                let p = inner - self.position[c].to_vec2();
                if !self.contains_at(child.idx, p) {
                    continue;
                }
                if let Some(consumer) = self.deliver(child, p, true, skip, hook) {
                    return Some(consumer);
                }
            }
        }
        if Some(view) == skip {
            return None;
        }
        let response = self.with_widget(view, Response::Ignore, |w, cx| hook(w, cx, local));
        response.is_finish().then_some(view)
    }

    fn click_to_focus(
        &mut self,
        window: ViewId,
        frame: ViewId,
        position: Point,
    ) -> Result<(), TreeError> {
        if self.frame_data(frame)?.flags.focusable {
            self.set_focused_frame(window, Some(frame))?;
        }
        if !self.is_alive(frame) {
            return Ok(());
        }
        let local = position - self.origin_vec(frame.idx);
        let target = self
            .scan_path(frame.idx, local)
            .last()
            .and_then(|&leaf| self.focus_target(frame.idx, leaf));
        if let Some(target) = target {
            self.set_focused_view(frame, Some(target))?;
        }
        Ok(())
    }

    /// The frame and view holding capture, if both are still alive.
    fn captured(&self, window: ViewId) -> Option<(ViewId, ViewId)> {
        let frame = self.window[window.idx as usize]
            .as_deref()?
            .pressed_frame
            .filter(|&f| self.is_alive(f))?;
        let view = self.frame[frame.idx as usize]
            .as_ref()?
            .pressed
            .filter(|&v| self.is_alive(v))?;
        Some((frame, view))
    }

    fn release_capture(&mut self, window: ViewId) {
        let Some(frame) = self.window[window.idx as usize]
            .as_deref_mut()
            .and_then(|w| w.pressed_frame.take())
        else {
            return;
        };
        if !self.is_alive(frame) {
            return;
        }
        let pressed = self.frame[frame.idx as usize]
            .as_mut()
            .and_then(|f| f.pressed.take());
        if let Some(view) = pressed
            && self.is_alive(view)
        {
            self.set_pressed_bit(view.idx, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Size;

    use super::*;
    use crate::config::WindowConfig;
    use crate::event::{Key, MouseButton};
    use crate::testing::{Log, Scripted};
    use crate::view::{FrameFlags, ViewFlags};

    fn press(x: f64, y: f64) -> MouseEvent {
        MouseEvent::new(Point::new(x, y), MouseButton::Left)
    }

    fn window(config: WindowConfig) -> (ViewTree, ViewId) {
        let mut tree = ViewTree::new();
        let w = tree.create_window(Size::new(400.0, 400.0), config);
        (tree, w)
    }

    fn frame(
        tree: &mut ViewTree,
        w: ViewId,
        widget: Scripted,
        flags: FrameFlags,
        origin: Point,
        size: Size,
    ) -> ViewId {
        let f = tree.create_frame(widget, flags);
        tree.add_frame(w, f).unwrap();
        tree.set_child_geometry(w, f, origin, size);
        f
    }

    fn child(tree: &mut ViewTree, parent: ViewId, widget: Scripted, origin: Point, size: Size) -> ViewId {
        let v = tree.create_view(widget);
        tree.push_back(parent, v).unwrap();
        tree.set_child_geometry(parent, v, origin, size);
        v
    }

    #[test]
    fn frames_are_tried_top_most_first() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let size = Size::new(50.0, 50.0);
        let flags = FrameFlags::default();
        frame(&mut tree, w, Scripted::new("A", &log), flags, Point::ZERO, size);
        frame(&mut tree, w, Scripted::new("B", &log), flags, Point::new(100.0, 0.0), size);
        frame(&mut tree, w, Scripted::new("C", &log), flags, Point::new(200.0, 0.0), size);
        let _ = log.take();

        let r = tree.dispatch_mouse_press(w, &press(10.0, 10.0)).unwrap();
        assert_eq!(r, Response::Ignore);
        assert_eq!(log.take(), vec!["A.hover_in", "C.press", "B.press", "A.press"]);
    }

    #[test]
    fn finish_stops_the_walk() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let size = Size::new(100.0, 100.0);
        let flags = FrameFlags::default();
        let bottom = frame(&mut tree, w, Scripted::new("bottom", &log), flags, Point::ZERO, size);
        let top = frame(&mut tree, w, Scripted::new("top", &log), flags, Point::ZERO, size);
        let button = child(
            &mut tree,
            top,
            Scripted::new("button", &log).press_response(Response::Finish),
            Point::new(10.0, 10.0),
            Size::new(20.0, 20.0),
        );
        let behind = child(
            &mut tree,
            bottom,
            Scripted::new("behind", &log),
            Point::new(10.0, 10.0),
            Size::new(20.0, 20.0),
        );
        let _ = log.take();

        let r = tree.dispatch_mouse_press(w, &press(15.0, 15.0)).unwrap();
        assert_eq!(r, Response::Finish);
        let events: Vec<_> = log.take().into_iter().filter(|e| e.ends_with("press")).collect();
        assert_eq!(events, vec!["button.press"]);
        assert!(tree.state(button).pressed);
        assert!(!tree.state(behind).pressed);
        assert_eq!(tree.active_frame(w).unwrap(), None);
    }

    #[test]
    fn children_ignore_then_parent_then_frame() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let f = frame(
            &mut tree,
            w,
            Scripted::new("F", &log),
            FrameFlags::default(),
            Point::ZERO,
            Size::new(100.0, 100.0),
        );
        let panel = child(&mut tree, f, Scripted::new("panel", &log), Point::ZERO, Size::new(80.0, 80.0));
        child(&mut tree, panel, Scripted::new("low", &log), Point::ZERO, Size::new(40.0, 40.0));
        child(&mut tree, panel, Scripted::new("high", &log), Point::ZERO, Size::new(40.0, 40.0));
        child(&mut tree, panel, Scripted::new("away", &log), Point::new(60.0, 60.0), Size::new(10.0, 10.0));
        let _ = log.take();

        tree.dispatch_mouse_move(w, &press(5.0, 5.0)).unwrap();
        let moves: Vec<_> = log.take().into_iter().filter(|e| e.ends_with(".move")).collect();
        assert_eq!(moves, vec!["high.move", "low.move", "panel.move", "F.move"]);
    }

    #[test]
    fn click_to_focus_runs_before_press() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::desktop());
        let f = frame(
            &mut tree,
            w,
            Scripted::new("F", &log),
            FrameFlags::default(),
            Point::ZERO,
            Size::new(100.0, 100.0),
        );
        let entry = child(&mut tree, f, Scripted::new("entry", &log), Point::ZERO, Size::new(50.0, 20.0));
        tree.set_flags(
            entry,
            ViewFlags {
                focusable: true,
                ..ViewFlags::default()
            },
        );
        let _ = log.take();

        tree.dispatch_mouse_press(w, &press(5.0, 5.0)).unwrap();
        let events: Vec<_> = log
            .take()
            .into_iter()
            .filter(|e| !e.ends_with("hover_in"))
            .collect();
        assert_eq!(events, vec!["entry.focus_on", "entry.press", "F.press"]);
        assert_eq!(tree.focused_view(f).unwrap(), Some(entry));
    }

    #[test]
    fn capture_routes_moves_and_release_to_pressed_view() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let f = frame(
            &mut tree,
            w,
            Scripted::new("F", &log),
            FrameFlags::default(),
            Point::ZERO,
            Size::new(200.0, 200.0),
        );
        let knob = child(
            &mut tree,
            f,
            Scripted::new("knob", &log)
                .press_response(Response::Finish)
                .move_response(Response::Finish)
                .release_response(Response::Finish),
            Point::new(10.0, 10.0),
            Size::new(10.0, 10.0),
        );
        let _ = log.take();

        tree.dispatch_mouse_press(w, &press(15.0, 15.0)).unwrap();
        assert!(tree.state(knob).pressed);
        let _ = log.take();

        let r = tree.dispatch_mouse_move(w, &press(150.0, 150.0)).unwrap();
        assert_eq!(r, Response::Finish);
        let r = tree.dispatch_mouse_release(w, &press(150.0, 150.0)).unwrap();
        assert_eq!(r, Response::Finish);
        let events: Vec<_> = log
            .take()
            .into_iter()
            .filter(|e| !e.contains("hover"))
            .collect();
        assert_eq!(events, vec!["knob.move", "knob.release"]);
        assert!(!tree.state(knob).pressed);

        // Without capture the move goes through the normal walk.
        tree.dispatch_mouse_move(w, &press(150.0, 150.0)).unwrap();
        assert_eq!(log.take(), vec!["F.move"]);
    }

    #[test]
    fn key_goes_to_focused_view_then_frame_only() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let f = frame(
            &mut tree,
            w,
            Scripted::new("F", &log),
            FrameFlags {
                focusable: true,
                ..FrameFlags::default()
            },
            Point::ZERO,
            Size::new(100.0, 100.0),
        );
        frame(
            &mut tree,
            w,
            Scripted::new("other", &log),
            FrameFlags::default(),
            Point::ZERO,
            Size::new(100.0, 100.0),
        );
        let group = child(&mut tree, f, Scripted::new("group", &log), Point::ZERO, Size::new(50.0, 50.0));
        let field = child(&mut tree, group, Scripted::new("field", &log), Point::ZERO, Size::new(10.0, 10.0));
        tree.set_focused_frame(w, Some(f)).unwrap();
        tree.set_focused_view(f, Some(field)).unwrap();
        let _ = log.take();

        let r = tree.dispatch_key_press(w, &KeyEvent::new(Key::Enter)).unwrap();
        assert_eq!(r, Response::Ignore);
        assert_eq!(log.take(), vec!["field.key", "F.key"]);

        tree.set_focused_frame(w, None).unwrap();
        let _ = log.take();
        tree.dispatch_key_press(w, &KeyEvent::new(Key::Enter)).unwrap();
        assert_eq!(log.take(), vec!["other.key", "field.key", "F.key"]);
    }

    #[test]
    fn context_menu_bubbles_to_frame() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let f = frame(
            &mut tree,
            w,
            Scripted::new("F", &log),
            FrameFlags::default(),
            Point::ZERO,
            Size::new(100.0, 100.0),
        );
        let group = child(&mut tree, f, Scripted::new("group", &log), Point::ZERO, Size::new(50.0, 50.0));
        child(&mut tree, group, Scripted::new("leaf", &log), Point::ZERO, Size::new(10.0, 10.0));
        let _ = log.take();

        let event = ContextMenuEvent {
            position: Point::new(5.0, 5.0),
            modifiers: Default::default(),
        };
        tree.dispatch_context_menu_press(w, &event).unwrap();
        assert_eq!(log.take(), vec!["leaf.menu", "group.menu", "F.menu"]);
    }

    #[test]
    fn handler_may_destroy_itself() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let f = frame(
            &mut tree,
            w,
            Scripted::new("F", &log),
            FrameFlags::default(),
            Point::ZERO,
            Size::new(100.0, 100.0),
        );
        let doomed = child(
            &mut tree,
            f,
            Scripted::new("doomed", &log).destroy_on_key(),
            Point::ZERO,
            Size::new(10.0, 10.0),
        );
        tree.set_focused_view(f, Some(doomed)).unwrap();
        let _ = log.take();

        let r = tree.dispatch_key_press(w, &KeyEvent::new(Key::Escape)).unwrap();
        assert_eq!(r, Response::Finish);
        assert!(!tree.is_alive(doomed));
        assert_eq!(tree.focused_view(f).unwrap(), None);
        assert_eq!(tree.active_frame(w).unwrap(), None);
    }

    #[test]
    fn escape_closes_dialog_frame() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let flags = FrameFlags {
            focusable: true,
            ..FrameFlags::default()
        };
        let main = frame(&mut tree, w, Scripted::new("main", &log), flags, Point::ZERO, Size::new(300.0, 300.0));
        let dialog = frame(
            &mut tree,
            w,
            Scripted::new("dialog", &log),
            flags,
            Point::new(50.0, 50.0),
            Size::new(100.0, 100.0),
        );
        let cancel = child(
            &mut tree,
            dialog,
            Scripted::new("cancel", &log).close_frame_on_key(),
            Point::ZERO,
            Size::new(10.0, 10.0),
        );
        tree.set_focused_frame(w, Some(dialog)).unwrap();
        tree.set_focused_view(dialog, Some(cancel)).unwrap();
        let _ = log.take();

        let r = tree.dispatch_key_press(w, &KeyEvent::new(Key::Escape)).unwrap();
        assert_eq!(r, Response::Finish);
        assert!(!tree.is_alive(dialog));
        assert!(!tree.is_alive(cancel));
        assert_eq!(tree.frames(w).unwrap(), vec![main]);
        assert_eq!(tree.focused_frame(w).unwrap(), Some(main));
        assert_eq!(log.take(), vec!["cancel.key", "dialog.focus_off", "main.focus_on"]);
    }

    #[test]
    fn press_raises_floating_frame() {
        let log = Log::default();
        let (mut tree, w) = window(WindowConfig::desktop());
        let size = Size::new(100.0, 100.0);
        let menu = frame(
            &mut tree,
            w,
            Scripted::new("menu", &log),
            FrameFlags {
                floating: true,
                ..FrameFlags::default()
            },
            Point::ZERO,
            size,
        );
        let panel = frame(&mut tree, w, Scripted::new("panel", &log), FrameFlags::default(), Point::new(50.0, 50.0), size);
        assert_eq!(tree.frames(w).unwrap(), vec![menu, panel]);

        // Only the menu is under (10, 10).
        tree.dispatch_mouse_press(w, &press(10.0, 10.0)).unwrap();
        assert_eq!(tree.frames(w).unwrap(), vec![panel, menu]);
    }

    #[test]
    fn active_frame_is_set_during_dispatch() {
        #[derive(Debug)]
        struct Spy {
            seen: Log,
        }
        impl Widget for Spy {
            fn key_press(&mut self, cx: &mut ViewCx<'_>, _: &KeyEvent) -> Response {
                let id = cx.id();
                let window = cx.window_of(id).unwrap();
                let active = cx.active_frame(window).unwrap();
                self.seen.push(alloc::format!("{}", active == Some(id)));
                Response::Ignore
            }
        }

        let seen = Log::default();
        let (mut tree, w) = window(WindowConfig::minimal());
        let f = tree.create_frame(Spy { seen: seen.clone() }, FrameFlags::default());
        tree.add_frame(w, f).unwrap();
        tree.dispatch_key_press(w, &KeyEvent::new(Key::Tab)).unwrap();
        assert_eq!(seen.take(), vec!["true"]);
        assert_eq!(tree.active_frame(w).unwrap(), None);
    }
}
