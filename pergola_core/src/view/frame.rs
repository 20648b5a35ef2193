// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frames, windows and the frame stack.
//!
//! A window is a root view whose children are frames. Child order is paint
//! order: the last frame is drawn on top and receives input first. Frames
//! flagged [`topmost`](FrameFlags::topmost) always stay above the others.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{Point, Size};
use understory_dirty::EagerPolicy;

use super::id::{INVALID, ViewId};
use super::store::ViewTree;
use crate::config::WindowConfig;
use crate::dirty;
use crate::error::TreeError;
use crate::render::BufferId;
use crate::trace::FocusKind;
use crate::widget::Widget;

/// Frame behavior flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameFlags {
    /// A panel that floats over the workspace (menu, dialog). Floating frames
    /// can render through an offscreen buffer and are raised on press.
    pub floating: bool,
    /// Kept above every frame without this flag.
    pub topmost: bool,
    /// Can become the window's focused frame.
    pub focusable: bool,
}

/// A frame's offscreen buffer state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ViewBuffer {
    /// Backend handle, once allocated.
    pub(crate) handle: Option<BufferId>,
    /// Size the handle was allocated at.
    pub(crate) size: Size,
    /// The cached content is out of date.
    pub(crate) refresh: bool,
}

/// Per-frame tracking state.
#[derive(Clone, Debug, Default)]
pub(crate) struct FrameData {
    pub(crate) flags: FrameFlags,
    /// Deepest view of the hover chain.
    pub(crate) hovered: Option<ViewId>,
    pub(crate) focused: Option<ViewId>,
    /// The view holding pointer capture.
    pub(crate) pressed: Option<ViewId>,
    pub(crate) buffer: Option<ViewBuffer>,
}

/// Mouse cursor shapes a window can request from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorShape {
    /// The default pointer.
    #[default]
    Arrow,
    /// Text insertion.
    IBeam,
    /// Precise selection.
    Crosshair,
    /// A link or pressable element.
    Hand,
    /// Horizontal resize.
    ResizeHorizontal,
    /// Vertical resize.
    ResizeVertical,
    /// Move / drag.
    Move,
    /// Busy indicator.
    Busy,
}

/// Per-window tracking state.
#[derive(Clone, Debug)]
pub(crate) struct WindowData {
    pub(crate) config: WindowConfig,
    /// The frame currently receiving a dispatch call.
    pub(crate) active_frame: Option<ViewId>,
    pub(crate) focused_frame: Option<ViewId>,
    pub(crate) hovered_frame: Option<ViewId>,
    /// The frame holding pointer capture.
    pub(crate) pressed_frame: Option<ViewId>,
    /// Clip nesting depth left by the last draw pass.
    pub(crate) stencil_count: u32,
    pub(crate) cursors: Vec<CursorShape>,
    /// Last pointer position seen by dispatch.
    pub(crate) cursor: Option<Point>,
    pub(crate) button_down: bool,
}

impl WindowData {
    fn new(config: WindowConfig) -> Self {
        Self {
            config,
            active_frame: None,
            focused_frame: None,
            hovered_frame: None,
            pressed_frame: None,
            stencil_count: 0,
            cursors: Vec::new(),
            cursor: None,
            button_down: false,
        }
    }
}

impl ViewTree {
    /// Creates a window of `size`.
    pub fn create_window(&mut self, size: Size, config: WindowConfig) -> ViewId {
        let id = self.alloc(Box::new(()));
        self.window[id.idx as usize] = Some(Box::new(WindowData::new(config)));
        self.size[id.idx as usize] = size;
        id
    }

    /// Creates a detached frame driven by `widget`.
    ///
    /// Attach it with [`add_frame`](Self::add_frame).
    pub fn create_frame<W: Widget>(&mut self, widget: W, flags: FrameFlags) -> ViewId {
        let id = self.alloc(Box::new(widget));
        self.frame[id.idx as usize] = Some(FrameData {
            flags,
            ..FrameData::default()
        });
        id
    }

    /// Attaches `frame` to `window`'s frame stack.
    ///
    /// The frame goes on top of its stacking class: above every other frame
    /// if it is [`topmost`](FrameFlags::topmost), otherwise just below the
    /// first topmost frame. Floating frames get an offscreen buffer when the
    /// window's config asks for it.
    ///
    /// # Errors
    ///
    /// Fails if `window` is not a window, `frame` is not a frame, or `frame`
    /// is already attached.
    pub fn add_frame(&mut self, window: ViewId, frame: ViewId) -> Result<(), TreeError> {
        let config = self.window_data(window)?.config;
        let flags = self.frame_data(frame)?.flags;
        if let Some(parent) = self.parent(frame) {
            return Err(TreeError::AlreadyAttached {
                child: frame,
                parent,
            });
        }
        let before = self.stack_slot(window.idx, flags.topmost);
        self.link_before(window.idx, frame.idx, before);
        if flags.floating && config.buffer_floating_frames {
            self.enable_view_buffer(frame)?;
        }
        Ok(())
    }

    /// Moves `frame` to the top of its stacking class and, if it is
    /// focusable, makes it the window's focused frame.
    ///
    /// # Errors
    ///
    /// Fails if `frame` is not a frame attached to a window.
    pub fn move_frame_to_top(&mut self, frame: ViewId) -> Result<(), TreeError> {
        let flags = self.frame_data(frame)?.flags;
        let window = self.parent(frame).ok_or(TreeError::NotAWindow(frame))?;
        self.window_data(window)?;

        // Same parent: no tracking to release and the frame's own content
        // is unchanged, so only the window redraws.
        let before = self.stack_slot(window.idx, flags.topmost);
        if self.next_sibling[frame.idx as usize] != before {
            self.splice_out(frame.idx);
            self.splice_before(window.idx, frame.idx, before);
            self.dirty.mark_with(window.idx, dirty::REFRESH, &EagerPolicy);
            self.dirty.mark(window.idx, dirty::TOPOLOGY);
        }

        if flags.focusable {
            self.set_focused_frame(window, Some(frame))?;
        }
        Ok(())
    }

    /// The sibling a new frame of the given class is linked before.
    fn stack_slot(&self, window: u32, topmost: bool) -> u32 {
        if topmost {
            return INVALID;
        }
        let mut cur = self.first_child[window as usize];
        while cur != INVALID {
            let is_topmost = self.frame[cur as usize]
                .as_ref()
                .is_some_and(|f| f.flags.topmost);
            if is_topmost {
                return cur;
            }
            cur = self.next_sibling[cur as usize];
        }
        INVALID
    }

    /// Makes `frame` render through an offscreen buffer.
    ///
    /// The buffer is allocated lazily by the next draw and re-rendered only
    /// when content inside the frame changes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAFrame`] if `frame` is not a frame.
    pub fn enable_view_buffer(&mut self, frame: ViewId) -> Result<(), TreeError> {
        let data = self.frame_data_mut(frame)?;
        if data.buffer.is_none() {
            data.buffer = Some(ViewBuffer {
                handle: None,
                size: Size::ZERO,
                refresh: true,
            });
        }
        Ok(())
    }

    /// Makes `frame` draw directly again. Its buffer is released on the next
    /// draw.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAFrame`] if `frame` is not a frame.
    pub fn disable_view_buffer(&mut self, frame: ViewId) -> Result<(), TreeError> {
        let released = self.frame_data_mut(frame)?.buffer.take();
        if let Some(handle) = released.and_then(|b| b.handle) {
            self.pending_released_buffers.push(handle);
        }
        Ok(())
    }

    /// Returns whether `frame` renders through an offscreen buffer.
    #[must_use]
    pub fn has_view_buffer(&self, frame: ViewId) -> bool {
        self.validate(frame);
        self.frame[frame.idx as usize]
            .as_ref()
            .is_some_and(|f| f.buffer.is_some())
    }

    /// Returns whether `id` is a frame.
    #[must_use]
    pub fn is_frame(&self, id: ViewId) -> bool {
        self.validate(id);
        self.frame[id.idx as usize].is_some()
    }

    /// Returns whether `id` is a window.
    #[must_use]
    pub fn is_window(&self, id: ViewId) -> bool {
        self.validate(id);
        self.window[id.idx as usize].is_some()
    }

    /// Returns a frame's flags.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAFrame`] if `frame` is not a frame.
    pub fn frame_flags(&self, frame: ViewId) -> Result<FrameFlags, TreeError> {
        Ok(self.frame_data(frame)?.flags)
    }

    /// Returns the frames of `window`, bottom-most first.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn frames(&self, window: ViewId) -> Result<Vec<ViewId>, TreeError> {
        self.window_data(window)?;
        Ok(self
            .children(window)
            .filter(|c| self.frame[c.idx as usize].is_some())
            .collect())
    }

    // -- Window state --

    /// Returns a window's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn window_config(&self, window: ViewId) -> Result<WindowConfig, TreeError> {
        Ok(self.window_data(window)?.config)
    }

    /// Replaces a window's configuration.
    ///
    /// Buffers of already-attached floating frames are not added or removed.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn set_window_config(
        &mut self,
        window: ViewId,
        config: WindowConfig,
    ) -> Result<(), TreeError> {
        self.window_data_mut(window)?.config = config;
        Ok(())
    }

    /// Returns the frame currently receiving a dispatch call.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn active_frame(&self, window: ViewId) -> Result<Option<ViewId>, TreeError> {
        Ok(self.window_data(window)?.active_frame)
    }

    /// Returns the window's focused frame.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn focused_frame(&self, window: ViewId) -> Result<Option<ViewId>, TreeError> {
        Ok(self.window_data(window)?.focused_frame)
    }

    /// Returns the top-most frame under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn hovered_frame(&self, window: ViewId) -> Result<Option<ViewId>, TreeError> {
        Ok(self.window_data(window)?.hovered_frame)
    }

    /// Returns the last pointer position the window dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn cursor_position(&self, window: ViewId) -> Result<Option<Point>, TreeError> {
        Ok(self.window_data(window)?.cursor)
    }

    /// Returns the clip nesting depth left by the last draw pass. Zero unless
    /// a widget left a clip pushed.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn stencil_count(&self, window: ViewId) -> Result<u32, TreeError> {
        Ok(self.window_data(window)?.stencil_count)
    }

    // -- Cursor stack --

    /// Pushes a cursor shape; it stays current until popped.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn push_cursor(&mut self, window: ViewId, shape: CursorShape) -> Result<(), TreeError> {
        self.window_data_mut(window)?.cursors.push(shape);
        Ok(())
    }

    /// Pops the most recently pushed cursor shape.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn pop_cursor(&mut self, window: ViewId) -> Result<Option<CursorShape>, TreeError> {
        Ok(self.window_data_mut(window)?.cursors.pop())
    }

    /// Returns the cursor shape the host should show.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAWindow`] if `window` is not a window.
    pub fn current_cursor(&self, window: ViewId) -> Result<CursorShape, TreeError> {
        Ok(self
            .window_data(window)?
            .cursors
            .last()
            .copied()
            .unwrap_or_default())
    }

    // -- Internal accessors --

    pub(crate) fn frame_data(&self, frame: ViewId) -> Result<&FrameData, TreeError> {
        self.validate(frame);
        self.frame[frame.idx as usize]
            .as_ref()
            .ok_or(TreeError::NotAFrame(frame))
    }

    pub(crate) fn frame_data_mut(&mut self, frame: ViewId) -> Result<&mut FrameData, TreeError> {
        self.validate(frame);
        self.frame[frame.idx as usize]
            .as_mut()
            .ok_or(TreeError::NotAFrame(frame))
    }

    pub(crate) fn window_data(&self, window: ViewId) -> Result<&WindowData, TreeError> {
        self.validate(window);
        self.window[window.idx as usize]
            .as_deref()
            .ok_or(TreeError::NotAWindow(window))
    }

    pub(crate) fn window_data_mut(
        &mut self,
        window: ViewId,
    ) -> Result<&mut WindowData, TreeError> {
        self.validate(window);
        self.window[window.idx as usize]
            .as_deref_mut()
            .ok_or(TreeError::NotAWindow(window))
    }

    /// Sets the window's focused frame, sending `focus_off` to the previous
    /// one and `focus_on` to the new one.
    ///
    /// # Errors
    ///
    /// Fails if `window` is not a window, or `frame` is not a frame attached
    /// to it.
    pub fn set_focused_frame(
        &mut self,
        window: ViewId,
        frame: Option<ViewId>,
    ) -> Result<(), TreeError> {
        let previous = self.window_data(window)?.focused_frame;
        if let Some(f) = frame {
            self.frame_data(f)?;
            if self.parent[f.idx as usize] != window.idx {
                return Err(TreeError::NotAChild {
                    parent: window,
                    child: f,
                });
            }
        }
        if previous == frame {
            return Ok(());
        }
        self.window_data_mut(window)?.focused_frame = frame;
        if let Some(old) = previous {
            self.notify_focus(window, old, FocusKind::Off);
        }
        if let Some(new) = frame {
            self.notify_focus(window, new, FocusKind::On);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::testing::{Log, Scripted};
    use crate::view::ViewFlags;

    fn window() -> (ViewTree, ViewId) {
        let mut tree = ViewTree::new();
        let w = tree.create_window(Size::new(800.0, 600.0), WindowConfig::minimal());
        (tree, w)
    }

    #[test]
    fn topmost_frames_stay_on_top() {
        let (mut tree, w) = window();
        let overlay = tree.create_frame(
            (),
            FrameFlags {
                topmost: true,
                ..FrameFlags::default()
            },
        );
        let a = tree.create_frame((), FrameFlags::default());
        let b = tree.create_frame((), FrameFlags::default());
        tree.add_frame(w, overlay).unwrap();
        tree.add_frame(w, a).unwrap();
        tree.add_frame(w, b).unwrap();
        assert_eq!(tree.frames(w).unwrap(), vec![a, b, overlay]);

        tree.move_frame_to_top(a).unwrap();
        assert_eq!(tree.frames(w).unwrap(), vec![b, a, overlay]);
        tree.move_frame_to_top(overlay).unwrap();
        assert_eq!(tree.frames(w).unwrap(), vec![b, a, overlay]);
        assert_eq!(tree.subview_count(w), 3);
    }

    #[test]
    fn move_to_top_transfers_focus() {
        let log = Log::default();
        let (mut tree, w) = window();
        let focusable = FrameFlags {
            focusable: true,
            ..FrameFlags::default()
        };
        let a = tree.create_frame(Scripted::new("A", &log), focusable);
        let b = tree.create_frame(Scripted::new("B", &log), focusable);
        tree.add_frame(w, a).unwrap();
        tree.add_frame(w, b).unwrap();
        tree.set_focused_frame(w, Some(b)).unwrap();
        let _ = log.take();

        tree.move_frame_to_top(a).unwrap();
        assert_eq!(tree.focused_frame(w).unwrap(), Some(a));
        assert_eq!(log.take(), vec!["B.focus_off", "A.focus_on"]);
        assert!(tree.state(a).focused);
        assert!(!tree.state(b).focused);
    }

    #[test]
    fn destroying_focused_frame_focuses_the_one_below_once() {
        let log = Log::default();
        let (mut tree, w) = window();
        let focusable = FrameFlags {
            focusable: true,
            ..FrameFlags::default()
        };
        let f1 = tree.create_frame(Scripted::new("F1", &log), focusable);
        let f2 = tree.create_frame(Scripted::new("F2", &log), focusable);
        let f3 = tree.create_frame(Scripted::new("F3", &log), focusable);
        for f in [f1, f2, f3] {
            tree.add_frame(w, f).unwrap();
        }
        tree.set_focused_frame(w, Some(f3)).unwrap();
        let _ = log.take();

        tree.destroy(f3);
        assert_eq!(tree.focused_frame(w).unwrap(), Some(f2));
        assert_eq!(log.take(), vec!["F3.focus_off", "F2.focus_on"]);
        assert_eq!(tree.frames(w).unwrap(), vec![f1, f2]);
    }

    #[test]
    fn view_flags_do_not_change_frame_focusability() {
        let log = Log::default();
        let (mut tree, w) = window();
        let focusable = FrameFlags {
            focusable: true,
            ..FrameFlags::default()
        };
        let below = tree.create_frame(Scripted::new("below", &log), focusable);
        let above = tree.create_frame(Scripted::new("above", &log), focusable);
        tree.add_frame(w, below).unwrap();
        tree.add_frame(w, above).unwrap();
        tree.set_flags(
            below,
            ViewFlags {
                emboss: true,
                ..ViewFlags::default()
            },
        );
        tree.set_focused_frame(w, Some(above)).unwrap();
        let _ = log.take();

        tree.destroy(above);
        assert_eq!(tree.focused_frame(w).unwrap(), Some(below));
        assert_eq!(log.take(), vec!["above.focus_off", "below.focus_on"]);
    }

    #[test]
    fn destroying_a_deep_subtree_releases_every_reference() {
        let log = Log::default();
        let (mut tree, w) = window();
        let frame = tree.create_frame(Scripted::new("F", &log), FrameFlags::default());
        tree.add_frame(w, frame).unwrap();
        tree.set_child_geometry(w, frame, Point::ZERO, Size::new(100.0, 100.0));

        let mut parent = frame;
        let mut chain = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let v = tree.create_view(Scripted::new(name, &log));
            tree.push_back(parent, v).unwrap();
            tree.set_child_geometry(parent, v, Point::ZERO, Size::new(50.0, 50.0));
            chain.push(v);
            parent = v;
        }
        let leaf = chain[3];
        tree.update_hover(w, Point::new(10.0, 10.0)).unwrap();
        tree.set_focused_view(frame, Some(leaf)).unwrap();
        assert_eq!(tree.hovered_view(frame).unwrap(), Some(leaf));
        let _ = log.take();

        tree.destroy(chain[1]);
        assert!(!tree.is_alive(leaf));
        assert_eq!(tree.hovered_view(frame).unwrap(), None);
        assert_eq!(tree.focused_view(frame).unwrap(), None);
        assert!(!tree.state(chain[0]).hovered);
        // Notifications go out while the subtree is still alive.
        assert_eq!(
            log.take(),
            vec!["d.hover_out", "c.hover_out", "b.hover_out", "a.hover_out", "d.focus_off"]
        );

        tree.refresh_hover(w).unwrap();
        assert_eq!(tree.hovered_view(frame).unwrap(), Some(chain[0]));
    }

    #[test]
    fn add_frame_rejects_non_frames() {
        let (mut tree, w) = window();
        let plain = tree.create_view(());
        assert_eq!(tree.add_frame(w, plain), Err(TreeError::NotAFrame(plain)));
        let f = tree.create_frame((), FrameFlags::default());
        assert_eq!(tree.add_frame(plain, f), Err(TreeError::NotAWindow(plain)));
        tree.add_frame(w, f).unwrap();
        assert_eq!(
            tree.add_frame(w, f),
            Err(TreeError::AlreadyAttached {
                child: f,
                parent: w
            })
        );
    }

    #[test]
    fn floating_frames_get_buffers_when_configured() {
        let mut tree = ViewTree::new();
        let w = tree.create_window(Size::new(100.0, 100.0), WindowConfig::desktop());
        let floating = FrameFlags {
            floating: true,
            ..FrameFlags::default()
        };
        let menu = tree.create_frame((), floating);
        let panel = tree.create_frame((), FrameFlags::default());
        tree.add_frame(w, menu).unwrap();
        tree.add_frame(w, panel).unwrap();
        assert!(tree.has_view_buffer(menu));
        assert!(!tree.has_view_buffer(panel));
    }

    #[test]
    fn cursor_stack_defaults_to_arrow() {
        let (mut tree, w) = window();
        assert_eq!(tree.current_cursor(w).unwrap(), CursorShape::Arrow);
        tree.push_cursor(w, CursorShape::IBeam).unwrap();
        tree.push_cursor(w, CursorShape::Busy).unwrap();
        assert_eq!(tree.current_cursor(w).unwrap(), CursorShape::Busy);
        assert_eq!(tree.pop_cursor(w).unwrap(), Some(CursorShape::Busy));
        assert_eq!(tree.current_cursor(w).unwrap(), CursorShape::IBeam);
        assert_eq!(tree.pop_cursor(w).unwrap(), Some(CursorShape::IBeam));
        assert_eq!(tree.pop_cursor(w).unwrap(), None);
        assert_eq!(tree.current_cursor(w).unwrap(), CursorShape::Arrow);
    }
}
