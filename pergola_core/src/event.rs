// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input event types and the two-valued handler response.

use kurbo::Point;

/// The result of an event handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Response {
    /// The event was consumed; stop propagating.
    Finish,
    /// The event was not handled; continue with the next candidate.
    #[default]
    Ignore,
}

impl Response {
    /// Returns `true` for [`Response::Finish`].
    #[inline]
    #[must_use]
    pub const fn is_finish(self) -> bool {
        matches!(self, Self::Finish)
    }
}

/// Mouse buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The primary (usually left) button.
    #[default]
    Left,
    /// The secondary (usually right) button.
    Right,
    /// The middle button or wheel click.
    Middle,
    /// Any other button, by backend index.
    Other(u16),
}

/// Modifier key state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,
    /// Whether any control key is pressed.
    pub control: bool,
    /// Whether any alt/option key is pressed.
    pub alt: bool,
    /// Whether any command/super key is pressed.
    pub meta: bool,
}

/// A mouse press, release or move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
    /// Cursor position in window coordinates.
    pub position: Point,
    /// Cursor position in the receiving view's local coordinates.
    ///
    /// Filled in by the dispatcher for each handler call; hosts can leave it
    /// equal to `position`.
    pub local: Point,
    /// The button that changed state (for moves: the held button, if any).
    pub button: MouseButton,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Creates an event at `position` (window coordinates) for `button`.
    #[must_use]
    pub fn new(position: Point, button: MouseButton) -> Self {
        Self {
            position,
            local: position,
            button,
            modifiers: Modifiers::default(),
        }
    }

    /// Returns a copy with `local` replaced.
    #[must_use]
    pub fn at_local(&self, local: Point) -> Self {
        Self { local, ..*self }
    }
}

/// Logical keys.
///
/// Printable input arrives as [`Key::Character`]; everything the core needs
/// to name explicitly has its own variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Character(char),
    /// Escape.
    Escape,
    /// Return / Enter.
    Enter,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// The context-menu (application) key.
    ContextMenu,
    /// A key the core has no name for, by backend scancode.
    Other(u32),
}

/// A key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// The pressed key.
    pub key: Key,
    /// Modifier keys held during the press.
    pub modifiers: Modifiers,
    /// Whether this press is an auto-repeat.
    pub repeat: bool,
}

impl KeyEvent {
    /// Creates a non-repeating press of `key` without modifiers.
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }
}

/// A context-menu request, from the context-menu key or a secondary click.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContextMenuEvent {
    /// Where the menu should appear, in window coordinates.
    pub position: Point,
    /// Modifier keys held during the request.
    pub modifiers: Modifiers,
}

/// Hover notification payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverEvent {
    /// Cursor position in window coordinates.
    pub position: Point,
}
