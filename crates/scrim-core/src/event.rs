#![forbid(unsafe_code)]

//! Input events delivered by the host page.
//!
//! The engine never installs real listeners; the host forwards each input
//! signal as an [`Event`], together with the node the signal targeted where
//! one exists (clicks). Key events carry no target — they are document-level
//! signals routed by the engine itself.

use bitflags::bitflags;

bitflags! {
    /// Keyboard modifier flags active when an event fired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// Key identity for the subset of keys the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Char(char),
}

/// Whether a key event is a press or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain key press with no modifiers.
    pub const fn press(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Mouse event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Moved,
}

/// A mouse event with page-relative pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: i32,
    pub y: i32,
}

impl MouseEvent {
    pub const fn new(kind: MouseEventKind, x: i32, y: i32) -> Self {
        Self { kind, x, y }
    }

    /// A left-button press at the given coordinates.
    pub const fn left_down(x: i32, y: i32) -> Self {
        Self::new(MouseEventKind::Down(MouseButton::Left), x, y)
    }
}

/// An input event as dispatched by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl Event {
    /// An Escape key press, the canonical dismissal signal.
    pub const fn escape() -> Self {
        Self::Key(KeyEvent::press(KeyCode::Escape))
    }
}
