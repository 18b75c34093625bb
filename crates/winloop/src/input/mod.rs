//! Input state and key/button vocabulary
//!
//! Platform backends translate their native codes into these types. The
//! runtime keeps one [`InputState`] per window, updated from raw platform
//! events before any listener sees the corresponding normalized event.

pub mod click;

use std::collections::HashSet;

use bitflags::bitflags;

use crate::foundation::math::Point;

pub use click::{ClickOutcome, ClickTracker};

/// Per-window input state
#[derive(Debug, Clone, Default)]
pub struct InputState {
    cursor: Option<Point>,
    hovered: bool,
    buttons: HashSet<MouseButton>,
    keys: HashSet<KeyCode>,
    modifiers: Modifiers,
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record pointer motion
    pub fn handle_pointer_move(&mut self, position: Point) {
        self.cursor = Some(position);
    }

    /// Record pointer entering or leaving the client area
    pub fn handle_pointer_enter(&mut self, entered: bool) {
        self.hovered = entered;
    }

    /// Record a mouse button transition
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool, modifiers: Modifiers) {
        self.modifiers = modifiers;
        if pressed {
            self.buttons.insert(button);
        } else {
            self.buttons.remove(&button);
        }
    }

    /// Record a key transition
    pub fn handle_key_input(&mut self, key: KeyCode, action: KeyAction, modifiers: Modifiers) {
        self.modifiers = modifiers;
        match action {
            KeyAction::Press | KeyAction::Repeat => {
                self.keys.insert(key);
            }
            KeyAction::Release => {
                self.keys.remove(&key);
            }
        }
    }

    /// Forget pressed keys and buttons; focus loss means releases may never arrive
    pub fn release_all(&mut self) {
        self.buttons.clear();
        self.keys.clear();
        self.modifiers = Modifiers::empty();
    }

    /// Last known pointer position, if the pointer ever moved over the window
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    /// Whether the pointer is inside the client area
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether a mouse button is held
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Whether a key is held
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Modifiers active at the last key or button event
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

/// Key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Key went down
    Press,
    /// Key went up
    Release,
    /// Auto-repeat while held
    Repeat,
}

bitflags! {
    /// Keyboard modifiers held during an input event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 1 << 0;
        /// Either control key
        const CONTROL = 1 << 1;
        /// Either alt / option key
        const ALT = 1 << 2;
        /// Either super / command / windows key
        const SUPER = 1 << 3;
        /// Caps lock engaged
        const CAPS_LOCK = 1 << 4;
        /// Num lock engaged
        const NUM_LOCK = 1 << 5;
    }
}

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// Any additional button, numbered from 4
    Other(u8),
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum KeyCode {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Minus,
    Equal,
    Comma,
    Period,
    Slash,
    Backslash,
    Semicolon,
    Apostrophe,
    LeftBracket,
    RightBracket,
    GraveAccent,
    CapsLock,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    LeftSuper,
    RightSuper,
    Menu,
    /// Key the backend could not name
    Unknown,
}
