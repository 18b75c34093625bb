//! # Event System
//!
//! Normalized window events and their dispatch to application listeners.
//!
//! Raw platform callbacks are translated into [`Event`]s carrying an
//! [`EventKind`] and a typed [`EventData`] payload. Listeners subscribe per
//! kind, either globally or for one window, and run in registration order.
//!
//! ## Default effects
//!
//! Some events have a default effect the runtime applies after all listeners
//! ran: `pointerdown` focuses the window, `pointerup` synthesizes `click` /
//! `dblclick`, `close` closes the window. Any listener can cancel it with
//! [`Event::prevent_default`].

pub mod dispatcher;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use crate::error::RuntimeError;
use crate::foundation::collections::WindowId;
use crate::foundation::math::{ContentScale, Point, Position, Size};
use crate::input::{KeyCode, Modifiers, MouseButton};

pub use dispatcher::{Dispatcher, Listener};

/// Event types listeners can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Button pressed over the window
    PointerDown,
    /// Pointer moved
    PointerMove,
    /// Button released
    PointerUp,
    /// Press and release of the same button
    Click,
    /// Second click within the double-click thresholds
    DoubleClick,
    /// Pointer entered the client area
    PointerEnter,
    /// Pointer left the client area
    PointerLeave,
    /// Scroll wheel
    Wheel,
    /// Key pressed or auto-repeated
    KeyDown,
    /// Key released
    KeyUp,
    /// Text input
    Input,
    /// Client area resized
    Resize,
    /// Framebuffer resized
    FramebufferResize,
    /// Window moved
    Move,
    /// Focus gained
    Focus,
    /// Focus lost
    Blur,
    /// Window maximized
    Maximize,
    /// Window iconified
    Minimize,
    /// Window left the maximized or iconified state
    Restore,
    /// DPI changed
    ContentScale,
    /// Files dropped
    Drop,
    /// Contents need redrawing
    Refresh,
    /// Close requested; cancelable
    Close,
    /// Window was removed; terminal
    WindowClosed,
}

impl EventKind {
    /// Every event kind
    pub const ALL: [Self; 24] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::PointerUp,
        Self::Click,
        Self::DoubleClick,
        Self::PointerEnter,
        Self::PointerLeave,
        Self::Wheel,
        Self::KeyDown,
        Self::KeyUp,
        Self::Input,
        Self::Resize,
        Self::FramebufferResize,
        Self::Move,
        Self::Focus,
        Self::Blur,
        Self::Maximize,
        Self::Minimize,
        Self::Restore,
        Self::ContentScale,
        Self::Drop,
        Self::Refresh,
        Self::Close,
        Self::WindowClosed,
    ];

    /// Listener-facing event name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::PointerUp => "pointerup",
            Self::Click => "click",
            Self::DoubleClick => "dblclick",
            Self::PointerEnter => "pointerenter",
            Self::PointerLeave => "pointerleave",
            Self::Wheel => "wheel",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::Input => "input",
            Self::Resize => "resize",
            Self::FramebufferResize => "framebuffersize",
            Self::Move => "move",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Maximize => "maximize",
            Self::Minimize => "minimize",
            Self::Restore => "restore",
            Self::ContentScale => "contentscale",
            Self::Drop => "drop",
            Self::Refresh => "refresh",
            Self::Close => "close",
            Self::WindowClosed => "windowClose",
        }
    }

    /// Whether listeners may cancel the default effect
    pub const fn is_cancelable(&self) -> bool {
        matches!(self, Self::PointerDown | Self::PointerUp | Self::Close)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = RuntimeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let name = match name {
            "mousedown" => "pointerdown",
            "mousemove" => "pointermove",
            "mouseup" => "pointerup",
            "mouseenter" => "pointerenter",
            "mouseleave" => "pointerleave",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| RuntimeError::UnknownEvent(name.to_string()))
    }
}

/// Event payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Pointer position, plus the button for button events
    Pointer {
        /// Window-logical position
        position: Point,
        /// Button involved, `None` for motion and crossing
        button: Option<MouseButton>,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// Scroll deltas
    Wheel {
        /// Pointer position when scrolling
        position: Point,
        /// Horizontal delta
        dx: f64,
        /// Vertical delta
        dy: f64,
    },
    /// Key transition
    Key {
        /// Key code
        key: KeyCode,
        /// Platform scancode
        scancode: i32,
        /// Modifiers held
        modifiers: Modifiers,
        /// Auto-repeat
        repeat: bool,
    },
    /// Text input
    Input {
        /// Character entered
        character: char,
    },
    /// New client-area or framebuffer size
    Resize {
        /// New size
        size: Size,
    },
    /// New screen position
    Move {
        /// New position
        position: Position,
    },
    /// New content scale
    ContentScale {
        /// New scale
        scale: ContentScale,
    },
    /// Dropped paths
    Drop {
        /// Dropped files and directories
        paths: Vec<PathBuf>,
    },
    /// No payload
    None,
}

/// A normalized event delivered to listeners
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    window: WindowId,
    data: EventData,
    timestamp: Instant,
    default_prevented: bool,
}

impl Event {
    /// Create an event stamped with the current time
    pub fn new(kind: EventKind, window: WindowId, data: EventData) -> Self {
        Self {
            kind,
            window,
            data,
            timestamp: Instant::now(),
            default_prevented: false,
        }
    }

    /// Event type
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Target window
    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Payload
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// When the runtime normalized the event
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Pointer position for pointer and wheel events
    pub fn position(&self) -> Option<Point> {
        match self.data {
            EventData::Pointer { position, .. } | EventData::Wheel { position, .. } => Some(position),
            _ => None,
        }
    }

    /// Horizontal pointer coordinate
    pub fn x(&self) -> Option<f64> {
        self.position().map(|position| position.x)
    }

    /// Vertical pointer coordinate
    pub fn y(&self) -> Option<f64> {
        self.position().map(|position| position.y)
    }

    /// Button of a button event
    pub fn button(&self) -> Option<MouseButton> {
        match self.data {
            EventData::Pointer { button, .. } => button,
            _ => None,
        }
    }

    /// Key of a key event
    pub fn key(&self) -> Option<KeyCode> {
        match self.data {
            EventData::Key { key, .. } => Some(key),
            _ => None,
        }
    }

    /// New size of a resize event
    pub fn size(&self) -> Option<Size> {
        match self.data {
            EventData::Resize { size } => Some(size),
            _ => None,
        }
    }

    /// Cancel the default effect; a no-op for events without one
    pub fn prevent_default(&mut self) {
        if self.kind.is_cancelable() {
            self.default_prevented = true;
        }
    }

    /// Whether some listener cancelled the default effect
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Which windows a listener hears about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every window
    Global,
    /// One window
    Window(WindowId),
}

impl Scope {
    /// Whether an event for `window` is in scope
    pub fn matches(&self, window: WindowId) -> bool {
        match self {
            Self::Global => true,
            Self::Window(id) => *id == window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_mouse_aliases() {
        assert_eq!("mousedown".parse::<EventKind>().unwrap(), EventKind::PointerDown);
        assert_eq!("mousemove".parse::<EventKind>().unwrap(), EventKind::PointerMove);
        assert_eq!("mouseup".parse::<EventKind>().unwrap(), EventKind::PointerUp);
        assert!(matches!("hover".parse::<EventKind>(), Err(RuntimeError::UnknownEvent(_))));
    }

    #[test]
    fn test_prevent_default_only_on_cancelable() {
        let mut resize = Event::new(EventKind::Resize, WindowId::default(), EventData::None);
        resize.prevent_default();
        assert!(!resize.is_default_prevented());

        let mut close = Event::new(EventKind::Close, WindowId::default(), EventData::None);
        close.prevent_default();
        assert!(close.is_default_prevented());
    }

    #[test]
    fn test_pointer_accessors() {
        let event = Event::new(
            EventKind::PointerDown,
            WindowId::default(),
            EventData::Pointer {
                position: Point::new(40.0, 190.0),
                button: Some(MouseButton::Left),
                modifiers: Modifiers::empty(),
            },
        );
        assert_eq!(event.x(), Some(40.0));
        assert_eq!(event.y(), Some(190.0));
        assert_eq!(event.button(), Some(MouseButton::Left));
        assert_eq!(event.size(), None);
    }
}
