//! Platform window backends
//!
//! This module defines the trait that every windowing backend implements.
//! The runtime never talks to a windowing system directly; it owns one
//! `Platform` and addresses native windows through opaque [`NativeId`]s.
//!
//! # Backends
//!
//! - **`glfw`**: native windows through GLFW (default `glfw` feature)
//! - **`headless`**: in-memory windows and monitors, used by tests and CI
//!
//! # Threading
//!
//! Backends are driven from the scheduler thread only. No method is called
//! concurrently and implementations need no internal locking.

#[cfg(feature = "glfw")]
pub mod glfw;
pub mod headless;

use std::ffi::c_void;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::foundation::math::{ContentScale, Position, Size, SizeLimits};
use crate::input::{KeyAction, KeyCode, Modifiers, MouseButton};
use crate::monitor::Monitor;
use crate::surface::SurfaceHandle;
use crate::window::WindowConfig;

/// Backend-assigned identity of a native window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(pub u64);

/// Platform backend errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The windowing system could not be initialized
    #[error("Platform initialization failed: {0}")]
    InitializationFailed(String),

    /// The native window or its surface could not be created
    #[error("Window creation failed: {0}")]
    CreationFailed(String),

    /// The native window no longer exists
    #[error("Unknown native window {0:?}")]
    UnknownWindow(NativeId),

    /// The drawing surface could not be obtained or presented
    #[error("Surface error: {0}")]
    Surface(String),

    /// The backend cannot perform this operation
    #[error("{backend} backend does not support {operation}")]
    Unsupported {
        /// Backend name
        backend: &'static str,
        /// Operation that was attempted
        operation: &'static str,
    },
}

/// Geometry and state of a freshly created native window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeWindow {
    /// Backend handle
    pub id: NativeId,
    /// Client-area size after creation (the work area when maximized)
    pub size: Size,
    /// Framebuffer size in physical pixels
    pub framebuffer_size: Size,
    /// Screen position
    pub position: Position,
    /// Content scale at creation
    pub content_scale: ContentScale,
    /// Whether the window received focus
    pub focused: bool,
    /// Whether the window came up maximized
    pub maximized: bool,
}

/// Un-normalized platform event
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Native window the event belongs to
    pub window: NativeId,
    /// What happened
    pub kind: RawEventKind,
}

impl RawEvent {
    /// Create a raw event
    pub fn new(window: NativeId, kind: RawEventKind) -> Self {
        Self { window, kind }
    }
}

/// Raw platform callbacks, one variant per windowing-system notification
#[derive(Debug, Clone, PartialEq)]
pub enum RawEventKind {
    /// Pointer moved, window-logical coordinates
    CursorMoved {
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
    /// Pointer entered (`true`) or left the client area
    CursorEntered(bool),
    /// Mouse button transition
    MouseButton {
        /// Button
        button: MouseButton,
        /// Pressed (`true`) or released
        pressed: bool,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// Scroll wheel or trackpad scroll
    Scroll {
        /// Horizontal delta
        dx: f64,
        /// Vertical delta
        dy: f64,
    },
    /// Keyboard key transition
    Key {
        /// Key code
        key: KeyCode,
        /// Platform scancode
        scancode: i32,
        /// Press, release or repeat
        action: KeyAction,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// Unicode text input
    Char(char),
    /// Client area resized
    Resized {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
    /// Framebuffer resized
    FramebufferResized {
        /// New width in physical pixels
        width: u32,
        /// New height in physical pixels
        height: u32,
    },
    /// Window moved
    Moved {
        /// New x
        x: i32,
        /// New y
        y: i32,
    },
    /// Input focus gained (`true`) or lost
    Focused(bool),
    /// User asked to close the window (close box, Alt+F4, ...)
    CloseRequested,
    /// Window maximized (`true`) or restored
    Maximized(bool),
    /// Window iconified (`true`) or restored
    Iconified(bool),
    /// Explicit DPI change
    ContentScaleChanged {
        /// New horizontal scale
        x: f32,
        /// New vertical scale
        y: f32,
    },
    /// Files dropped onto the window
    FileDropped(Vec<PathBuf>),
    /// Contents need to be redrawn
    Refresh,
}

/// Windowing backend contract
///
/// All mutators are synchronous: when they return, the native window has
/// been asked to change and the returned geometry (where there is one) is
/// what the runtime records. Confirmation events the platform sends later
/// are applied on top and are idempotent.
pub trait Platform {
    /// Short backend name used in logs and errors
    fn name(&self) -> &'static str;

    /// Enumerate connected monitors, primary first
    fn monitors(&mut self) -> Vec<Monitor>;

    /// Primary monitor, `None` when no display is attached
    fn primary_monitor(&mut self) -> Option<Monitor> {
        self.monitors().into_iter().find(|monitor| monitor.primary)
    }

    /// Create a native window
    ///
    /// `config` has already been validated and resolved (monitor bindings
    /// replaced by explicit geometry). `parent` is the parent's native handle.
    fn create_window(
        &mut self,
        config: &WindowConfig,
        parent: Option<NativeId>,
    ) -> Result<NativeWindow, PlatformError>;

    /// Destroy a native window; unknown handles are ignored
    fn destroy_window(&mut self, window: NativeId);

    /// Change the title
    fn set_title(&mut self, window: NativeId, title: &str) -> Result<(), PlatformError>;

    /// Move the window
    fn set_position(&mut self, window: NativeId, position: Position) -> Result<(), PlatformError>;

    /// Resize the client area
    fn set_size(&mut self, window: NativeId, size: Size) -> Result<(), PlatformError>;

    /// Constrain the client-area size
    fn set_size_limits(&mut self, window: NativeId, limits: SizeLimits) -> Result<(), PlatformError>;

    /// Maximize and return the resulting size
    fn maximize(&mut self, window: NativeId) -> Result<Size, PlatformError>;

    /// Restore from maximized or iconified state and return the resulting size
    fn restore(&mut self, window: NativeId) -> Result<Size, PlatformError>;

    /// Iconify
    fn iconify(&mut self, window: NativeId) -> Result<(), PlatformError>;

    /// Give the window input focus
    fn focus(&mut self, window: NativeId) -> Result<(), PlatformError>;

    /// Flash or highlight the window; a no-op where unsupported
    fn request_attention(&mut self, window: NativeId) -> Result<(), PlatformError> {
        let _ = window;
        Ok(())
    }

    /// Set or clear the pending close request flag
    fn set_close_requested(&mut self, window: NativeId, requested: bool) -> Result<(), PlatformError>;

    /// Drain pending platform events without blocking
    fn poll_events(&mut self, events: &mut Vec<RawEvent>);

    /// Block until events are pending or the timeout expires
    fn wait_events(&mut self, timeout: Option<Duration>);

    /// Handle a rendering backend can attach to
    fn surface(&self, window: NativeId) -> Result<SurfaceHandle, PlatformError>;

    /// Prepare the surface for drawing (e.g. make a GL context current)
    fn begin_frame(&mut self, window: NativeId) -> Result<(), PlatformError> {
        let _ = window;
        Ok(())
    }

    /// Publish the frame drawn since `begin_frame`
    fn present(&mut self, window: NativeId) -> Result<(), PlatformError>;

    /// Resolve an OpenGL function for the window's context
    fn gl_proc_address(&mut self, window: NativeId, name: &str) -> Result<*const c_void, PlatformError> {
        let _ = (window, name);
        Err(PlatformError::Unsupported {
            backend: self.name(),
            operation: "OpenGL proc lookup",
        })
    }

    /// CPU framebuffer of a `Pixels` surface, `0x00RRGGBB` per pixel
    fn pixels_mut(&mut self, window: NativeId) -> Result<&mut [u32], PlatformError> {
        let _ = window;
        Err(PlatformError::Unsupported {
            backend: self.name(),
            operation: "pixel buffers",
        })
    }
}
