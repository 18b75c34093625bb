//! # Windows
//!
//! Creation parameters ([`WindowConfig`]), per-window runtime state
//! ([`WindowState`]) and the registry that owns every live window.
//!
//! ## Lifecycle
//!
//! A window is *open* from creation until `close` sets its `closed` flag.
//! From then on it is inert: queries still answer, mutators return
//! [`crate::RuntimeError::WindowClosed`] and no further events reach its
//! listeners. The registry drops it at the start of the next tick.

pub mod registry;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::core::config::InputConfig;
use crate::foundation::collections::WindowId;
use crate::foundation::math::{ContentScale, Position, Size, SizeLimits};
use crate::input::{ClickTracker, InputState};
use crate::platform::{NativeId, NativeWindow};
use crate::surface::SurfaceKind;

pub use registry::WindowRegistry;

/// Which monitor's work area a window should fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorBinding {
    /// The primary monitor
    Primary,
    /// Monitor at this index in enumeration order
    Index(u32),
}

/// # Window Configuration
///
/// Everything needed to create a window. Either `width`/`height` or a
/// `monitor` binding determines the initial size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Client-area width
    pub width: u32,
    /// Client-area height
    pub height: u32,
    /// Fill the work area of a monitor instead of using `width`/`height`
    pub monitor: Option<MonitorBinding>,
    /// Initial screen position; centered over the parent or platform-chosen otherwise
    pub position: Option<Position>,
    /// User can resize the window
    pub resizable: bool,
    /// Window stays above normal windows
    pub floating: bool,
    /// Window takes focus when shown
    pub focused: bool,
    /// Window has a title bar and border
    pub decorated: bool,
    /// Start maximized
    pub maximized: bool,
    /// Start visible
    pub visible: bool,
    /// Client-area size limits
    pub size_limits: SizeLimits,
    /// Drawing surface to create
    pub surface: SurfaceKind,
    /// Owning window, closed together with it
    #[serde(skip)]
    pub parent: Option<WindowId>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "winloop".to_string(),
            width: 800,
            height: 600,
            monitor: None,
            position: None,
            resizable: true,
            floating: false,
            focused: true,
            decorated: true,
            maximized: false,
            visible: true,
            size_limits: SizeLimits::default(),
            surface: SurfaceKind::Native,
            parent: None,
        }
    }
}

impl WindowConfig {
    /// Create a configuration with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the client-area size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Fill a monitor's work area
    pub fn with_monitor(mut self, monitor: MonitorBinding) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Set the initial position
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    /// Allow or forbid user resizing
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Keep the window above others
    pub fn with_floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }

    /// Take focus on creation
    pub fn with_focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Show or hide decorations
    pub fn with_decorated(mut self, decorated: bool) -> Self {
        self.decorated = decorated;
        self
    }

    /// Start maximized
    pub fn with_maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    /// Start visible or hidden
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set size limits
    pub fn with_size_limits(mut self, limits: SizeLimits) -> Self {
        self.size_limits = limits;
        self
    }

    /// Choose the drawing surface
    pub fn with_surface(mut self, surface: SurfaceKind) -> Self {
        self.surface = surface;
        self
    }

    /// Make this a child of `parent`
    pub fn with_parent(mut self, parent: WindowId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Initial size requested by the configuration
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.is_none() && self.size().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        if let SurfaceKind::OpenGl { major: 0, .. } = self.surface {
            return Err(ConfigError::Invalid("OpenGL major version must be at least 1".to_string()));
        }
        self.size_limits.validate().map_err(ConfigError::Invalid)
    }
}

impl crate::config::Config for WindowConfig {}

bitflags! {
    /// Window state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u16 {
        /// User can resize
        const RESIZABLE = 1 << 0;
        /// Always on top
        const FLOATING = 1 << 1;
        /// Has decorations
        const DECORATED = 1 << 2;
        /// Currently maximized
        const MAXIMIZED = 1 << 3;
        /// Currently iconified
        const MINIMIZED = 1 << 4;
        /// Has input focus
        const FOCUSED = 1 << 5;
        /// Shown on screen
        const VISIBLE = 1 << 6;
        /// Close requested; window is inert
        const CLOSED = 1 << 7;
    }
}

/// Runtime state of one window
#[derive(Debug, Clone)]
pub struct WindowState {
    pub(crate) id: WindowId,
    pub(crate) native: NativeId,
    pub(crate) title: String,
    pub(crate) size: Size,
    pub(crate) restored_size: Size,
    pub(crate) framebuffer_size: Size,
    pub(crate) position: Position,
    pub(crate) content_scale: ContentScale,
    pub(crate) flags: WindowFlags,
    pub(crate) size_limits: SizeLimits,
    pub(crate) surface: SurfaceKind,
    pub(crate) parent: Option<WindowId>,
    pub(crate) input: InputState,
    pub(crate) clicks: ClickTracker,
}

impl WindowState {
    pub(crate) fn new(id: WindowId, config: &WindowConfig, native: &NativeWindow, input: &InputConfig) -> Self {
        let mut flags = WindowFlags::empty();
        flags.set(WindowFlags::RESIZABLE, config.resizable);
        flags.set(WindowFlags::FLOATING, config.floating);
        flags.set(WindowFlags::DECORATED, config.decorated);
        flags.set(WindowFlags::VISIBLE, config.visible);
        flags.set(WindowFlags::MAXIMIZED, native.maximized);
        flags.set(WindowFlags::FOCUSED, native.focused);

        Self {
            id,
            native: native.id,
            title: config.title.clone(),
            size: native.size,
            restored_size: config.size_limits.clamp(config.size()),
            framebuffer_size: native.framebuffer_size,
            position: native.position,
            content_scale: native.content_scale,
            flags,
            size_limits: config.size_limits,
            surface: config.surface,
            parent: config.parent,
            input: InputState::new(),
            clicks: ClickTracker::new(input),
        }
    }

    /// Registry key
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Backend handle
    pub fn native(&self) -> NativeId {
        self.native
    }

    /// Title bar text
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Client-area size
    pub fn size(&self) -> Size {
        self.size
    }

    /// Size the window returns to when un-maximized
    pub fn restored_size(&self) -> Size {
        self.restored_size
    }

    /// Framebuffer size in physical pixels
    pub fn framebuffer_size(&self) -> Size {
        self.framebuffer_size
    }

    /// Screen position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Logical-to-physical pixel ratio
    pub fn content_scale(&self) -> ContentScale {
        self.content_scale
    }

    /// All state flags
    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    /// Has input focus
    pub fn is_focused(&self) -> bool {
        self.flags.contains(WindowFlags::FOCUSED)
    }

    /// Maximized
    pub fn is_maximized(&self) -> bool {
        self.flags.contains(WindowFlags::MAXIMIZED)
    }

    /// Iconified
    pub fn is_minimized(&self) -> bool {
        self.flags.contains(WindowFlags::MINIMIZED)
    }

    /// Close requested
    pub fn is_closed(&self) -> bool {
        self.flags.contains(WindowFlags::CLOSED)
    }

    /// Current size limits
    pub fn size_limits(&self) -> SizeLimits {
        self.size_limits
    }

    /// Surface the window was created with
    pub fn surface_kind(&self) -> SurfaceKind {
        self.surface
    }

    /// Owning window, if any
    pub fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    /// Pointer, button and key state
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Record a new client-area size; the restored size follows while the
    /// window is in its normal state
    pub(crate) fn apply_size(&mut self, size: Size) {
        self.size = size;
        if !self.is_maximized() && !self.is_minimized() && !size.is_empty() {
            self.restored_size = size;
        }
    }
}
