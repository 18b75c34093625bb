//! In-memory platform backend
//!
//! Windows and monitors exist only as data. Events are injected by the
//! caller and drained by `poll_events`, and every present is counted. The
//! backend mimics the confirmation events a real windowing system sends
//! after programmatic changes (resize after `set_size`, focus changes, ...).

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use crate::foundation::math::{ContentScale, Position, Rect, Size, SizeLimits};
use crate::monitor::{Monitor, MonitorId};
use crate::platform::{NativeId, NativeWindow, Platform, PlatformError, RawEvent, RawEventKind};
use crate::surface::{SurfaceHandle, SurfaceKind};
use crate::window::WindowConfig;

const BACKEND: &str = "headless";

#[derive(Debug, Clone)]
struct HeadlessMonitor {
    name: String,
    area: Rect,
    content_scale: ContentScale,
}

/// State of one in-memory window
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    /// Current title
    pub title: String,
    /// Client-area size
    pub size: Size,
    /// Size restored when leaving the maximized state
    pub restored_size: Size,
    /// Screen position
    pub position: Position,
    /// Active size limits
    pub size_limits: SizeLimits,
    /// Maximized
    pub maximized: bool,
    /// Iconified
    pub iconified: bool,
    /// Has focus
    pub focused: bool,
    /// Always on top
    pub floating: bool,
    /// Close flag as the platform sees it
    pub close_requested: bool,
    /// Attention requests received
    pub attention_requests: u32,
    /// Frames presented
    pub presents: u64,
    /// Parent window
    pub parent: Option<NativeId>,
    /// Surface the window was created with
    pub surface: SurfaceKind,
    pixels: Vec<u32>,
}

impl HeadlessWindow {
    /// Pixel buffer of a `Pixels` surface
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn resize_pixels(&mut self) {
        if self.surface == SurfaceKind::Pixels {
            let len = self.size.width as usize * self.size.height as usize;
            self.pixels.resize(len, 0);
        }
    }
}

/// Backend call recorded for ordering assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformCall {
    /// `create_window`
    Create(NativeId),
    /// `destroy_window`
    Destroy(NativeId),
    /// `begin_frame`
    BeginFrame(NativeId),
    /// `present`
    Present(NativeId),
    /// `focus`
    Focus(NativeId),
    /// `request_attention`
    RequestAttention(NativeId),
}

/// Platform backend without a windowing system
#[derive(Debug)]
pub struct HeadlessPlatform {
    monitors: Vec<HeadlessMonitor>,
    windows: BTreeMap<NativeId, HeadlessWindow>,
    next_id: u64,
    queue: VecDeque<RawEvent>,
    calls: Vec<PlatformCall>,
    fail_next_create: Option<String>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// A platform with one 1920x1080 primary monitor whose top 25 pixels are a menu bar
    pub fn new() -> Self {
        let mut platform = Self::without_displays();
        platform.attach_monitor(Rect::new(0, 25, 1920, 1055), ContentScale::default());
        platform
    }

    /// A platform with no monitors attached
    pub fn without_displays() -> Self {
        Self {
            monitors: Vec::new(),
            windows: BTreeMap::new(),
            next_id: 1,
            queue: VecDeque::new(),
            calls: Vec::new(),
            fail_next_create: None,
        }
    }

    /// Hot-plug a monitor; the first one attached is primary
    pub fn attach_monitor(&mut self, work_area: Rect, content_scale: ContentScale) {
        let name = format!("Headless Display {}", self.monitors.len() + 1);
        self.monitors.push(HeadlessMonitor {
            name,
            area: work_area,
            content_scale,
        });
    }

    /// Make the next `create_window` fail with `reason`
    pub fn fail_next_create(&mut self, reason: impl Into<String>) {
        self.fail_next_create = Some(reason.into());
    }

    /// Queue a raw event as if the windowing system had reported it
    pub fn inject(&mut self, window: NativeId, kind: RawEventKind) {
        self.queue.push_back(RawEvent::new(window, kind));
    }

    /// Simulate the user clicking the close box
    pub fn request_close(&mut self, window: NativeId) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.close_requested = true;
        }
        self.inject(window, RawEventKind::CloseRequested);
    }

    /// Simulate a DPI change, e.g. the window being dragged to another monitor
    pub fn change_content_scale(&mut self, window: NativeId, scale: ContentScale) {
        self.inject(window, RawEventKind::ContentScaleChanged { x: scale.x, y: scale.y });
    }

    /// State of a native window
    pub fn window(&self, window: NativeId) -> Option<&HeadlessWindow> {
        self.windows.get(&window)
    }

    /// Number of native windows alive
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Presents performed for a window
    pub fn presents(&self, window: NativeId) -> u64 {
        self.windows.get(&window).map_or(0, |state| state.presents)
    }

    /// Every recorded call, oldest first
    pub fn calls(&self) -> &[PlatformCall] {
        &self.calls
    }

    /// Forget recorded calls
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn window_mut(&mut self, window: NativeId) -> Result<&mut HeadlessWindow, PlatformError> {
        self.windows.get_mut(&window).ok_or(PlatformError::UnknownWindow(window))
    }

    fn primary_work_area(&self) -> Option<Rect> {
        self.monitors.first().map(|monitor| monitor.area)
    }

    fn apply_size(&mut self, window: NativeId, size: Size) -> Result<(), PlatformError> {
        let state = self.window_mut(window)?;
        if state.size == size {
            return Ok(());
        }
        state.size = size;
        state.resize_pixels();
        self.inject(window, RawEventKind::Resized { width: size.width, height: size.height });
        self.inject(window, RawEventKind::FramebufferResized { width: size.width, height: size.height });
        Ok(())
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn monitors(&mut self) -> Vec<Monitor> {
        self.monitors
            .iter()
            .enumerate()
            .map(|(index, monitor)| Monitor {
                id: MonitorId(u32::try_from(index).unwrap_or(u32::MAX)),
                name: Some(monitor.name.clone()),
                position: monitor.area.origin(),
                work_area: monitor.area,
                content_scale: monitor.content_scale,
                video_size: Some(monitor.area.size()),
                refresh_rate: Some(60),
                primary: index == 0,
            })
            .collect()
    }

    fn create_window(
        &mut self,
        config: &WindowConfig,
        parent: Option<NativeId>,
    ) -> Result<NativeWindow, PlatformError> {
        if let Some(reason) = self.fail_next_create.take() {
            return Err(PlatformError::CreationFailed(reason));
        }
        if let SurfaceKind::OpenGl { .. } = config.surface {
            return Err(PlatformError::CreationFailed(
                "no OpenGL implementation available without a display".to_string(),
            ));
        }

        let requested = config.size_limits.clamp(config.size());
        let size = match (config.maximized, self.primary_work_area()) {
            (true, Some(area)) => area.size(),
            _ => requested,
        };
        let parent_area = parent
            .and_then(|parent| self.windows.get(&parent))
            .map(|parent| Rect::new(parent.position.x, parent.position.y, parent.size.width, parent.size.height));
        let position = match (config.maximized, config.position, parent_area) {
            (true, _, _) => self.primary_work_area().map(|area| area.origin()).unwrap_or_default(),
            (false, Some(position), _) => position,
            (false, None, Some(area)) => area.centered(size),
            (false, None, None) => self
                .primary_work_area()
                .map(|area| area.centered(size))
                .unwrap_or_default(),
        };
        let content_scale = self.monitors.first().map(|m| m.content_scale).unwrap_or_default();

        let id = NativeId(self.next_id);
        self.next_id += 1;

        if config.focused {
            let previously_focused: Vec<NativeId> = self
                .windows
                .iter()
                .filter(|(_, state)| state.focused)
                .map(|(id, _)| *id)
                .collect();
            for other in previously_focused {
                if let Some(state) = self.windows.get_mut(&other) {
                    state.focused = false;
                }
                self.inject(other, RawEventKind::Focused(false));
            }
        }

        let mut window = HeadlessWindow {
            title: config.title.clone(),
            size,
            restored_size: requested,
            position,
            size_limits: config.size_limits,
            maximized: config.maximized,
            iconified: false,
            focused: config.focused,
            floating: config.floating,
            close_requested: false,
            attention_requests: 0,
            presents: 0,
            parent,
            surface: config.surface,
            pixels: Vec::new(),
        };
        window.resize_pixels();
        self.windows.insert(id, window);
        self.calls.push(PlatformCall::Create(id));
        log::debug!("Headless window {id:?} created at {position:?} with size {size:?}");

        Ok(NativeWindow {
            id,
            size,
            framebuffer_size: size,
            position,
            content_scale,
            focused: config.focused,
            maximized: config.maximized,
        })
    }

    fn destroy_window(&mut self, window: NativeId) {
        if self.windows.remove(&window).is_some() {
            self.queue.retain(|event| event.window != window);
            self.calls.push(PlatformCall::Destroy(window));
        }
    }

    fn set_title(&mut self, window: NativeId, title: &str) -> Result<(), PlatformError> {
        self.window_mut(window)?.title = title.to_string();
        Ok(())
    }

    fn set_position(&mut self, window: NativeId, position: Position) -> Result<(), PlatformError> {
        let state = self.window_mut(window)?;
        if state.position != position {
            state.position = position;
            self.inject(window, RawEventKind::Moved { x: position.x, y: position.y });
        }
        Ok(())
    }

    fn set_size(&mut self, window: NativeId, size: Size) -> Result<(), PlatformError> {
        let state = self.window_mut(window)?;
        let size = state.size_limits.clamp(size);
        state.restored_size = size;
        if state.maximized {
            return Ok(());
        }
        self.apply_size(window, size)
    }

    fn set_size_limits(&mut self, window: NativeId, limits: SizeLimits) -> Result<(), PlatformError> {
        let state = self.window_mut(window)?;
        state.size_limits = limits;
        state.restored_size = limits.clamp(state.restored_size);
        if state.maximized {
            return Ok(());
        }
        let clamped = limits.clamp(state.size);
        self.apply_size(window, clamped)
    }

    fn maximize(&mut self, window: NativeId) -> Result<Size, PlatformError> {
        let area = self.primary_work_area();
        let state = self.window_mut(window)?;
        if state.maximized {
            return Ok(state.size);
        }
        let size = area.map_or(state.size, |area| area.size());
        state.maximized = true;
        state.iconified = false;
        if let Some(area) = area {
            state.position = area.origin();
        }
        self.inject(window, RawEventKind::Maximized(true));
        self.apply_size(window, size)?;
        Ok(size)
    }

    fn restore(&mut self, window: NativeId) -> Result<Size, PlatformError> {
        let state = self.window_mut(window)?;
        let was_maximized = std::mem::replace(&mut state.maximized, false);
        let was_iconified = std::mem::replace(&mut state.iconified, false);
        let size = state.restored_size;
        if was_iconified {
            self.inject(window, RawEventKind::Iconified(false));
        }
        if was_maximized {
            self.inject(window, RawEventKind::Maximized(false));
        }
        self.apply_size(window, size)?;
        Ok(size)
    }

    fn iconify(&mut self, window: NativeId) -> Result<(), PlatformError> {
        let state = self.window_mut(window)?;
        if !state.iconified {
            state.iconified = true;
            self.inject(window, RawEventKind::Iconified(true));
        }
        Ok(())
    }

    fn focus(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.window_mut(window)?;
        self.calls.push(PlatformCall::Focus(window));
        let mut changes: Vec<(NativeId, bool)> = self
            .windows
            .iter()
            .filter(|(id, state)| state.focused != (**id == window))
            .map(|(id, _)| (*id, *id == window))
            .collect();
        // Blur reaches the old window before focus reaches the new one
        changes.sort_by_key(|(_, focused)| *focused);
        for (id, focused) in changes {
            if let Some(state) = self.windows.get_mut(&id) {
                state.focused = focused;
            }
            self.inject(id, RawEventKind::Focused(focused));
        }
        Ok(())
    }

    fn request_attention(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.window_mut(window)?.attention_requests += 1;
        self.calls.push(PlatformCall::RequestAttention(window));
        Ok(())
    }

    fn set_close_requested(&mut self, window: NativeId, requested: bool) -> Result<(), PlatformError> {
        self.window_mut(window)?.close_requested = requested;
        Ok(())
    }

    fn poll_events(&mut self, events: &mut Vec<RawEvent>) {
        events.extend(self.queue.drain(..));
    }

    fn wait_events(&mut self, timeout: Option<Duration>) {
        // Nothing can arrive asynchronously; honour short timeouts so pacing tests stay realistic
        if self.queue.is_empty() {
            if let Some(timeout) = timeout.filter(|t| *t <= Duration::from_millis(50)) {
                std::thread::sleep(timeout);
            }
        }
    }

    fn surface(&self, window: NativeId) -> Result<SurfaceHandle, PlatformError> {
        let state = self.windows.get(&window).ok_or(PlatformError::UnknownWindow(window))?;
        Ok(match state.surface {
            SurfaceKind::Pixels => SurfaceHandle::Pixels {
                width: state.size.width,
                height: state.size.height,
            },
            SurfaceKind::Native | SurfaceKind::OpenGl { .. } => SurfaceHandle::Detached,
        })
    }

    fn begin_frame(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.window_mut(window)?;
        self.calls.push(PlatformCall::BeginFrame(window));
        Ok(())
    }

    fn present(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.window_mut(window)?.presents += 1;
        self.calls.push(PlatformCall::Present(window));
        Ok(())
    }

    fn pixels_mut(&mut self, window: NativeId) -> Result<&mut [u32], PlatformError> {
        let state = self.window_mut(window)?;
        if state.surface != SurfaceKind::Pixels {
            return Err(PlatformError::Surface(format!("window {window:?} has no pixel buffer")));
        }
        Ok(&mut state.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(platform: &mut HeadlessPlatform) -> Vec<RawEventKind> {
        let mut events = Vec::new();
        platform.poll_events(&mut events);
        events.into_iter().map(|event| event.kind).collect()
    }

    #[test]
    fn test_maximized_window_fills_work_area() {
        let mut platform = HeadlessPlatform::new();
        let config = WindowConfig::new("max").with_size(500, 500).with_maximized(true);
        let created = platform.create_window(&config, None).unwrap();
        assert!(created.maximized);
        assert_eq!(created.size, Size::new(1920, 1055));
        assert_eq!(created.position, Position::new(0, 25));

        assert_eq!(platform.restore(created.id).unwrap(), Size::new(500, 500));
        assert!(!platform.window(created.id).unwrap().maximized);
    }

    #[test]
    fn test_child_is_centered_over_parent() {
        let mut platform = HeadlessPlatform::new();
        let parent = platform
            .create_window(&WindowConfig::new("parent").with_size(800, 600).with_position(100, 100), None)
            .unwrap();
        let child = platform
            .create_window(&WindowConfig::new("child").with_size(200, 100), Some(parent.id))
            .unwrap();
        assert_eq!(child.position, Position::new(400, 350));
    }

    #[test]
    fn test_size_limits_clamp_and_report() {
        let mut platform = HeadlessPlatform::new();
        let window = platform.create_window(&WindowConfig::new("w").with_size(640, 480), None).unwrap();
        drain(&mut platform);
        platform.set_size_limits(window.id, SizeLimits::new(900, 500, 3000, 3000)).unwrap();
        assert_eq!(platform.window(window.id).unwrap().size, Size::new(900, 500));
        assert_eq!(
            drain(&mut platform),
            vec![
                RawEventKind::Resized { width: 900, height: 500 },
                RawEventKind::FramebufferResized { width: 900, height: 500 },
            ]
        );
    }

    #[test]
    fn test_focus_moves_between_windows() {
        let mut platform = HeadlessPlatform::new();
        let a = platform.create_window(&WindowConfig::new("a"), None).unwrap();
        let b = platform.create_window(&WindowConfig::new("b"), None).unwrap();
        assert!(!platform.window(a.id).unwrap().focused);
        drain(&mut platform);

        platform.focus(a.id).unwrap();
        let events: Vec<RawEvent> = {
            let mut events = Vec::new();
            platform.poll_events(&mut events);
            events
        };
        assert_eq!(events[0], RawEvent::new(b.id, RawEventKind::Focused(false)));
        assert_eq!(events[1], RawEvent::new(a.id, RawEventKind::Focused(true)));
    }

    #[test]
    fn test_destroy_drops_queued_events() {
        let mut platform = HeadlessPlatform::new();
        let window = platform.create_window(&WindowConfig::new("w"), None).unwrap();
        platform.inject(window.id, RawEventKind::Refresh);
        platform.destroy_window(window.id);
        assert!(drain(&mut platform).is_empty());
        assert!(matches!(platform.present(window.id), Err(PlatformError::UnknownWindow(_))));
    }

    #[test]
    fn test_pixel_surface_follows_size() {
        let mut platform = HeadlessPlatform::new();
        let config = WindowConfig::new("pixels").with_size(4, 2).with_surface(SurfaceKind::Pixels);
        let window = platform.create_window(&config, None).unwrap();
        assert_eq!(platform.pixels_mut(window.id).unwrap().len(), 8);
        platform.set_size(window.id, Size::new(3, 3)).unwrap();
        assert_eq!(platform.pixels_mut(window.id).unwrap().len(), 9);
        assert_eq!(platform.surface(window.id).unwrap(), SurfaceHandle::Pixels { width: 3, height: 3 });
    }

    #[test]
    fn test_opengl_is_unavailable() {
        let mut platform = HeadlessPlatform::new();
        let config = WindowConfig::new("gl").with_surface(SurfaceKind::opengl(3, 3));
        assert!(matches!(platform.create_window(&config, None), Err(PlatformError::CreationFailed(_))));
    }
}
