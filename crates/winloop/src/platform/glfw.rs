//! Window management using GLFW
//!
//! One `Glfw` token drives every window. Each window keeps its own event
//! receiver; `poll_events` pumps GLFW once and then flushes the receivers in
//! window-creation order, so events of one window stay in platform order.
//!
//! # Surfaces
//!
//! - `Native` windows are created with `ClientApi(NoApi)` and expose raw
//!   handles for Vulkan or wgpu
//! - `OpenGl` windows own a context; `present` swaps buffers
//! - `Pixels` surfaces are not provided by GLFW

use std::collections::BTreeMap;
use std::ffi::c_void;
use std::time::Duration;

use glfw::Context as _;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::foundation::math::{ContentScale, Position, Rect, Size, SizeLimits};
use crate::input::{KeyAction, KeyCode, Modifiers, MouseButton};
use crate::monitor::{Monitor, MonitorId};
use crate::platform::{NativeId, NativeWindow, Platform, PlatformError, RawEvent, RawEventKind};
use crate::surface::{SurfaceHandle, SurfaceKind};
use crate::window::WindowConfig;

const BACKEND: &str = "glfw";

struct GlfwWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    surface: SurfaceKind,
}

/// GLFW platform backend
pub struct GlfwPlatform {
    glfw: glfw::Glfw,
    windows: BTreeMap<NativeId, GlfwWindow>,
    next_id: u64,
}

impl GlfwPlatform {
    /// Initialize GLFW; GLFW's own error reports go to the log
    pub fn new() -> Result<Self, PlatformError> {
        let glfw = glfw::init(|error, description| {
            log::error!("GLFW error {error:?}: {description}");
        })
        .map_err(|e| PlatformError::InitializationFailed(e.to_string()))?;

        log::info!("GLFW {} initialized", glfw::get_version_string());
        Ok(Self {
            glfw,
            windows: BTreeMap::new(),
            next_id: 1,
        })
    }

    fn entry(&self, window: NativeId) -> Result<&GlfwWindow, PlatformError> {
        self.windows.get(&window).ok_or(PlatformError::UnknownWindow(window))
    }

    fn entry_mut(&mut self, window: NativeId) -> Result<&mut GlfwWindow, PlatformError> {
        self.windows.get_mut(&window).ok_or(PlatformError::UnknownWindow(window))
    }

    fn apply_hints(&mut self, config: &WindowConfig) {
        self.glfw.default_window_hints();
        match config.surface {
            SurfaceKind::Native => {
                self.glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
            }
            SurfaceKind::OpenGl { major, minor, gles } => {
                let api = if gles {
                    glfw::ClientApiHint::OpenGlEs
                } else {
                    glfw::ClientApiHint::OpenGl
                };
                self.glfw.window_hint(glfw::WindowHint::ClientApi(api));
                self.glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
                if !gles && (major, minor) >= (3, 2) {
                    self.glfw
                        .window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
                    self.glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(cfg!(target_os = "macos")));
                }
            }
            SurfaceKind::Pixels => {}
        }
        self.glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));
        self.glfw.window_hint(glfw::WindowHint::Floating(config.floating));
        self.glfw.window_hint(glfw::WindowHint::Decorated(config.decorated));
        self.glfw.window_hint(glfw::WindowHint::Focused(config.focused));
        self.glfw.window_hint(glfw::WindowHint::FocusOnShow(config.focused));
        self.glfw.window_hint(glfw::WindowHint::Maximized(config.maximized));
        // Shown after positioning
        self.glfw.window_hint(glfw::WindowHint::Visible(false));
    }
}

fn size_from(width: i32, height: i32) -> Size {
    Size::new(u32::try_from(width).unwrap_or(0), u32::try_from(height).unwrap_or(0))
}

fn snapshot_monitor(index: usize, monitor: &glfw::Monitor) -> Monitor {
    let (x, y) = monitor.get_pos();
    let (wx, wy, ww, wh) = monitor.get_workarea();
    let (sx, sy) = monitor.get_content_scale();
    let mode = monitor.get_video_mode();
    let work_area = size_from(ww, wh);
    Monitor {
        id: MonitorId(u32::try_from(index).unwrap_or(u32::MAX)),
        name: monitor.get_name(),
        position: Position::new(x, y),
        work_area: Rect::new(wx, wy, work_area.width, work_area.height),
        content_scale: ContentScale::new(sx, sy),
        video_size: mode.as_ref().map(|mode| Size::new(mode.width, mode.height)),
        refresh_rate: mode.as_ref().map(|mode| mode.refresh_rate),
        // GLFW always lists the primary monitor first
        primary: index == 0,
    }
}

impl Platform for GlfwPlatform {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn monitors(&mut self) -> Vec<Monitor> {
        self.glfw.with_connected_monitors(|_, monitors| {
            monitors
                .iter()
                .enumerate()
                .map(|(index, monitor)| snapshot_monitor(index, monitor))
                .collect()
        })
    }

    fn primary_monitor(&mut self) -> Option<Monitor> {
        self.glfw
            .with_primary_monitor(|_, monitor| monitor.map(|monitor| snapshot_monitor(0, monitor)))
    }

    fn create_window(
        &mut self,
        config: &WindowConfig,
        parent: Option<NativeId>,
    ) -> Result<NativeWindow, PlatformError> {
        if config.surface == SurfaceKind::Pixels {
            return Err(PlatformError::Unsupported {
                backend: BACKEND,
                operation: "pixel buffer surfaces",
            });
        }

        let parent_area = match parent {
            Some(parent) => {
                let parent = &self.entry(parent)?.window;
                let (x, y) = parent.get_pos();
                let (w, h) = parent.get_size();
                let size = size_from(w, h);
                Some(Rect::new(x, y, size.width, size.height))
            }
            None => None,
        };

        self.apply_hints(config);
        let (mut window, events) = self
            .glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| PlatformError::CreationFailed(format!("GLFW refused window '{}'", config.title)))?;

        window.set_all_polling(true);
        let limits = config.size_limits;
        window.set_size_limits(limits.min_width, limits.min_height, limits.max_width, limits.max_height);

        if !config.maximized {
            let size = limits.clamp(config.size());
            match (config.position, parent_area) {
                (Some(position), _) => window.set_pos(position.x, position.y),
                (None, Some(area)) => {
                    let position = area.centered(size);
                    window.set_pos(position.x, position.y);
                }
                (None, None) => {}
            }
        }
        if config.visible {
            window.show();
        }

        let id = NativeId(self.next_id);
        self.next_id += 1;

        let (x, y) = window.get_pos();
        let (w, h) = window.get_size();
        let (fw, fh) = window.get_framebuffer_size();
        let (sx, sy) = window.get_content_scale();
        let created = NativeWindow {
            id,
            size: size_from(w, h),
            framebuffer_size: size_from(fw, fh),
            position: Position::new(x, y),
            content_scale: ContentScale::new(sx, sy),
            focused: window.is_focused(),
            maximized: window.is_maximized(),
        };
        log::debug!("GLFW window {id:?} '{}' created: {created:?}", config.title);

        self.windows.insert(
            id,
            GlfwWindow {
                window,
                events,
                surface: config.surface,
            },
        );
        Ok(created)
    }

    fn destroy_window(&mut self, window: NativeId) {
        // Dropping the PWindow destroys the native window
        if self.windows.remove(&window).is_some() {
            log::debug!("GLFW window {window:?} destroyed");
        }
    }

    fn set_title(&mut self, window: NativeId, title: &str) -> Result<(), PlatformError> {
        self.entry_mut(window)?.window.set_title(title);
        Ok(())
    }

    fn set_position(&mut self, window: NativeId, position: Position) -> Result<(), PlatformError> {
        self.entry_mut(window)?.window.set_pos(position.x, position.y);
        Ok(())
    }

    fn set_size(&mut self, window: NativeId, size: Size) -> Result<(), PlatformError> {
        let width = i32::try_from(size.width).unwrap_or(i32::MAX);
        let height = i32::try_from(size.height).unwrap_or(i32::MAX);
        self.entry_mut(window)?.window.set_size(width, height);
        Ok(())
    }

    fn set_size_limits(&mut self, window: NativeId, limits: SizeLimits) -> Result<(), PlatformError> {
        self.entry_mut(window)?
            .window
            .set_size_limits(limits.min_width, limits.min_height, limits.max_width, limits.max_height);
        Ok(())
    }

    fn maximize(&mut self, window: NativeId) -> Result<Size, PlatformError> {
        let entry = self.entry_mut(window)?;
        entry.window.maximize();
        let (w, h) = entry.window.get_size();
        Ok(size_from(w, h))
    }

    fn restore(&mut self, window: NativeId) -> Result<Size, PlatformError> {
        let entry = self.entry_mut(window)?;
        entry.window.restore();
        let (w, h) = entry.window.get_size();
        Ok(size_from(w, h))
    }

    fn iconify(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.entry_mut(window)?.window.iconify();
        Ok(())
    }

    fn focus(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.entry_mut(window)?.window.focus();
        Ok(())
    }

    fn request_attention(&mut self, window: NativeId) -> Result<(), PlatformError> {
        self.entry_mut(window)?.window.request_attention();
        Ok(())
    }

    fn set_close_requested(&mut self, window: NativeId, requested: bool) -> Result<(), PlatformError> {
        self.entry_mut(window)?.window.set_should_close(requested);
        Ok(())
    }

    fn poll_events(&mut self, events: &mut Vec<RawEvent>) {
        self.glfw.poll_events();
        for (id, entry) in &self.windows {
            for (_, event) in glfw::flush_messages(&entry.events) {
                if let Some(kind) = translate_event(event) {
                    events.push(RawEvent::new(*id, kind));
                }
            }
        }
    }

    fn wait_events(&mut self, timeout: Option<Duration>) {
        match timeout {
            Some(timeout) => self.glfw.wait_events_timeout(timeout.as_secs_f64()),
            None => self.glfw.wait_events(),
        }
    }

    fn surface(&self, window: NativeId) -> Result<SurfaceHandle, PlatformError> {
        let entry = self.entry(window)?;
        match entry.surface {
            SurfaceKind::Native => {
                let handle = entry
                    .window
                    .window_handle()
                    .map_err(|e| PlatformError::Surface(e.to_string()))?;
                let display = entry
                    .window
                    .display_handle()
                    .map_err(|e| PlatformError::Surface(e.to_string()))?;
                Ok(SurfaceHandle::Native {
                    window: handle.as_raw(),
                    display: display.as_raw(),
                })
            }
            SurfaceKind::OpenGl { major, minor, gles } => Ok(SurfaceHandle::OpenGl { major, minor, gles }),
            SurfaceKind::Pixels => Err(PlatformError::Unsupported {
                backend: BACKEND,
                operation: "pixel buffer surfaces",
            }),
        }
    }

    fn begin_frame(&mut self, window: NativeId) -> Result<(), PlatformError> {
        let entry = self.entry_mut(window)?;
        if entry.surface.has_context() {
            entry.window.make_current();
        }
        Ok(())
    }

    fn present(&mut self, window: NativeId) -> Result<(), PlatformError> {
        let entry = self.entry_mut(window)?;
        if entry.surface.has_context() {
            entry.window.swap_buffers();
        }
        Ok(())
    }

    fn gl_proc_address(&mut self, window: NativeId, name: &str) -> Result<*const c_void, PlatformError> {
        let entry = self.entry_mut(window)?;
        if !entry.surface.has_context() {
            return Err(PlatformError::Surface(format!("window {window:?} has no OpenGL context")));
        }
        Ok(entry.window.get_proc_address(name))
    }
}

fn translate_event(event: glfw::WindowEvent) -> Option<RawEventKind> {
    use glfw::WindowEvent as E;

    Some(match event {
        E::Pos(x, y) => RawEventKind::Moved { x, y },
        E::Size(w, h) => {
            let size = size_from(w, h);
            RawEventKind::Resized { width: size.width, height: size.height }
        }
        E::FramebufferSize(w, h) => {
            let size = size_from(w, h);
            RawEventKind::FramebufferResized { width: size.width, height: size.height }
        }
        E::Close => RawEventKind::CloseRequested,
        E::Refresh => RawEventKind::Refresh,
        E::Focus(focused) => RawEventKind::Focused(focused),
        E::Iconify(iconified) => RawEventKind::Iconified(iconified),
        E::Maximize(maximized) => RawEventKind::Maximized(maximized),
        E::ContentScale(x, y) => RawEventKind::ContentScaleChanged { x, y },
        E::CursorPos(x, y) => RawEventKind::CursorMoved { x, y },
        E::CursorEnter(entered) => RawEventKind::CursorEntered(entered),
        E::MouseButton(button, action, mods) => RawEventKind::MouseButton {
            button: translate_button(button),
            pressed: action != glfw::Action::Release,
            modifiers: translate_modifiers(mods),
        },
        E::Scroll(dx, dy) => RawEventKind::Scroll { dx, dy },
        E::Key(key, scancode, action, mods) => RawEventKind::Key {
            key: translate_key(key),
            scancode,
            action: match action {
                glfw::Action::Press => KeyAction::Press,
                glfw::Action::Release => KeyAction::Release,
                glfw::Action::Repeat => KeyAction::Repeat,
            },
            modifiers: translate_modifiers(mods),
        },
        E::Char(character) => RawEventKind::Char(character),
        E::FileDrop(paths) => RawEventKind::FileDropped(paths),
        // Char is reported separately; CharModifiers would duplicate it
        _ => return None,
    })
}

fn translate_button(button: glfw::MouseButton) -> MouseButton {
    match button {
        glfw::MouseButton::Button1 => MouseButton::Left,
        glfw::MouseButton::Button2 => MouseButton::Right,
        glfw::MouseButton::Button3 => MouseButton::Middle,
        glfw::MouseButton::Button4 => MouseButton::Other(4),
        glfw::MouseButton::Button5 => MouseButton::Other(5),
        glfw::MouseButton::Button6 => MouseButton::Other(6),
        glfw::MouseButton::Button7 => MouseButton::Other(7),
        glfw::MouseButton::Button8 => MouseButton::Other(8),
    }
}

fn translate_modifiers(mods: glfw::Modifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(glfw::Modifiers::Shift));
    out.set(Modifiers::CONTROL, mods.contains(glfw::Modifiers::Control));
    out.set(Modifiers::ALT, mods.contains(glfw::Modifiers::Alt));
    out.set(Modifiers::SUPER, mods.contains(glfw::Modifiers::Super));
    out.set(Modifiers::CAPS_LOCK, mods.contains(glfw::Modifiers::CapsLock));
    out.set(Modifiers::NUM_LOCK, mods.contains(glfw::Modifiers::NumLock));
    out
}

fn translate_key(key: glfw::Key) -> KeyCode {
    use glfw::Key as G;

    match key {
        G::A => KeyCode::A,
        G::B => KeyCode::B,
        G::C => KeyCode::C,
        G::D => KeyCode::D,
        G::E => KeyCode::E,
        G::F => KeyCode::F,
        G::G => KeyCode::G,
        G::H => KeyCode::H,
        G::I => KeyCode::I,
        G::J => KeyCode::J,
        G::K => KeyCode::K,
        G::L => KeyCode::L,
        G::M => KeyCode::M,
        G::N => KeyCode::N,
        G::O => KeyCode::O,
        G::P => KeyCode::P,
        G::Q => KeyCode::Q,
        G::R => KeyCode::R,
        G::S => KeyCode::S,
        G::T => KeyCode::T,
        G::U => KeyCode::U,
        G::V => KeyCode::V,
        G::W => KeyCode::W,
        G::X => KeyCode::X,
        G::Y => KeyCode::Y,
        G::Z => KeyCode::Z,
        G::Num0 => KeyCode::Digit0,
        G::Num1 => KeyCode::Digit1,
        G::Num2 => KeyCode::Digit2,
        G::Num3 => KeyCode::Digit3,
        G::Num4 => KeyCode::Digit4,
        G::Num5 => KeyCode::Digit5,
        G::Num6 => KeyCode::Digit6,
        G::Num7 => KeyCode::Digit7,
        G::Num8 => KeyCode::Digit8,
        G::Num9 => KeyCode::Digit9,
        G::F1 => KeyCode::F1,
        G::F2 => KeyCode::F2,
        G::F3 => KeyCode::F3,
        G::F4 => KeyCode::F4,
        G::F5 => KeyCode::F5,
        G::F6 => KeyCode::F6,
        G::F7 => KeyCode::F7,
        G::F8 => KeyCode::F8,
        G::F9 => KeyCode::F9,
        G::F10 => KeyCode::F10,
        G::F11 => KeyCode::F11,
        G::F12 => KeyCode::F12,
        G::Space => KeyCode::Space,
        G::Enter | G::KpEnter => KeyCode::Enter,
        G::Escape => KeyCode::Escape,
        G::Tab => KeyCode::Tab,
        G::Backspace => KeyCode::Backspace,
        G::Insert => KeyCode::Insert,
        G::Delete => KeyCode::Delete,
        G::Home => KeyCode::Home,
        G::End => KeyCode::End,
        G::PageUp => KeyCode::PageUp,
        G::PageDown => KeyCode::PageDown,
        G::Up => KeyCode::Up,
        G::Down => KeyCode::Down,
        G::Left => KeyCode::Left,
        G::Right => KeyCode::Right,
        G::Minus => KeyCode::Minus,
        G::Equal => KeyCode::Equal,
        G::Comma => KeyCode::Comma,
        G::Period => KeyCode::Period,
        G::Slash => KeyCode::Slash,
        G::Backslash => KeyCode::Backslash,
        G::Semicolon => KeyCode::Semicolon,
        G::Apostrophe => KeyCode::Apostrophe,
        G::LeftBracket => KeyCode::LeftBracket,
        G::RightBracket => KeyCode::RightBracket,
        G::GraveAccent => KeyCode::GraveAccent,
        G::CapsLock => KeyCode::CapsLock,
        G::LeftShift => KeyCode::LeftShift,
        G::RightShift => KeyCode::RightShift,
        G::LeftControl => KeyCode::LeftControl,
        G::RightControl => KeyCode::RightControl,
        G::LeftAlt => KeyCode::LeftAlt,
        G::RightAlt => KeyCode::RightAlt,
        G::LeftSuper => KeyCode::LeftSuper,
        G::RightSuper => KeyCode::RightSuper,
        G::Menu => KeyCode::Menu,
        _ => KeyCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_mouse_button() {
        let event = glfw::WindowEvent::MouseButton(
            glfw::MouseButton::Button1,
            glfw::Action::Press,
            glfw::Modifiers::Shift | glfw::Modifiers::Control,
        );
        assert_eq!(
            translate_event(event),
            Some(RawEventKind::MouseButton {
                button: MouseButton::Left,
                pressed: true,
                modifiers: Modifiers::SHIFT | Modifiers::CONTROL,
            })
        );
    }

    #[test]
    fn test_translate_key_repeat() {
        let event = glfw::WindowEvent::Key(glfw::Key::Num7, 16, glfw::Action::Repeat, glfw::Modifiers::empty());
        assert_eq!(
            translate_event(event),
            Some(RawEventKind::Key {
                key: KeyCode::Digit7,
                scancode: 16,
                action: KeyAction::Repeat,
                modifiers: Modifiers::empty(),
            })
        );
    }

    #[test]
    fn test_negative_sizes_clamp_to_zero() {
        assert_eq!(
            translate_event(glfw::WindowEvent::Size(-1, 200)),
            Some(RawEventKind::Resized { width: 0, height: 200 })
        );
    }

    #[test]
    fn test_close_and_unhandled() {
        assert_eq!(translate_event(glfw::WindowEvent::Close), Some(RawEventKind::CloseRequested));
        assert_eq!(translate_event(glfw::WindowEvent::Char('x')), Some(RawEventKind::Char('x')));
    }
}
