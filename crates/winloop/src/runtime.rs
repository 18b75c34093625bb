//! # Runtime
//!
//! [`Runtime`] owns the platform backend, the window registry, the event
//! dispatcher and the timers. Applications either drive it themselves with
//! [`Runtime::poll_events`] or hand control to the frame scheduler with
//! [`Runtime::run`].
//!
//! ## Callbacks and borrowing
//!
//! Listeners, draw callbacks and timers receive a [`Context`]: a mutable view
//! of the runtime. Through it they can query and mutate windows, add and
//! remove listeners, schedule timers, or stop the loop while the runtime is
//! in the middle of dispatching. The running callback is taken out of its
//! slot for the duration of the call.
//!
//! ## Close semantics
//!
//! `close` only sets a window's `closed` flag (cascading to its children).
//! The native window is destroyed, the registry entry removed and the
//! terminal `windowClose` event delivered at the next tick boundary or
//! `poll_events` call.

use std::ffi::c_void;
use std::time::{Duration, Instant};

use crate::core::config::{InputConfig, RuntimeConfig};
use crate::error::{run_guarded, CallbackOrigin, CallbackResult, RuntimeError, RuntimeResult};
use crate::events::{Dispatcher, Event, EventData, EventKind, Scope};
use crate::foundation::collections::{ListenerId, TimerId, WindowId};
use crate::foundation::math::{ContentScale, Point, Position, Size, SizeLimits};
use crate::input::{ClickOutcome, InputState, KeyAction, Modifiers, MouseButton};
use crate::monitor::{self, Monitor};
use crate::platform::{NativeId, Platform, PlatformError, RawEvent, RawEventKind};
use crate::scheduler::{LoopControl, SchedulerState};
use crate::surface::SurfaceHandle;
use crate::timers::Timers;
use crate::window::{MonitorBinding, WindowConfig, WindowFlags, WindowRegistry, WindowState};

#[cfg(feature = "glfw")]
use crate::platform::glfw::GlfwPlatform;

/// Runtime view handed to listeners, draw callbacks and timers
pub struct Context<'a, P: Platform> {
    platform: &'a mut P,
    windows: &'a mut WindowRegistry,
    timers: &'a mut Timers<P>,
    control: &'a mut LoopControl,
    input: &'a InputConfig,
    dispatcher: &'a mut Dispatcher<P>,
}

impl<'a, P: Platform> Context<'a, P> {
    pub(crate) fn new(
        platform: &'a mut P,
        windows: &'a mut WindowRegistry,
        timers: &'a mut Timers<P>,
        control: &'a mut LoopControl,
        input: &'a InputConfig,
        dispatcher: &'a mut Dispatcher<P>,
    ) -> Self {
        Self {
            platform,
            windows,
            timers,
            control,
            input,
            dispatcher,
        }
    }

    /// Enumerate connected monitors
    pub fn monitors(&mut self) -> Vec<Monitor> {
        monitor::list_monitors(&mut *self.platform)
    }

    /// Primary monitor, [`RuntimeError::NoDisplay`] without displays
    pub fn primary_monitor(&mut self) -> RuntimeResult<Monitor> {
        monitor::primary_monitor(&mut *self.platform)
    }

    /// Create a window
    pub fn create_window(&mut self, config: &WindowConfig) -> RuntimeResult<WindowId> {
        config.validate()?;

        let mut resolved = config.clone();
        if let Some(binding) = config.monitor {
            let monitors = self.monitors();
            let monitor = match binding {
                MonitorBinding::Primary => monitors.into_iter().find(|monitor| monitor.primary),
                MonitorBinding::Index(index) => {
                    monitors.into_iter().nth(usize::try_from(index).unwrap_or(usize::MAX))
                }
            }
            .ok_or(RuntimeError::NoDisplay)?;
            resolved.width = monitor.work_area.width;
            resolved.height = monitor.work_area.height;
            resolved.position = Some(monitor.work_area.origin());
        }

        let parent = match config.parent {
            Some(parent) => Some(self.windows.live(parent)?.native),
            None => None,
        };

        let native = self.platform.create_window(&resolved, parent).map_err(|err| {
            log::error!("Failed to create window '{}': {err}", resolved.title);
            RuntimeError::WindowCreation(err.to_string())
        })?;

        let input = self.input;
        let id = self
            .windows
            .insert_with(|id| WindowState::new(id, &resolved, &native, input));
        if native.focused {
            self.windows.set_exclusive_focus(id);
        }

        log::info!(
            "Created window {id:?} '{}' {}x{} at ({}, {}) on {}",
            resolved.title,
            native.size.width,
            native.size.height,
            native.position.x,
            native.position.y,
            self.platform.name()
        );
        Ok(id)
    }

    /// Window state, also for windows that are closed but not yet removed
    pub fn window(&self, id: WindowId) -> RuntimeResult<&WindowState> {
        self.windows.get(id).ok_or(RuntimeError::WindowClosed(id))
    }

    /// Input state of a window
    pub fn input(&self, id: WindowId) -> RuntimeResult<&InputState> {
        self.window(id).map(WindowState::input)
    }

    /// Closed flag; removed windows count as closed
    pub fn is_closed(&self, id: WindowId) -> bool {
        self.windows.is_closed(id)
    }

    /// Windows in the registry, including those waiting for removal
    pub fn active_window_count(&self) -> usize {
        self.windows.active_count()
    }

    /// Window keys in creation order
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.ids()
    }

    /// Close a window and its children; closing twice is a no-op
    pub fn close(&mut self, id: WindowId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if self.windows.mark_closed(next) {
                log::info!("Window {next:?} closed");
                pending.extend(self.windows.children_of(next));
            }
        }
    }

    fn live_native(&self, id: WindowId) -> RuntimeResult<NativeId> {
        self.windows.live(id).map(WindowState::native)
    }

    fn platform_result<T>(&mut self, id: WindowId, result: Result<T, PlatformError>) -> RuntimeResult<T> {
        result.map_err(|err| match err {
            PlatformError::UnknownWindow(native) => {
                log::warn!("Native window {native:?} of {id:?} disappeared; closing");
                self.close(id);
                RuntimeError::WindowClosed(id)
            }
            other => RuntimeError::Platform(other),
        })
    }

    /// Change the title
    pub fn set_title(&mut self, id: WindowId, title: &str) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.set_title(native, title);
        self.platform_result(id, result)?;
        self.windows.live_mut(id)?.title = title.to_string();
        Ok(())
    }

    /// Move the window
    pub fn set_position(&mut self, id: WindowId, position: Position) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.set_position(native, position);
        self.platform_result(id, result)?;
        self.windows.live_mut(id)?.position = position;
        Ok(())
    }

    /// Resize the client area, clamped to the window's size limits
    ///
    /// On a maximized window this only changes the size restored later.
    pub fn set_size(&mut self, id: WindowId, size: Size) -> RuntimeResult<()> {
        let state = self.windows.live(id)?;
        let native = state.native;
        let size = state.size_limits.clamp(size);
        let result = self.platform.set_size(native, size);
        self.platform_result(id, result)?;

        let state = self.windows.live_mut(id)?;
        if state.is_maximized() {
            state.restored_size = size;
        } else {
            state.apply_size(size);
        }
        Ok(())
    }

    /// Constrain the client-area size; the current size is clamped right away
    pub fn set_size_limits(&mut self, id: WindowId, limits: SizeLimits) -> RuntimeResult<()> {
        limits.validate().map_err(RuntimeError::InvalidArgument)?;
        let native = self.live_native(id)?;
        let result = self.platform.set_size_limits(native, limits);
        self.platform_result(id, result)?;

        let state = self.windows.live_mut(id)?;
        state.size_limits = limits;
        state.restored_size = limits.clamp(state.restored_size);
        if !state.is_maximized() {
            let clamped = limits.clamp(state.size);
            if clamped != state.size {
                state.apply_size(clamped);
            }
        }
        Ok(())
    }

    /// Maximize
    pub fn maximize(&mut self, id: WindowId) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.maximize(native);
        let size = self.platform_result(id, result)?;
        let state = self.windows.live_mut(id)?;
        state.flags.insert(WindowFlags::MAXIMIZED);
        state.flags.remove(WindowFlags::MINIMIZED);
        state.size = size;
        Ok(())
    }

    /// Leave the maximized or iconified state, back to the restored size
    pub fn restore(&mut self, id: WindowId) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.restore(native);
        let size = self.platform_result(id, result)?;
        let state = self.windows.live_mut(id)?;
        state.flags.remove(WindowFlags::MAXIMIZED | WindowFlags::MINIMIZED);
        state.apply_size(size);
        Ok(())
    }

    /// Iconify
    pub fn minimize(&mut self, id: WindowId) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.iconify(native);
        self.platform_result(id, result)?;
        self.windows.live_mut(id)?.flags.insert(WindowFlags::MINIMIZED);
        Ok(())
    }

    /// Give the window input focus
    pub fn focus(&mut self, id: WindowId) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.focus(native);
        self.platform_result(id, result)?;
        self.windows.set_exclusive_focus(id);
        Ok(())
    }

    /// Flash the taskbar entry or bounce the dock icon; a no-op where unsupported
    pub fn request_attention(&mut self, id: WindowId) -> RuntimeResult<()> {
        let native = self.live_native(id)?;
        let result = self.platform.request_attention(native);
        self.platform_result(id, result)
    }

    /// Surface handle for attaching a renderer
    pub fn surface_for(&mut self, id: WindowId) -> RuntimeResult<SurfaceHandle> {
        let native = self.window(id)?.native;
        let result = self.platform.surface(native);
        self.platform_result(id, result)
    }

    /// Pixel buffer of a `Pixels` surface
    pub fn pixels_mut(&mut self, id: WindowId) -> RuntimeResult<&mut [u32]> {
        let native = self.window(id)?.native;
        match self.platform.pixels_mut(native) {
            Ok(pixels) => Ok(pixels),
            Err(PlatformError::UnknownWindow(_)) => Err(RuntimeError::WindowClosed(id)),
            Err(err) => Err(RuntimeError::UnsupportedSurface(err.to_string())),
        }
    }

    /// OpenGL function pointer for an `OpenGl` surface
    pub fn gl_proc_address(&mut self, id: WindowId, name: &str) -> RuntimeResult<*const c_void> {
        let native = self.window(id)?.native;
        self.platform
            .gl_proc_address(native, name)
            .map_err(|err| RuntimeError::UnsupportedSurface(err.to_string()))
    }

    /// Run `callback` once after `delay`
    pub fn set_timeout<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.timers.set_timeout(Instant::now(), delay, callback)
    }

    /// Run `callback` every `period`
    pub fn set_interval<F>(&mut self, period: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.timers.set_interval(Instant::now(), period, callback)
    }

    /// Cancel a timer
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        self.timers.clear(id)
    }

    /// Subscribe to an event kind; the listener first sees the next event
    pub fn add_event_listener<F>(&mut self, kind: EventKind, scope: Scope, callback: F) -> ListenerId
    where
        F: FnMut(&mut Event, &mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.dispatcher.register(kind, scope, callback)
    }

    /// Subscribe by event name
    pub fn on<F>(&mut self, name: &str, scope: Scope, callback: F) -> RuntimeResult<ListenerId>
    where
        F: FnMut(&mut Event, &mut Context<'_, P>) -> CallbackResult + 'static,
    {
        let kind = name.parse::<EventKind>()?;
        Ok(self.dispatcher.register(kind, scope, callback))
    }

    /// Unsubscribe; takes effect for the event being delivered too
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.unregister(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Ask the scheduler to stop at the next tick boundary
    pub fn stop(&mut self) {
        self.control.request_stop();
    }

    /// Platform backend
    pub fn platform(&self) -> &P {
        &*self.platform
    }

    /// Platform backend, mutably
    pub fn platform_mut(&mut self) -> &mut P {
        &mut *self.platform
    }
}

/// Window lifecycle and event dispatch runtime
pub struct Runtime<P: Platform> {
    pub(crate) platform: P,
    pub(crate) windows: WindowRegistry,
    pub(crate) dispatcher: Dispatcher<P>,
    pub(crate) timers: Timers<P>,
    pub(crate) control: LoopControl,
    pub(crate) config: RuntimeConfig,
    pub(crate) callback_failures: u64,
    raw_events: Vec<RawEvent>,
}

#[cfg(feature = "glfw")]
impl Runtime<GlfwPlatform> {
    /// Initialize logging and GLFW and create a runtime on top of them
    pub fn new(config: RuntimeConfig) -> RuntimeResult<Self> {
        crate::foundation::logging::init_with_level(&config.logging.level);
        let platform = GlfwPlatform::new()?;
        Self::with_platform(platform, config)
    }
}

impl<P: Platform> Runtime<P> {
    /// Create a runtime on an existing platform backend
    pub fn with_platform(platform: P, config: RuntimeConfig) -> RuntimeResult<Self> {
        config.validate()?;
        log::info!("Runtime starting on {} backend", platform.name());
        Ok(Self {
            platform,
            windows: WindowRegistry::new(),
            dispatcher: Dispatcher::new(),
            timers: Timers::new(),
            control: LoopControl::new(),
            config,
            callback_failures: 0,
            raw_events: Vec::new(),
        })
    }

    /// Runtime view for calling window operations
    pub fn context(&mut self) -> Context<'_, P> {
        Context::new(
            &mut self.platform,
            &mut self.windows,
            &mut self.timers,
            &mut self.control,
            &self.config.input,
            &mut self.dispatcher,
        )
    }

    /// Active configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Platform backend
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Platform backend, mutably
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Enumerate connected monitors
    pub fn list_monitors(&mut self) -> Vec<Monitor> {
        monitor::list_monitors(&mut self.platform)
    }

    /// Primary monitor, [`RuntimeError::NoDisplay`] without displays
    pub fn primary_monitor(&mut self) -> RuntimeResult<Monitor> {
        monitor::primary_monitor(&mut self.platform)
    }

    /// Create a window
    pub fn create_window(&mut self, config: &WindowConfig) -> RuntimeResult<WindowId> {
        self.context().create_window(config)
    }

    /// Window state, also for windows that are closed but not yet removed
    pub fn window(&self, id: WindowId) -> RuntimeResult<&WindowState> {
        self.windows.get(id).ok_or(RuntimeError::WindowClosed(id))
    }

    /// Input state of a window
    pub fn input(&self, id: WindowId) -> RuntimeResult<&InputState> {
        self.window(id).map(WindowState::input)
    }

    /// Closed flag; removed windows count as closed
    pub fn is_closed(&self, id: WindowId) -> bool {
        self.windows.is_closed(id)
    }

    /// Backend handle of a window
    pub fn native_id(&self, id: WindowId) -> RuntimeResult<NativeId> {
        self.window(id).map(WindowState::native)
    }

    /// Windows in the registry, including those waiting for removal
    pub fn active_window_count(&self) -> usize {
        self.windows.active_count()
    }

    /// Close a window and its children; closing twice is a no-op
    pub fn close(&mut self, id: WindowId) {
        self.context().close(id);
    }

    /// Change the title
    pub fn set_title(&mut self, id: WindowId, title: &str) -> RuntimeResult<()> {
        self.context().set_title(id, title)
    }

    /// Move the window
    pub fn set_position(&mut self, id: WindowId, position: Position) -> RuntimeResult<()> {
        self.context().set_position(id, position)
    }

    /// Resize the client area
    pub fn set_size(&mut self, id: WindowId, size: Size) -> RuntimeResult<()> {
        self.context().set_size(id, size)
    }

    /// Constrain the client-area size
    pub fn set_size_limits(&mut self, id: WindowId, limits: SizeLimits) -> RuntimeResult<()> {
        self.context().set_size_limits(id, limits)
    }

    /// Maximize
    pub fn maximize(&mut self, id: WindowId) -> RuntimeResult<()> {
        self.context().maximize(id)
    }

    /// Restore from maximized or iconified state
    pub fn restore(&mut self, id: WindowId) -> RuntimeResult<()> {
        self.context().restore(id)
    }

    /// Iconify
    pub fn minimize(&mut self, id: WindowId) -> RuntimeResult<()> {
        self.context().minimize(id)
    }

    /// Give the window input focus
    pub fn focus(&mut self, id: WindowId) -> RuntimeResult<()> {
        self.context().focus(id)
    }

    /// Request user attention
    pub fn request_attention(&mut self, id: WindowId) -> RuntimeResult<()> {
        self.context().request_attention(id)
    }

    /// Surface handle for attaching a renderer
    pub fn surface_for(&mut self, id: WindowId) -> RuntimeResult<SurfaceHandle> {
        self.context().surface_for(id)
    }

    /// Pixel buffer of a `Pixels` surface
    pub fn pixels_mut(&mut self, id: WindowId) -> RuntimeResult<&mut [u32]> {
        let native = self.window(id)?.native;
        match self.platform.pixels_mut(native) {
            Ok(pixels) => Ok(pixels),
            Err(PlatformError::UnknownWindow(_)) => Err(RuntimeError::WindowClosed(id)),
            Err(err) => Err(RuntimeError::UnsupportedSurface(err.to_string())),
        }
    }

    /// Publish a frame for applications driving their own loop
    pub fn present(&mut self, id: WindowId) -> RuntimeResult<()> {
        let native = self.window(id)?.native;
        let result = self.platform.present(native);
        self.context().platform_result(id, result)
    }

    /// Subscribe to an event kind
    pub fn add_event_listener<F>(&mut self, kind: EventKind, scope: Scope, callback: F) -> ListenerId
    where
        F: FnMut(&mut Event, &mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.dispatcher.register(kind, scope, callback)
    }

    /// Subscribe by event name (`"pointerdown"`, `"mousemove"`, `"windowClose"`, ...)
    pub fn on<F>(&mut self, name: &str, scope: Scope, callback: F) -> RuntimeResult<ListenerId>
    where
        F: FnMut(&mut Event, &mut Context<'_, P>) -> CallbackResult + 'static,
    {
        let kind = name.parse::<EventKind>()?;
        Ok(self.dispatcher.register(kind, scope, callback))
    }

    /// Unsubscribe; returns `false` if the listener was already gone
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.unregister(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Run `callback` once after `delay`
    pub fn set_timeout<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.timers.set_timeout(Instant::now(), delay, callback)
    }

    /// Run `callback` every `period`
    pub fn set_interval<F>(&mut self, period: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.timers.set_interval(Instant::now(), period, callback)
    }

    /// Cancel a timer
    pub fn clear_timer(&mut self, id: TimerId) -> bool {
        self.timers.clear(id)
    }

    /// Scheduler state
    pub fn scheduler_state(&self) -> SchedulerState {
        self.control.state()
    }

    /// Ask the scheduler to stop at the next tick boundary
    pub fn stop(&mut self) {
        self.control.request_stop();
    }

    /// Callbacks that returned an error or panicked so far
    pub fn callback_failures(&self) -> u64 {
        self.callback_failures
    }

    /// Remove closed windows, drain and dispatch pending platform events,
    /// then run due timers
    pub fn poll_events(&mut self) {
        self.finalize_closed();
        self.pump_events();
        self.run_due_timers(Instant::now());
    }

    /// Block until the platform has events or `timeout` expires, then
    /// dispatch them and run due timers
    ///
    /// The wait is cut short for the next timer deadline.
    pub fn wait_events(&mut self, timeout: Option<Duration>) {
        self.finalize_closed();
        let until_timer = self
            .timers
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()));
        let timeout = match (timeout, until_timer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.platform.wait_events(timeout);
        self.pump_events();
        self.run_due_timers(Instant::now());
    }

    /// Destroy windows whose close flag is set and deliver `windowClose`
    pub(crate) fn finalize_closed(&mut self) {
        loop {
            let pending = self.windows.take_pending_close();
            if pending.is_empty() {
                break;
            }
            for id in pending {
                let Some(state) = self.windows.remove(id) else {
                    continue;
                };
                self.platform.destroy_window(state.native);
                log::debug!("Window {id:?} '{}' removed", state.title);
                self.dispatch_event(Event::new(EventKind::WindowClosed, id, EventData::None));
                self.dispatcher.unregister_window(id);
            }
        }
    }

    pub(crate) fn pump_events(&mut self) {
        let mut raw = std::mem::take(&mut self.raw_events);
        self.platform.poll_events(&mut raw);
        for event in raw.drain(..) {
            self.process_raw_event(event);
        }
        self.raw_events = raw;
    }

    /// Deliver one event; `None` if its window is closed
    pub(crate) fn dispatch_event(&mut self, mut event: Event) -> Option<Event> {
        if event.kind() != EventKind::WindowClosed && self.windows.is_closed(event.window()) {
            log::trace!("Dropping '{}' for closed window {:?}", event.kind(), event.window());
            return None;
        }

        let kind = event.kind();
        for id in self.dispatcher.matching(&event) {
            let Some(mut callback) = self.dispatcher.take_callback(id) else {
                continue;
            };
            let result = {
                let mut ctx = self.context();
                run_guarded(CallbackOrigin::Listener { id, event: kind }, || {
                    callback(&mut event, &mut ctx)
                })
            };
            self.dispatcher.restore_callback(id, callback);
            if let Err(failure) = result {
                failure.report();
                self.callback_failures += 1;
            }
        }
        Some(event)
    }

    fn pointer_data(state: &WindowState, button: Option<MouseButton>, modifiers: Modifiers) -> EventData {
        EventData::Pointer {
            position: state.input.cursor().unwrap_or_else(Point::origin),
            button,
            modifiers,
        }
    }

    fn process_raw_event(&mut self, raw: RawEvent) {
        let Some(id) = self.windows.lookup_native(raw.window) else {
            log::trace!("Event for unknown native window {:?}: {:?}", raw.window, raw.kind);
            return;
        };
        let Some(state) = self.windows.get_mut(id).filter(|state| !state.is_closed()) else {
            return;
        };

        let event = match raw.kind {
            RawEventKind::CursorMoved { x, y } => {
                state.input.handle_pointer_move(Point::new(x, y));
                let data = Self::pointer_data(state, None, state.input.modifiers());
                Event::new(EventKind::PointerMove, id, data)
            }
            RawEventKind::CursorEntered(entered) => {
                state.input.handle_pointer_enter(entered);
                let kind = if entered { EventKind::PointerEnter } else { EventKind::PointerLeave };
                Event::new(kind, id, Self::pointer_data(state, None, state.input.modifiers()))
            }
            RawEventKind::MouseButton { button, pressed, modifiers } => {
                state.input.handle_mouse_button(button, pressed, modifiers);
                self.handle_button(id, button, pressed, modifiers);
                return;
            }
            RawEventKind::Scroll { dx, dy } => {
                let position = state.input.cursor().unwrap_or_else(Point::origin);
                Event::new(EventKind::Wheel, id, EventData::Wheel { position, dx, dy })
            }
            RawEventKind::Key { key, scancode, action, modifiers } => {
                state.input.handle_key_input(key, action, modifiers);
                let kind = if action == KeyAction::Release { EventKind::KeyUp } else { EventKind::KeyDown };
                let repeat = action == KeyAction::Repeat;
                Event::new(kind, id, EventData::Key { key, scancode, modifiers, repeat })
            }
            RawEventKind::Char(character) => Event::new(EventKind::Input, id, EventData::Input { character }),
            RawEventKind::Resized { width, height } => {
                let size = Size::new(width, height);
                state.apply_size(size);
                Event::new(EventKind::Resize, id, EventData::Resize { size })
            }
            RawEventKind::FramebufferResized { width, height } => {
                let size = Size::new(width, height);
                state.framebuffer_size = size;
                Event::new(EventKind::FramebufferResize, id, EventData::Resize { size })
            }
            RawEventKind::Moved { x, y } => {
                let position = Position::new(x, y);
                state.position = position;
                Event::new(EventKind::Move, id, EventData::Move { position })
            }
            RawEventKind::Focused(true) => {
                self.windows.set_exclusive_focus(id);
                Event::new(EventKind::Focus, id, EventData::None)
            }
            RawEventKind::Focused(false) => {
                state.flags.remove(WindowFlags::FOCUSED);
                state.input.release_all();
                state.clicks.disarm();
                Event::new(EventKind::Blur, id, EventData::None)
            }
            RawEventKind::CloseRequested => {
                self.handle_close_request(id);
                return;
            }
            RawEventKind::Maximized(maximized) => {
                state.flags.set(WindowFlags::MAXIMIZED, maximized);
                let kind = if maximized { EventKind::Maximize } else { EventKind::Restore };
                Event::new(kind, id, EventData::None)
            }
            RawEventKind::Iconified(iconified) => {
                state.flags.set(WindowFlags::MINIMIZED, iconified);
                let kind = if iconified { EventKind::Minimize } else { EventKind::Restore };
                Event::new(kind, id, EventData::None)
            }
            RawEventKind::ContentScaleChanged { x, y } => {
                let scale = ContentScale::new(x, y);
                state.content_scale = scale;
                Event::new(EventKind::ContentScale, id, EventData::ContentScale { scale })
            }
            RawEventKind::FileDropped(paths) => Event::new(EventKind::Drop, id, EventData::Drop { paths }),
            RawEventKind::Refresh => Event::new(EventKind::Refresh, id, EventData::None),
        };
        self.dispatch_event(event);
    }

    fn handle_button(&mut self, id: WindowId, button: MouseButton, pressed: bool, modifiers: Modifiers) {
        let Some(state) = self.windows.get(id) else {
            return;
        };
        let data = Self::pointer_data(state, Some(button), modifiers);
        let now = Instant::now();

        if pressed {
            let Some(event) = self.dispatch_event(Event::new(EventKind::PointerDown, id, data)) else {
                return;
            };
            let Some(state) = self.windows.get_mut(id).filter(|state| !state.is_closed()) else {
                return;
            };
            if event.is_default_prevented() {
                state.clicks.disarm();
                return;
            }
            state.clicks.press(button);
            if !state.is_focused() {
                if let Err(err) = self.context().focus(id) {
                    log::warn!("Focus on pointerdown failed for {id:?}: {err}");
                }
            }
        } else {
            let Some(event) = self.dispatch_event(Event::new(EventKind::PointerUp, id, data.clone())) else {
                return;
            };
            let Some(state) = self.windows.get_mut(id).filter(|state| !state.is_closed()) else {
                return;
            };
            if event.is_default_prevented() {
                state.clicks.disarm();
                return;
            }
            let position = event.position().unwrap_or_else(Point::origin);
            let outcome = state.clicks.release(button, position, now);
            if outcome == ClickOutcome::None {
                return;
            }
            self.dispatch_event(Event::new(EventKind::Click, id, data.clone()));
            if outcome == ClickOutcome::DoubleClick {
                self.dispatch_event(Event::new(EventKind::DoubleClick, id, data));
            }
        }
    }

    fn handle_close_request(&mut self, id: WindowId) {
        let Some(event) = self.dispatch_event(Event::new(EventKind::Close, id, EventData::None)) else {
            return;
        };
        if !event.is_default_prevented() {
            self.close(id);
            return;
        }

        log::info!("Close of window {id:?} cancelled by a listener");
        let Ok(native) = self.native_id(id) else {
            return;
        };
        if let Err(err) = self.platform.set_close_requested(native, false) {
            log::warn!("Could not reset close request of {id:?}: {err}");
        }
    }
}

impl<P: Platform> Drop for Runtime<P> {
    fn drop(&mut self) {
        for id in self.windows.ids() {
            if let Some(state) = self.windows.remove(id) {
                self.platform.destroy_window(state.native);
            }
        }
        log::debug!("Runtime dropped");
    }
}
