//! # Frame Scheduler
//!
//! Drives the main loop once the application calls [`Runtime::run`]. Each
//! tick runs these phases in order:
//!
//! 1. Tick boundary: remove windows closed during the previous tick
//! 2. Exit check: stop requested, or no windows left with auto-exit on
//! 3. Optional blocking wait for platform events
//! 4. Drain and dispatch platform events
//! 5. Draw and present every open window, in creation order
//! 6. Run due timers
//! 7. Frame pacing
//!
//! A window closed from its own draw callback is still presented for that
//! frame; it is never drawn again.
//!
//! ## States
//!
//! `Idle` until `run` is called, `Running` while ticking, `Stopped` after the
//! loop exited. Stopping tears down all listeners and timers.

use std::time::{Duration, Instant};

use crate::error::{run_guarded, CallbackOrigin, CallbackResult, RuntimeResult};
use crate::foundation::collections::WindowId;
use crate::foundation::math::{ContentScale, Size};
use crate::foundation::time::{FramePacer, Timer};
use crate::platform::{Platform, PlatformError};
use crate::runtime::{Context, Runtime};
use crate::surface::SurfaceHandle;

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// `run` has not been called
    Idle,
    /// Ticking
    Running,
    /// The loop exited
    Stopped,
}

/// Loop state shared with callbacks through [`Context`]
#[derive(Debug)]
pub struct LoopControl {
    state: SchedulerState,
    stop_requested: bool,
}

impl LoopControl {
    pub(crate) fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            stop_requested: false,
        }
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether a stop is pending
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }

    pub(crate) fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    fn start(&mut self) {
        self.state = SchedulerState::Running;
    }

    fn finish(&mut self) {
        self.state = SchedulerState::Stopped;
        self.stop_requested = false;
    }
}

/// Per-window frame timing handed to the draw callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Window being drawn
    pub window: WindowId,
    /// Tick number, starting at 1
    pub frame: u64,
    /// Time since the previous tick
    pub delta: Duration,
    /// Time since `run` was called
    pub elapsed: Duration,
    /// Client-area size
    pub size: Size,
    /// Framebuffer size
    pub framebuffer_size: Size,
    /// Content scale
    pub content_scale: ContentScale,
}

/// Draw callback argument: frame timing plus runtime access
pub struct Frame<'a, P: Platform> {
    info: FrameInfo,
    ctx: Context<'a, P>,
}

impl<'a, P: Platform> Frame<'a, P> {
    /// Timing and geometry of this frame
    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    /// Window being drawn
    pub fn window(&self) -> WindowId {
        self.info.window
    }

    /// Runtime access
    pub fn context(&mut self) -> &mut Context<'a, P> {
        &mut self.ctx
    }

    /// Surface of the window being drawn
    pub fn surface(&mut self) -> RuntimeResult<SurfaceHandle> {
        self.ctx.surface_for(self.info.window)
    }

    /// Pixel buffer of the window being drawn
    pub fn pixels_mut(&mut self) -> RuntimeResult<&mut [u32]> {
        self.ctx.pixels_mut(self.info.window)
    }

    /// Close the window being drawn; this frame is still presented
    pub fn close_window(&mut self) {
        self.ctx.close(self.info.window);
    }
}

impl<P: Platform> Runtime<P> {
    /// Run the main loop until it is stopped
    ///
    /// With `auto_exit_when_no_windows` the loop also ends at the first tick
    /// boundary where no window is left.
    pub fn run<F>(&mut self, auto_exit_when_no_windows: bool, mut on_frame: F) -> RuntimeResult<()>
    where
        F: FnMut(&mut Frame<'_, P>) -> CallbackResult,
    {
        self.control.start();
        log::info!("Starting main loop...");

        let pacer = self.config.scheduler.target_fps.and_then(FramePacer::new);
        let mut clock = Timer::new();
        loop {
            let tick_start = Instant::now();
            if !self.tick(&mut on_frame, auto_exit_when_no_windows, &mut clock) {
                break;
            }
            if let Some(pacer) = pacer {
                let remaining = pacer.remaining(tick_start, Instant::now());
                if !remaining.is_zero() {
                    std::thread::sleep(remaining);
                }
            }
        }

        log::info!(
            "Main loop finished after {} frames ({:.1} fps average)",
            clock.frame_count(),
            clock.average_fps()
        );
        self.teardown();
        Ok(())
    }

    /// Run the main loop with the configured exit policy
    pub fn run_configured<F>(&mut self, on_frame: F) -> RuntimeResult<()>
    where
        F: FnMut(&mut Frame<'_, P>) -> CallbackResult,
    {
        let auto_exit = self.config.scheduler.auto_exit_when_no_windows;
        self.run(auto_exit, on_frame)
    }

    fn tick<F>(&mut self, on_frame: &mut F, auto_exit: bool, clock: &mut Timer) -> bool
    where
        F: FnMut(&mut Frame<'_, P>) -> CallbackResult,
    {
        self.finalize_closed();

        if self.control.is_stop_requested() {
            log::info!("Stop requested, leaving main loop");
            return false;
        }
        if auto_exit && self.windows.active_count() == 0 {
            log::info!("All windows closed, leaving main loop");
            return false;
        }

        if self.config.scheduler.wait_for_events {
            let timeout = self.wait_timeout(Instant::now());
            self.platform.wait_events(timeout);
        }
        self.pump_events();

        clock.update();
        self.draw_windows(on_frame, clock);
        self.run_due_timers(Instant::now());
        true
    }

    /// Configured wait bound, shortened so the next timer is not missed
    fn wait_timeout(&self, now: Instant) -> Option<Duration> {
        let configured = self.config.scheduler.wait_timeout_ms.map(Duration::from_millis);
        let until_timer = self
            .timers
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now));
        match (configured, until_timer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn draw_windows<F>(&mut self, on_frame: &mut F, clock: &Timer)
    where
        F: FnMut(&mut Frame<'_, P>) -> CallbackResult,
    {
        for id in self.windows.ids() {
            let Some(state) = self.windows.get(id).filter(|state| !state.is_closed()) else {
                continue;
            };
            let native = state.native();
            let info = FrameInfo {
                window: id,
                frame: clock.frame_count(),
                delta: clock.delta_time(),
                elapsed: clock.total_time(),
                size: state.size(),
                framebuffer_size: state.framebuffer_size(),
                content_scale: state.content_scale(),
            };

            if let Err(err) = self.platform.begin_frame(native) {
                log::warn!("Skipping frame for {id:?}: {err}");
                if matches!(err, PlatformError::UnknownWindow(_)) {
                    self.close(id);
                }
                continue;
            }

            let result = {
                let ctx = self.context();
                let mut frame = Frame { info, ctx };
                run_guarded(CallbackOrigin::Frame { window: id }, || on_frame(&mut frame))
            };
            if let Err(failure) = result {
                failure.report();
                self.callback_failures += 1;
            }

            match self.platform.present(native) {
                Ok(()) => {}
                Err(PlatformError::UnknownWindow(_)) => self.close(id),
                Err(err) => log::warn!("Present failed for {id:?}: {err}"),
            }
        }
    }

    pub(crate) fn run_due_timers(&mut self, now: Instant) {
        for id in self.timers.due(now) {
            let Some(mut callback) = self.timers.take(id) else {
                continue;
            };
            let result = {
                let mut ctx = self.context();
                run_guarded(CallbackOrigin::Timer { id }, || callback(&mut ctx))
            };
            if let Err(failure) = result {
                failure.report();
                self.callback_failures += 1;
            }
            self.timers.finish(id, callback, now);
        }
    }

    fn teardown(&mut self) {
        let listeners = self.dispatcher.len();
        let timers = self.timers.len();
        self.dispatcher.clear();
        self.timers.clear_all();
        self.control.finish();
        log::info!("Scheduler stopped; released {listeners} listener(s) and {timers} timer(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_control_transitions() {
        let mut control = LoopControl::new();
        assert_eq!(control.state(), SchedulerState::Idle);
        control.start();
        control.request_stop();
        assert!(control.is_stop_requested());
        control.finish();
        assert_eq!(control.state(), SchedulerState::Stopped);
        assert!(!control.is_stop_requested());
    }
}
