//! # winloop
//!
//! Window lifecycle, event dispatch and frame scheduling on top of a native
//! windowing backend.
//!
//! ## Features
//!
//! - **Windows**: create, move, resize, constrain, maximize and close native
//!   windows, with parent/child ownership
//! - **Monitors**: enumerate displays and their work areas
//! - **Events**: DOM-style listeners (`pointerdown`, `click`, `resize`,
//!   `close`, ...) with cancelable default effects
//! - **Scheduler**: per-window draw and present, timers, frame pacing,
//!   auto-exit when the last window closes
//! - **Surfaces**: raw handles for GPU backends, OpenGL contexts, CPU pixel
//!   buffers
//! - **Headless**: an in-memory backend for tests and CI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use winloop::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut runtime = Runtime::new(RuntimeConfig::default())?;
//!     let window = runtime.create_window(&WindowConfig::new("Hello").with_size(640, 480))?;
//!
//!     runtime.add_event_listener(EventKind::Click, Scope::Window(window), |event, _ctx| {
//!         log::info!("clicked at {:?}", event.position());
//!         Ok(())
//!     });
//!
//!     runtime.run(true, |frame| {
//!         let _surface = frame.surface()?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::missing_errors_doc)]

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod foundation;
pub mod input;
pub mod monitor;
pub mod platform;
pub mod scheduler;
pub mod surface;
pub mod timers;
pub mod window;

mod runtime;

#[cfg(test)]
mod tests;

pub use error::{CallbackError, CallbackResult, ListenerError, RuntimeError, RuntimeResult};
pub use runtime::{Context, Runtime};

/// Common imports for runtime users
pub mod prelude {
    #[cfg(feature = "glfw")]
    pub use crate::platform::glfw::GlfwPlatform;
    pub use crate::{
        core::config::{Config, InputConfig, LoggingConfig, RuntimeConfig, SchedulerConfig},
        error::{CallbackResult, RuntimeError, RuntimeResult},
        events::{Event, EventData, EventKind, Scope},
        foundation::collections::{ListenerId, TimerId, WindowId},
        foundation::math::{ContentScale, Point, Position, Rect, Size, SizeLimits},
        input::{KeyCode, Modifiers, MouseButton},
        monitor::Monitor,
        platform::headless::HeadlessPlatform,
        platform::Platform,
        scheduler::{Frame, FrameInfo, SchedulerState},
        surface::{SurfaceHandle, SurfaceKind},
        window::{MonitorBinding, WindowConfig, WindowState},
        Context, Runtime,
    };
}
