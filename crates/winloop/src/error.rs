//! Runtime error taxonomy
//!
//! Creation-time failures ([`RuntimeError::NoDisplay`],
//! [`RuntimeError::WindowCreation`]) are returned to the caller. Operations on
//! a closed window return [`RuntimeError::WindowClosed`]. Callback failures are
//! captured as [`ListenerError`] at the dispatch boundary and logged; they never
//! escape `poll_events` or a scheduler tick.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use crate::config::ConfigError;
use crate::events::EventKind;
use crate::foundation::collections::{ListenerId, TimerId, WindowId};
use crate::platform::PlatformError;

/// Error type application callbacks may return
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of listeners, draw callbacks and timers
pub type CallbackResult = Result<(), CallbackError>;

/// Result alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Runtime errors
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Monitor query in an environment without displays
    #[error("No display attached")]
    NoDisplay,

    /// Native window or surface allocation failed
    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    /// Operation on a window whose `closed` flag is set
    #[error("Window {0:?} is closed")]
    WindowClosed(WindowId),

    /// An application callback failed during dispatch
    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// Platform backend failure outside window creation
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Invalid runtime configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected argument, such as inverted size limits
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Event name that does not map to an event kind
    #[error("Unknown event name: {0}")]
    UnknownEvent(String),

    /// Surface access that does not match how the window was created
    #[error("Unsupported surface operation: {0}")]
    UnsupportedSurface(String),
}

/// Which application callback failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOrigin {
    /// Event listener
    Listener {
        /// Subscription handle
        id: ListenerId,
        /// Event being dispatched
        event: EventKind,
    },
    /// Per-window draw callback
    Frame {
        /// Window being drawn
        window: WindowId,
    },
    /// Timeout or interval callback
    Timer {
        /// Timer handle
        id: TimerId,
    },
}

impl fmt::Display for CallbackOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listener { id, event } => write!(f, "listener {id:?} for '{event}'"),
            Self::Frame { window } => write!(f, "draw callback for window {window:?}"),
            Self::Timer { id } => write!(f, "timer {id:?}"),
        }
    }
}

/// A callback returned an error or panicked
#[derive(Error, Debug)]
#[error("{origin} {}: {message}", if *panicked { "panicked" } else { "failed" })]
pub struct ListenerError {
    /// Callback that failed
    pub origin: CallbackOrigin,
    /// Error or panic message
    pub message: String,
    /// True if the callback unwound instead of returning `Err`
    pub panicked: bool,
}

impl ListenerError {
    /// Log this failure; callers keep going afterwards
    pub(crate) fn report(&self) {
        log::error!("{self}");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run an application callback, converting both `Err` and panics into
/// [`ListenerError`]
pub(crate) fn run_guarded<F>(origin: CallbackOrigin, callback: F) -> Result<(), ListenerError>
where
    F: FnOnce() -> CallbackResult,
{
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(ListenerError {
            origin,
            message: err.to_string(),
            panicked: false,
        }),
        Err(payload) => Err(ListenerError {
            origin,
            message: panic_message(payload.as_ref()),
            panicked: true,
        }),
    }
}
