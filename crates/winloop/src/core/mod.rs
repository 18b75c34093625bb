//! # Core Runtime Module
//!
//! Shared configuration for every runtime subsystem.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for scheduling, input and logging
//! - **Foundation**: Low-level utilities (geometry, keys, time, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    RuntimeConfig,
    SchedulerConfig,
    InputConfig,
    LoggingConfig,
    Config,
    ConfigError,
};
