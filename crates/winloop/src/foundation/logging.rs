//! Logger setup
//!
//! The crate logs through the `log` facade; `env_logger` is installed by
//! `Runtime::new` unless a logger already exists.

/// Initialize logging with a default filter
///
/// `level` is an env_logger filter string such as `"info"` or
/// `"winloop=debug,warn"`. `RUST_LOG` still takes precedence when set.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_first_logger() {
        init_with_level("debug");
        init_with_level("warn");
        assert!(log::max_level() >= log::LevelFilter::Warn);
    }
}
