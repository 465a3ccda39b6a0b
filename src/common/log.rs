//! Logging helpers
//!
//! Reporting is a side channel: suppressed and failed reports only ever
//! surface as log lines, so hosts should initialize a logger early.

/// Initialize the global logger
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Parameters
///
/// * `level` - Default log filter (error, warn, info, debug, trace)
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A host application may already have installed a logger.
    let _ = env_logger::Builder::from_env(env).try_init();
}
