//! Start-up helpers for puppet-rs.
//!
//! These wire up logging and load a figure so a host application can start
//! feeding events into a [`PoseEngine`].

use std::path::Path;

use crate::{Options, PoseEngine, Result};

/// Installs the `env_logger` backend for the `log` facade.
///
/// Filtering follows `RUST_LOG`. Calling this more than once is harmless;
/// returns whether this call installed the logger.
pub fn init_logging() -> bool {
    env_logger::try_init().is_ok()
}

/// Initializes logging and loads the figure at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or describes an
/// invalid figure.
///
/// # Example
///
/// ```no_run
/// use puppet::*;
///
/// fn main() -> Result<()> {
///     let engine = init("puppet.json", Options::default())?;
///     assert_eq!(engine.mode(), InteractionMode::Position);
///     Ok(())
/// }
/// ```
pub fn init(path: impl AsRef<Path>, options: Options) -> Result<PoseEngine> {
    init_logging();
    let path = path.as_ref();
    let engine = PoseEngine::load(path, options)?;
    log::info!("puppet-rs initialized from {}", path.display());
    Ok(engine)
}
