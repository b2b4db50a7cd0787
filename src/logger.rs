//! Configuration of the tracing subscriber for the command line tool.
use tracing::level_filters::LevelFilter;
use tracing::trace;
use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a level filter.
///
/// Higher verbosity results in additional log messages
/// up to a maximum verbosity level.
pub fn level_for(verbosity: u8) -> Result<LevelFilter, String> {
    match verbosity {
        0 => Ok(LevelFilter::ERROR),
        1 => Ok(LevelFilter::WARN),
        2 => Ok(LevelFilter::INFO),
        3 => Ok(LevelFilter::DEBUG),
        4 => Ok(LevelFilter::TRACE),
        _ => Err(String::from("Don't be crazy with verbose")),
    }
}

/// Installs a stderr subscriber with the specified verbosity.
///
/// `RUST_LOG`, when set, overrides the level derived from `verbosity`.
pub fn configure(verbosity: u8) -> Result<(), String> {
    let level = level_for(verbosity)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("Unable to install logger. {}", e))?;

    trace!("Logger verbosity {}", level);
    Ok(())
}
