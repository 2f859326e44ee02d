//! Logger setup for the executables

use std::path::Path;

use chrono::Local;
use colored::{ColoredString, Colorize};
use log::info;

use crate::common::PlannerResult;

pub use log::LevelFilter;

/// Initialise the global logger, writing to stdout and optionally to a file.
///
/// Must be called at most once per process; a second call returns
/// [`crate::common::PlannerError::Logger`].
pub fn logger_init(min_level: LevelFilter, log_file: Option<&Path>) -> PlannerResult<()> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            // Include the target below INFO
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{} {}] {}: {}",
                    Local::now().format("%H:%M:%S%.3f"),
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!(
                    "[{} {}] {}",
                    Local::now().format("%H:%M:%S%.3f"),
                    level_to_str(record.level()),
                    message
                ))
            }
        })
        .level(min_level)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }
    dispatch.apply()?;

    info!("Logging initialised");
    info!("    Log level: {:?}", min_level);
    if let Some(path) = log_file {
        info!("    Log file path: {:?}", path);
    }

    Ok(())
}

fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}
