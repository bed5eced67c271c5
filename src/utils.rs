use std::error::Error;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};

/// File name of the driver log inside the output directory.
pub const LOG_FILE: &str = "experiment.log";

/// # Explanation
/// Picks the log level: the RUST_LOG environment variable wins over the level of the experiment. Both
/// should be one of off, error, warn, info, debug or trace, anything else means info.
pub fn log_level(configured: &str) -> LevelFilter {
    let log_level = std::env::var("RUST_LOG").unwrap_or(configured.to_string());
    LevelFilter::from_str(&log_level).unwrap_or(LevelFilter::Info)
}

/// # Explanation
/// This function initializes the logger. Everything is logged to the terminal and to the given log
/// file (which is truncated first).
pub fn logger_init(level: LevelFilter, log_file: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = std::fs::File::create(log_file)?;

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(level, Config::default(), log_file),
    ])?;
    Ok(())
}

/// # Explanation
/// The LogErrUnwrap trait contains the function log_err_unwrap. This function should be used to unwrap
/// a result and when this result is an error then the error is logged and the given default value is returned.
pub trait LogErrUnwrap<T> {
    fn log_err_unwrap(self, default: T) -> T;
}

impl<T, E: Display> LogErrUnwrap<T> for Result<T, E> {
    fn log_err_unwrap(self, default: T) -> T {
        self.unwrap_or_else(|e| {
            log::error!("{}", e);
            default
        })
    }
}
