//! Logging setup
//!
//! Logs go to two outputs: a coloured console and the session's plain text log file. The
//! file takes everything down to its own level, while the console stays at `INFO` except for
//! the targets given louder levels. Cyclic modules log their per-cycle detail at either
//! `DEBUG` or `TRACE` depending on their debug mode, so with the console at `DEBUG` for the
//! library the debug mode decides whether per-cycle detail reaches the console or only the
//! file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Levels of the two log outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLevels {
    /// Default level of the console, at least `INFO`.
    pub console: LevelFilter,

    /// Level of the session log file.
    pub file: LevelFilter,

    /// Console levels for specific targets (crate or module paths).
    pub console_targets: Vec<(String, LevelFilter)>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The console must show at least `INFO` logs, found `{0}`")]
    ConsoleLevelTooLow(LevelFilter),

    #[error("Error opening the session log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LogLevels {
    pub fn new(console: LevelFilter, file: LevelFilter) -> Self {
        Self {
            console,
            file,
            console_targets: Vec::new(),
        }
    }

    /// Show `target` on the console down to `level`.
    pub fn with_console_target(mut self, target: &str, level: LevelFilter) -> Self {
        self.console_targets.push((target.to_string(), level));
        self
    }

    fn validate(&self) -> Result<(), LoggerInitError> {
        if self.console < Level::Info {
            return Err(LoggerInitError::ConsoleLevelTooLow(self.console));
        }

        Ok(())
    }
}

impl Default for LogLevels {
    fn default() -> Self {
        Self::new(LevelFilter::Info, LevelFilter::Trace)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Safety
///
/// - Only the first call can succeed, later ones give `FernInitError`.
pub fn logger_init(levels: &LogLevels, session: &Session) -> Result<(), LoggerInitError> {
    levels.validate()?;

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let mut console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                Line::new(level_colour(record.level()), record, message)
            ))
        })
        .level(levels.console);

    for (target, level) in levels.console_targets.iter() {
        console = console.level_for(target.clone(), *level);
    }

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}",
                Line::new(level_tag(record.level()), record, message)
            ))
        })
        .level(levels.file)
        .chain(log_file);

    fern::Dispatch::new()
        .chain(console.chain(std::io::stdout()))
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Console level: {:?}", levels.console);
    for (target, level) in levels.console_targets.iter() {
        info!("        {}: {:?}", target, level);
    }
    info!("    File level: {:?}", levels.file);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE ITEMS
// ---------------------------------------------------------------------------

/// One formatted log line.
///
/// Debug and trace lines carry their target, which is the module the cyclic detail comes
/// from.
struct Line<'a, T> {
    tag: T,
    target: Option<&'a str>,
    message: &'a fmt::Arguments<'a>,
}

impl<'a, T: fmt::Display> Line<'a, T> {
    fn new(tag: T, record: &'a Record, message: &'a fmt::Arguments<'a>) -> Self {
        Self {
            tag,
            target: match record.level() > Level::Info {
                true => Some(record.target()),
                false => None,
            },
            message,
        }
    }
}

impl<'a, T: fmt::Display> fmt::Display for Line<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:10.6} {}] ", session::get_elapsed_seconds(), self.tag)?;

        match self.target {
            Some(t) => write!(f, "{}: {}", t, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Three letter tag of a level, as written to the log file.
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    }
}

/// Tag of a level as shown on the console.
fn level_colour(level: Level) -> ColoredString {
    let tag = level_tag(level);

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info => tag.normal(),
        Level::Warn => tag.yellow(),
        Level::Error => tag.red().bold(),
    }
}
