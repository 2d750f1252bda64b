//! # splitlog
//! Leveled logger with a synchronous console sink and an asynchronous file sink.
//!
//! The file sink pushes records into a bounded queue drained by a single
//! background thread. Records are dropped, never blocking the caller, when the
//! queue is full. The thread appends every record to `<log_path>/<log_name>.log`,
//! duplicates `Warn`, `Error` and `Fatal` records into `<log_path>/<log_name>.wf`,
//! and rotates both files by hour or by size.
//!
//! ## Usage
//! ```rust
//! use std::collections::HashMap;
//! use splitlog::{Logger, new_logger};
//!
//! let dir = std::env::temp_dir().join("splitlog_doc_usage");
//! let config: HashMap<String, String> = [
//!     ("log_path", dir.to_str().unwrap()),
//!     ("log_name", "app"),
//!     ("log_level", "Info"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let logger = new_logger("file", &config).expect("Unable to open log files");
//! splitlog::debug!(logger, "filtered out");
//! splitlog::info!(logger, "User ID[{}] is come from china.", 1234567);
//! splitlog::fatal!(logger, "also written to app.wf");
//! logger.close();
//!
//! let warnings = std::fs::read_to_string(dir.join("app.wf")).unwrap();
//! assert!(warnings.ends_with("also written to app.wf\n"));
//! ```
//!
//! ## The `log` facade
//! ```rust
//! use std::collections::HashMap;
//!
//! let _guard = splitlog::init_global("console", &HashMap::new()).unwrap();
//! log::info!("Hello, world!");
//! // the guard closes the sink when dropped
//! ```

mod bridge;
pub mod config;
mod console;
mod file;
mod registry;

use std::fmt;

pub use bridge::LogBridge;
pub use config::{ConfigMap, ConsoleSettings, FileSettings};
pub use console::ConsoleLogger;
pub use file::FileLogger;
pub use registry::{LoggerGuard, Registry, init_global, new_logger};
pub use splitlog_core::{
    Error, Level, Location, LogRecord, Result, RotationPolicy, location,
};

/// Leveled logging interface shared by every sink.
pub trait Logger: Send + Sync {
    /// Current threshold.
    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    /// Sets the threshold from its numeric form. Out-of-range values clamp to `Debug`.
    fn set_level_index(&self, index: i64) {
        self.set_level(Level::from_index(index));
    }

    fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Hands a record to the sink without checking the threshold.
    fn emit(&self, record: LogRecord);

    /// Builds and emits a record if `level` passes the threshold.
    fn log(&self, level: Level, location: Location<'_>, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.emit(LogRecord::new(level, location, args.to_string()));
        }
    }

    fn debug(&self, location: Location<'_>, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, location, args);
    }

    fn trace(&self, location: Location<'_>, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, location, args);
    }

    fn info(&self, location: Location<'_>, args: fmt::Arguments<'_>) {
        self.log(Level::Info, location, args);
    }

    fn warn(&self, location: Location<'_>, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, location, args);
    }

    fn error(&self, location: Location<'_>, args: fmt::Arguments<'_>) {
        self.log(Level::Error, location, args);
    }

    fn fatal(&self, location: Location<'_>, args: fmt::Arguments<'_>) {
        self.log(Level::Fatal, location, args);
    }

    fn flush(&self) {}

    /// Releases the sink. Records emitted afterwards are discarded.
    fn close(&self);
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($method:ident, $logger:expr, $($arg:tt)+) => {{
        use $crate::Logger as _;
        $logger.$method($crate::location!(), format_args!($($arg)+))
    }};
}

/// Logs at `Debug` level: `debug!(logger, "format {}", args)`.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(debug, $logger, $($arg)+) };
}

/// Logs at `Trace` level.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(trace, $logger, $($arg)+) };
}

/// Logs at `Info` level.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(info, $logger, $($arg)+) };
}

/// Logs at `Warn` level, also writing to the warning file.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(warn, $logger, $($arg)+) };
}

/// Logs at `Error` level, also writing to the warning file.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(error, $logger, $($arg)+) };
}

/// Logs at `Fatal` level, also writing to the warning file. Does not exit the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => { $crate::__log!(fatal, $logger, $($arg)+) };
}
