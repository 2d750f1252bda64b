//! # splitlog-core
//! Core utilities for splitlog: levels, records, writers, file rotation and
//! the bounded queue feeding the background writer thread.

mod config;
mod error;
mod level;
mod log_rotation;
mod log_writer;
mod record;
mod utils;

pub use config::SPLITLOG_CONFIG;
pub use error::{Error, Result};
pub use level::{AtomicLevel, Level};
pub use log_rotation::{
    DEFAULT_SPLIT_SIZE, FileRotationConfig, LogFilePair, RotatingFile, RotationPolicy,
};
pub use log_writer::{ConsoleWriter, LogWriter};
pub use record::{Location, LogRecord};
pub use utils::{DEFAULT_QUEUE_CAPACITY, LogMessage, LogSender, RecordQueue, spawn_log_thread};
