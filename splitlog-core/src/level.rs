use std::{
    fmt,
    sync::atomic::{AtomicU8, Ordering},
};

/// Severity of a record, ordered from least to most severe.
///
/// Note that `Trace` ranks above `Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Level {
    #[default]
    Debug = 0,
    Trace = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Trace,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Trace => "Trace",
            Level::Info => "Info",
            Level::Warn => "Warn",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }

    /// Parses a case-sensitive label. Anything unrecognized falls back to `Debug`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Trace" => Level::Trace,
            "Info" => Level::Info,
            "Warn" => Level::Warn,
            "Error" => Level::Error,
            "Fatal" => Level::Fatal,
            _ => Level::Debug,
        }
    }

    /// Maps a numeric level onto the order above, clamping out-of-range values to `Debug`.
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Level::Debug)
    }

    /// Records at this level are duplicated into the warning file.
    pub fn is_warning(self) -> bool {
        self >= Level::Warn
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}

/// Threshold shared between threads, changeable at runtime.
#[derive(Debug, Default)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    pub fn get(&self) -> Level {
        Level::from_index(i64::from(self.0.load(Ordering::Relaxed)))
    }

    pub fn set(&self, level: Level) {
        self.0.store(level as u8, Ordering::Relaxed);
    }
}
