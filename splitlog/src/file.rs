use std::path::PathBuf;

use splitlog_core::{
    AtomicLevel, FileRotationConfig, Level, LogFilePair, LogRecord, LogSender, Result,
    spawn_log_thread,
};

use crate::{ConfigMap, FileSettings, Logger};

/// Queues records for a background thread writing `<name>.log` and `<name>.wf`.
///
/// Both files are opened before the thread starts. Dropping the logger closes it.
pub struct FileLogger {
    level: AtomicLevel,
    rotation: FileRotationConfig,
    sender: LogSender,
}

impl FileLogger {
    pub fn new(settings: FileSettings) -> Result<Self> {
        let FileSettings {
            level,
            queue_capacity,
            rotation,
        } = settings;
        let files = LogFilePair::open(&rotation)?;
        let sender = spawn_log_thread(files, queue_capacity)?;
        Ok(Self {
            level: AtomicLevel::new(level),
            rotation,
            sender,
        })
    }

    pub fn from_config(config: &ConfigMap) -> Result<Self> {
        Self::new(FileSettings::from_map(config)?)
    }

    pub fn main_path(&self) -> PathBuf {
        self.rotation.main_path()
    }

    pub fn warn_path(&self) -> PathBuf {
        self.rotation.warn_path()
    }

    /// Records lost because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.sender.dropped()
    }
}

impl Logger for FileLogger {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, record: LogRecord) {
        self.sender.push(record);
    }

    /// Waits for the writer thread to write and flush everything queued so far.
    fn flush(&self) {
        self.sender.flush();
    }

    fn close(&self) {
        self.sender.shutdown();
    }
}
