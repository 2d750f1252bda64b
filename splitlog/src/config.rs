//! Sink settings read from a flat string-keyed map.
//!
//! | key               | default     |
//! |-------------------|-------------|
//! | `log_path`        | required    |
//! | `log_name`        | required    |
//! | `log_level`       | required for files, `Debug` for the console |
//! | `log_chan_size`   | `50000`     |
//! | `log_split_type`  | `Hour`      |
//! | `log_split_size`  | `104857600` |
//! | `log_max_backups` | unlimited   |
//!
//! Malformed optional values fall back to their default.

use std::{collections::HashMap, path::PathBuf, str::FromStr};

use splitlog_core::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_SPLIT_SIZE, Error, FileRotationConfig, Level, Result,
    RotationPolicy,
};

pub type ConfigMap = HashMap<String, String>;

fn required<'a>(config: &'a ConfigMap, key: &'static str) -> Result<&'a str> {
    config
        .get(key)
        .map(String::as_str)
        .ok_or(Error::MissingKey(key))
}

fn parsed_or<T: FromStr>(config: &ConfigMap, key: &str, default: T) -> T {
    config
        .get(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    pub level: Level,
}

impl ConsoleSettings {
    pub fn from_map(config: &ConfigMap) -> Self {
        Self {
            level: config
                .get("log_level")
                .map(|label| Level::from_label(label))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSettings {
    pub level: Level,
    pub queue_capacity: usize,
    pub rotation: FileRotationConfig,
}

impl FileSettings {
    pub fn from_map(config: &ConfigMap) -> Result<Self> {
        let folder = required(config, "log_path")?;
        let name = required(config, "log_name")?;
        let level = Level::from_label(required(config, "log_level")?);

        let policy = match config.get("log_split_type").map(String::as_str) {
            Some("Size") => {
                RotationPolicy::Size(parsed_or(config, "log_split_size", DEFAULT_SPLIT_SIZE))
            }
            _ => RotationPolicy::Hour,
        };
        let max_backups = parsed_or(config, "log_max_backups", 0usize);

        Ok(Self {
            level,
            queue_capacity: parsed_or(config, "log_chan_size", DEFAULT_QUEUE_CAPACITY).max(1),
            rotation: FileRotationConfig {
                folder: PathBuf::from(folder),
                name: name.to_string(),
                policy,
                max_backups: (max_backups > 0).then_some(max_backups),
            },
        })
    }
}
