use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Local};
use regex::Regex;

use crate::{Error, LogRecord, Result, log_writer::LogWriter};

/// Default size threshold for [`RotationPolicy::Size`]: 100 MiB.
pub const DEFAULT_SPLIT_SIZE: u64 = 104_857_600;

/// When a log file is closed, renamed with a timestamp suffix and reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationPolicy {
    /// Rotate on the first write of a new wall-clock hour.
    #[default]
    Hour,
    /// Rotate once the file grows past this many bytes.
    Size(u64),
}

/// Configuration of the main and warning files of a file sink.
#[derive(Debug, Clone)]
pub struct FileRotationConfig {
    pub folder: PathBuf,
    pub name: String,
    pub policy: RotationPolicy,
    /// Number of backups kept per file after a rotation. `None` keeps them all.
    pub max_backups: Option<usize>,
}

impl FileRotationConfig {
    pub fn main_path(&self) -> PathBuf {
        self.folder.join(format!("{}.log", self.name))
    }

    pub fn warn_path(&self) -> PathBuf {
        self.folder.join(format!("{}.wf", self.name))
    }
}

fn hour_bucket(now: &DateTime<Local>) -> String {
    now.format("%Y%m%d%H").to_string()
}

fn open_append(path: &Path) -> std::io::Result<(BufWriter<File>, u64)> {
    let file = File::options().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((BufWriter::new(file), size))
}

/// A single log file at a fixed path, rotated in place.
///
/// The handle is closed before the rename. When the canonical path cannot be
/// reopened, lines are discarded and every later write retries the open.
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    max_backups: Option<usize>,
    current_file: Option<BufWriter<File>>,
    size: u64,
    hour: String,
}

impl RotatingFile {
    pub fn open(
        path: PathBuf,
        policy: RotationPolicy,
        max_backups: Option<usize>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        let (current_file, size) = open_append(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            policy,
            max_backups,
            current_file: Some(current_file),
            size,
            hour: hour_bucket(&now),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes in the active file, including buffered ones.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the backup suffix when the file is due for rotation.
    fn rotation_suffix(&self, now: &DateTime<Local>) -> Option<String> {
        match self.policy {
            RotationPolicy::Hour => {
                let hour = hour_bucket(now);
                (hour != self.hour).then(|| self.hour.clone())
            }
            RotationPolicy::Size(max_size) => (self.size > max_size).then(|| hour_bucket(now)),
        }
    }

    fn backup_path(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = self.path.with_file_name(format!("{name}_{suffix}"));
        if !base.exists() {
            return base;
        }
        (1..)
            .map(|n| self.path.with_file_name(format!("{name}_{suffix}.{n}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }

    /// Closes the active file, renames it to its backup name and opens a fresh
    /// file at the canonical path. A failed rename still reopens the canonical path.
    fn rotate(&mut self, suffix: &str) {
        if let Some(mut file) = self.current_file.take() {
            let _ = file.flush();
        }
        let backup = self.backup_path(suffix);
        match fs::rename(&self.path, &backup) {
            Ok(()) => self.cleanup(),
            Err(err) => log::warn!(
                target: "splitlog",
                "unable to rename {} to {}: {err}",
                self.path.display(),
                backup.display()
            ),
        }
        self.reopen();
    }

    fn reopen(&mut self) {
        match open_append(&self.path) {
            Ok((file, size)) => {
                self.current_file = Some(file);
                self.size = size;
            }
            Err(err) => {
                log::warn!(target: "splitlog", "unable to open {}: {err}", self.path.display());
            }
        }
    }

    /// Deletes the oldest backups of this file beyond `max_backups`.
    fn cleanup(&self) {
        let Some(max_backups) = self.max_backups else {
            return;
        };
        let Some(folder) = self.path.parent() else {
            return;
        };
        let Some(name) = self.path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return;
        };
        let backup_pattern = format!(r"^{}_\d{{10}}(\.\d+)?$", regex::escape(&name));
        let Ok(pattern) = Regex::new(&backup_pattern) else {
            return;
        };
        let Ok(entries) = fs::read_dir(folder) else {
            return;
        };
        let mut backups: Vec<(SystemTime, PathBuf)> = entries
            .flatten()
            .filter(|entry| pattern.is_match(&entry.file_name().to_string_lossy()))
            .map(|entry| {
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (modified, entry.path())
            })
            .collect();
        // Oldest first. Renaming keeps the mtime, so this is rotation order.
        backups.sort();
        let excess = backups.len().saturating_sub(max_backups);
        for (_, path) in backups.into_iter().take(excess) {
            let _ = fs::remove_file(path);
        }
    }

    /// Rotates if due, then appends `line` followed by a newline.
    pub fn write_line(&mut self, line: &str, now: &DateTime<Local>) {
        if let Some(suffix) = self.rotation_suffix(now) {
            self.rotate(&suffix);
        }
        self.hour = hour_bucket(now);
        if self.current_file.is_none() {
            self.reopen();
        }
        if let Some(file) = self.current_file.as_mut()
            && writeln!(file, "{line}").is_ok()
        {
            self.size += line.len() as u64 + 1;
        }
    }

    pub fn flush(&mut self) {
        if let Some(file) = self.current_file.as_mut() {
            let _ = file.flush();
        }
    }
}

/// Main log file plus the warning file that duplicates `Warn` and above.
///
/// The two files rotate independently, each with its own bookkeeping.
pub struct LogFilePair {
    main: RotatingFile,
    warn: RotatingFile,
}

impl LogFilePair {
    pub fn open(config: &FileRotationConfig) -> Result<Self> {
        Self::open_at(config, Local::now())
    }

    pub fn open_at(config: &FileRotationConfig, now: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(&config.folder).map_err(|source| Error::Open {
            path: config.folder.clone(),
            source,
        })?;
        Ok(Self {
            main: RotatingFile::open(config.main_path(), config.policy, config.max_backups, now)?,
            warn: RotatingFile::open(config.warn_path(), config.policy, config.max_backups, now)?,
        })
    }

    pub fn write_at(&mut self, record: &LogRecord, now: &DateTime<Local>) {
        let line = record.line();
        self.main.write_line(&line, now);
        if record.warning {
            self.warn.write_line(&line, now);
        }
    }

    pub fn main(&self) -> &RotatingFile {
        &self.main
    }

    pub fn warn(&self) -> &RotatingFile {
        &self.warn
    }
}

impl LogWriter for LogFilePair {
    fn write(&mut self, record: &LogRecord) {
        self.write_at(record, &Local::now());
    }

    fn flush(&mut self) {
        self.main.flush();
        self.warn.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, Location};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
    }

    fn record(level: Level, message: &str, time: DateTime<Local>) -> LogRecord {
        LogRecord::at(
            time,
            level,
            Location {
                file: "src/main.rs",
                function: "app",
                line: 7,
            },
            message.into(),
        )
    }

    fn config(dir: &TempDir, policy: RotationPolicy, max_backups: Option<usize>) -> FileRotationConfig {
        FileRotationConfig {
            folder: dir.path().to_path_buf(),
            name: "app".into(),
            policy,
            max_backups,
        }
    }

    fn list_files(dir: &TempDir) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_open_creates_both_files() {
        let dir = TempDir::new().unwrap();
        let config = FileRotationConfig {
            folder: dir.path().join("nested"),
            ..config(&dir, RotationPolicy::Hour, None)
        };
        LogFilePair::open(&config).unwrap();
        assert!(config.main_path().exists());
        assert!(config.warn_path().exists());
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, None);
        fs::write(config.main_path(), "previous run\n").unwrap();
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        assert_eq!(files.main().size(), 13);
        files.write_at(&record(Level::Info, "next run", at(10, 1)), &at(10, 1));
        files.flush();
        let content = fs::read_to_string(config.main_path()).unwrap();
        assert!(content.starts_with("previous run\n"));
        assert!(content.ends_with("] next run\n"));
    }

    #[test]
    fn test_open_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();
        let config = FileRotationConfig {
            folder: blocker,
            ..config(&dir, RotationPolicy::Hour, None)
        };
        assert!(matches!(LogFilePair::open(&config), Err(Error::Open { .. })));
    }

    #[test]
    fn test_warnings_go_to_both_files() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        for level in Level::ALL {
            files.write_at(&record(level, &format!("{level} message"), at(10, 1)), &at(10, 1));
        }
        files.flush();

        let main = fs::read_to_string(config.main_path()).unwrap();
        let warn = fs::read_to_string(config.warn_path()).unwrap();
        assert_eq!(main.lines().count(), 6);
        assert_eq!(warn.lines().count(), 3);
        for level in Level::ALL {
            let message = format!("] {level} message");
            assert!(main.contains(&message));
            assert_eq!(warn.contains(&message), level >= Level::Warn);
        }
        assert!(warn.contains(" Fatal [main.rs:app:7] Fatal message\n"));
    }

    #[test]
    fn test_hour_rotation() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();

        files.write_at(&record(Level::Info, "line1", at(10, 15)), &at(10, 15));
        files.write_at(&record(Level::Info, "line2", at(10, 59)), &at(10, 59));
        files.flush();
        assert_eq!(list_files(&dir), ["app.log", "app.wf"]);

        files.write_at(&record(Level::Info, "line3", at(11, 2)), &at(11, 2));
        files.flush();
        assert_eq!(list_files(&dir), ["app.log", "app.log_2024011510", "app.wf"]);

        let backup = fs::read_to_string(dir.path().join("app.log_2024011510")).unwrap();
        assert!(backup.contains("line1") && backup.contains("line2"));
        assert!(!backup.contains("line3"));
        let current = fs::read_to_string(config.main_path()).unwrap();
        assert_eq!(current.lines().count(), 1);
        assert!(current.contains("line3"));
    }

    #[test]
    fn test_hour_rotation_is_independent_per_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();

        files.write_at(&record(Level::Warn, "warn at ten", at(10, 20)), &at(10, 20));
        files.write_at(&record(Level::Info, "info at eleven", at(11, 5)), &at(11, 5));
        files.flush();
        // only the main file has been written to since the hour changed
        assert_eq!(list_files(&dir), ["app.log", "app.log_2024011510", "app.wf"]);

        files.write_at(&record(Level::Error, "error at eleven", at(11, 10)), &at(11, 10));
        files.flush();
        assert_eq!(
            list_files(&dir),
            ["app.log", "app.log_2024011510", "app.wf", "app.wf_2024011510"]
        );

        let warn_backup = fs::read_to_string(dir.path().join("app.wf_2024011510")).unwrap();
        assert!(warn_backup.contains("warn at ten"));
        let warn = fs::read_to_string(config.warn_path()).unwrap();
        assert!(warn.contains("error at eleven"));
        assert!(!warn.contains("warn at ten"));
        let main = fs::read_to_string(config.main_path()).unwrap();
        assert!(main.contains("info at eleven") && main.contains("error at eleven"));
        assert!(!main.contains("warn at ten"));
    }

    #[test]
    fn test_hour_rotation_same_hour_next_day() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        files.write_at(&record(Level::Info, "today", at(10, 0)), &at(10, 0));
        let tomorrow = Local.with_ymd_and_hms(2024, 1, 16, 10, 0, 0).unwrap();
        files.write_at(&record(Level::Info, "tomorrow", tomorrow), &tomorrow);
        files.flush();
        assert!(dir.path().join("app.log_2024011510").exists());
    }

    #[test]
    fn test_size_rotation() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Size(100), None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        // each line is about 60 bytes, so the third write finds the file past 100 bytes
        for i in 0..3 {
            files.write_at(&record(Level::Info, &format!("line{i}"), at(10, 0)), &at(10, 0));
        }
        files.flush();
        assert_eq!(list_files(&dir), ["app.log", "app.log_2024011510", "app.wf"]);

        let backup = fs::read_to_string(dir.path().join("app.log_2024011510")).unwrap();
        assert_eq!(backup.lines().count(), 2);
        let current = fs::read_to_string(config.main_path()).unwrap();
        assert_eq!(current.lines().count(), 1);
        assert!(current.contains("line2"));
    }

    #[test]
    fn test_size_rotation_never_overwrites_backups() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Size(10), None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        for i in 0..4 {
            files.write_at(&record(Level::Info, &format!("line{i}"), at(10, 0)), &at(10, 0));
        }
        files.flush();
        assert_eq!(
            list_files(&dir),
            [
                "app.log",
                "app.log_2024011510",
                "app.log_2024011510.1",
                "app.log_2024011510.2",
                "app.wf",
            ]
        );
        let mut all = String::new();
        for name in list_files(&dir).iter().filter(|n| n.starts_with("app.log")) {
            all.push_str(&fs::read_to_string(dir.path().join(name)).unwrap());
        }
        for i in 0..4 {
            assert!(all.contains(&format!("line{i}")));
        }
    }

    #[test]
    fn test_max_backups_cleanup() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, Some(2));
        let mut files = LogFilePair::open_at(&config, at(1, 0)).unwrap();
        for hour in 1..7 {
            files.write_at(&record(Level::Error, &format!("hour {hour}"), at(hour, 0)), &at(hour, 0));
            // distinct mtimes for the backups
            files.flush();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        let names = list_files(&dir);
        let main_backups: Vec<_> = names.iter().filter(|n| n.starts_with("app.log_")).collect();
        let warn_backups: Vec<_> = names.iter().filter(|n| n.starts_with("app.wf_")).collect();
        assert_eq!(main_backups, ["app.log_2024011504", "app.log_2024011505"]);
        assert_eq!(warn_backups, ["app.wf_2024011504", "app.wf_2024011505"]);
    }

    #[test]
    fn test_deleted_file_is_recreated_on_rotation() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, RotationPolicy::Hour, None);
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        files.write_at(&record(Level::Info, "line1", at(10, 0)), &at(10, 0));
        files.flush();
        fs::remove_file(config.main_path()).unwrap();

        for hour in 11..14 {
            files.write_at(&record(Level::Info, &format!("hour {hour}"), at(hour, 0)), &at(hour, 0));
        }
        files.flush();
        assert!(config.main_path().exists());
        let content = fs::read_to_string(config.main_path()).unwrap();
        assert!(content.contains("hour 13"));
        assert!(dir.path().join("app.log_2024011512").exists());
    }

    #[test]
    fn test_failed_reopen_is_retried() {
        let root = TempDir::new().unwrap();
        let config = FileRotationConfig {
            folder: root.path().join("logs"),
            ..config(&root, RotationPolicy::Hour, None)
        };
        let mut files = LogFilePair::open_at(&config, at(10, 0)).unwrap();
        files.write_at(&record(Level::Warn, "before", at(10, 0)), &at(10, 0));
        files.flush();
        fs::remove_dir_all(&config.folder).unwrap();

        // neither rename nor reopen can succeed without the folder
        files.write_at(&record(Level::Warn, "lost", at(11, 0)), &at(11, 0));
        files.flush();
        assert!(!config.folder.exists());

        fs::create_dir_all(&config.folder).unwrap();
        files.write_at(&record(Level::Warn, "after", at(11, 30)), &at(11, 30));
        files.flush();
        let main = fs::read_to_string(config.main_path()).unwrap();
        let warn = fs::read_to_string(config.warn_path()).unwrap();
        assert_eq!(main.lines().count(), 1);
        assert!(main.contains("after"));
        assert!(warn.contains("after") && !warn.contains("lost"));
    }

    #[test]
    fn test_cleanup_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.log_notes"), "keep").unwrap();
        fs::write(dir.path().join("other.log_2024011500"), "keep").unwrap();
        let config = config(&dir, RotationPolicy::Hour, Some(1));
        let mut files = LogFilePair::open_at(&config, at(1, 0)).unwrap();
        for hour in 1..4 {
            files.write_at(&record(Level::Info, "tick", at(hour, 0)), &at(hour, 0));
            files.flush();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        let names = list_files(&dir);
        assert!(names.contains(&"app.log_notes".to_string()));
        assert!(names.contains(&"other.log_2024011500".to_string()));
        assert_eq!(names.iter().filter(|n| n.starts_with("app.log_2")).count(), 1);
    }
}
