use std::collections::HashMap;

use splitlog::new_logger;

fn main() {
    let dir = std::env::temp_dir().join("splitlog_example_rotation");
    let _ = std::fs::remove_dir_all(&dir);

    let config: HashMap<String, String> = [
        ("log_path", dir.to_str().unwrap()),
        ("log_name", "app"),
        ("log_level", "Debug"),
        ("log_split_type", "Size"),
        ("log_split_size", "4096"),
        ("log_max_backups", "3"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let logger = new_logger("file", &config).expect("Unable to open log files");

    for i in 0..200 {
        if i % 10 == 0 {
            splitlog::warn!(logger, "Log message number {i}");
        } else {
            splitlog::info!(logger, "Log message number {i}");
        }
    }

    logger.close();

    let mut files: Vec<String> = std::fs::read_dir(&dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    files.sort();

    println!("\n--- Rotation Summary ---");
    println!("Log directory: {}", dir.display());
    for f in &files {
        println!("  {f}");
    }
    let backups = files.iter().filter(|f| f.starts_with("app.log_")).count();
    assert!(backups <= 3, "log_max_backups should keep at most 3 backups");
}
