//! Installation log file
//!
//! Every command the installer runs is written, with its stdout and stderr,
//! to a timestamped log file in the temp directory so a failed package-manager
//! step can be diagnosed after the console output has scrolled away.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_PREFIX: &str = "dockup-install-";
const LOG_SUFFIX: &str = ".log";

/// Number of previous install logs kept around
pub const KEEP_LOGS: usize = 5;

/// Append-only log of one installer run
pub struct InstallLogger {
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl InstallLogger {
    /// Create a new logger with a timestamped log file in the temp directory
    pub fn new() -> std::io::Result<Self> {
        Self::in_dir(&std::env::temp_dir())
    }

    pub fn in_dir(dir: &Path) -> std::io::Result<Self> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_path = dir.join(format!("{}{}{}", LOG_PREFIX, timestamp, LOG_SUFFIX));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let logger = Self {
            log_file: Mutex::new(Some(file)),
            log_path,
        };

        logger.info("=== dockup installation log ===");
        logger.info(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
        logger.info(&format!(
            "Started: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        logger.info("");

        Ok(logger)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn info(&self, message: &str) {
        self.log_message("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.log_message("WARN", message);
    }

    pub fn debug(&self, message: &str) {
        self.log_message("DEBUG", message);
    }

    fn log_message(&self, level: &str, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let formatted = if level.is_empty() {
            format!("[{}] {}", timestamp, message)
        } else {
            format!("[{}] [{}] {}", timestamp, level, message)
        };

        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = writeln!(file, "{}", formatted);
                let _ = file.flush();
            }
        }
    }

    pub fn log_stdout(&self, output: &str) {
        for line in output.lines() {
            self.log_message("", &format!("  stdout: {}", line));
        }
    }

    pub fn log_stderr(&self, output: &str) {
        for line in output.lines() {
            self.log_message("", &format!("  stderr: {}", line));
        }
    }

    /// Remove all but the newest `keep_count` install logs in `dir`
    pub fn cleanup_old_logs(dir: &Path, keep_count: usize) -> std::io::Result<()> {
        let mut log_files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first; the timestamped names sort the same way as mtimes
        log_files.sort_by_key(|path| {
            (
                std::fs::metadata(path).and_then(|m| m.modified()).ok(),
                path.clone(),
            )
        });

        if log_files.len() > keep_count {
            let to_remove = log_files.len() - keep_count;
            for path in log_files.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }

    pub fn finalize(&self) {
        self.info("");
        self.info(&format!(
            "Finished: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }
}

impl Drop for InstallLogger {
    fn drop(&mut self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}
