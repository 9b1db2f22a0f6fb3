use crate::infrastructure::DataUpdateHook;
use anyhow::{Context, Result, anyhow};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Plugin that appends a line to a log file whenever user data changes.
///
/// Hooks run synchronously on the task that finished the store operation, so
/// the file is opened once up front and each notification is a single
/// `write` of one short line.
pub struct ActivityLogHook {
    log_path: PathBuf,
    file: Mutex<File>,
}

impl ActivityLogHook {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let log_path = data_dir.join("activity_log.txt");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;

        Ok(Self {
            log_path,
            file: Mutex::new(file),
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

impl DataUpdateHook for ActivityLogHook {
    fn on_user_data_updated(&self) -> Result<()> {
        let line = format!(
            "[{}] user data updated\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        );

        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow!("Activity log lock poisoned"))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("Failed to write {}", self.log_path.display()))
    }

    fn name(&self) -> &str {
        "Activity Log"
    }
}
