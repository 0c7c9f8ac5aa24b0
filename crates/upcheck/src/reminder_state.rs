use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use upcheck_core::{ReminderStore, StoreError};

#[derive(Debug, Serialize, Deserialize)]
struct ReminderState {
    last_reminded_at: DateTime<Utc>,
}

/// Reminder timestamp kept as a small JSON file in the data directory.
pub struct FileReminderStore {
    path: PathBuf,
}

impl FileReminderStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Option<ReminderState> {
        let data = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(state) => Some(state),
            Err(error) => {
                debug!(
                    "Ignoring unreadable reminder state {}: {error}",
                    self.path.display()
                );
                None
            }
        }
    }
}

impl ReminderStore for FileReminderStore {
    fn last_reminded_at(&self) -> DateTime<Utc> {
        self.load()
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |state| state.last_reminded_at)
    }

    fn set_last_reminded_at(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(&ReminderState {
            last_reminded_at: at,
        })
        .map_err(StoreError::Encode)?;
        write_atomic(&self.path, &data)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().ok_or_else(|| {
        StoreError::io(
            "reminder state path has no parent",
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        )
    })?;
    std::fs::create_dir_all(parent)
        .map_err(|error| StoreError::io("failed to create state directory", error))?;

    let file_name = path
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("reminder");
    let tmp_path = parent.join(format!(".{file_name}.{}.tmp", std::process::id()));

    let written = std::fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(error) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(StoreError::io("failed to write reminder state", error));
    }

    std::fs::rename(&tmp_path, path).map_err(|error| {
        let _ = std::fs::remove_file(&tmp_path);
        StoreError::io("failed to replace reminder state", error)
    })
}
