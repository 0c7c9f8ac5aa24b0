use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use fs2::FileExt;

use crate::error::AppError;

/// Exclusive lock held for the duration of one update check, so two
/// processes never evaluate and persist the reminder state at once.
pub struct CheckLock {
    file: File,
}

impl CheckLock {
    pub fn acquire(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|error| AppError::check_lock_failed("create directory", error))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|error| AppError::check_lock_failed("open", error))?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::WouldBlock => {
                return Err(AppError::check_already_running());
            }
            Err(error) => return Err(AppError::check_lock_failed("acquire", error)),
        }

        file.set_len(0)
            .and_then(|()| file.seek(SeekFrom::Start(0)).map(|_| ()))
            .and_then(|()| writeln!(file, "{}", std::process::id()))
            .map_err(|error| AppError::check_lock_failed("write", error))?;

        Ok(Self { file })
    }
}

impl Drop for CheckLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
