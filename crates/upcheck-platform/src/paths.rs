use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "upcheck";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Where upcheck keeps its settings and reminder state.
///
/// On macOS both live under `~/Library/Application Support/upcheck`.
/// Elsewhere settings go to the config directory and state to the data
/// directory.
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve upcheck's directories for this user.
    ///
    /// # Errors
    /// Fails if the platform gives no home directory on macOS, or no config
    /// or data directory elsewhere.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            let support = home.join("Library/Application Support").join(APP_DIR);
            Ok(Self {
                config_dir: support.clone(),
                data_dir: support,
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join(APP_DIR),
                data_dir: dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join(APP_DIR),
            })
        }
    }

    /// User-editable JSON settings.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// When the user was last reminded about an update.
    #[must_use]
    pub fn reminder_state_file(&self) -> PathBuf {
        self.data_dir.join("reminder.json")
    }

    /// Held while a check runs so concurrent checks back off.
    #[must_use]
    pub fn check_lock_file(&self) -> PathBuf {
        self.data_dir.join("check.lock")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }

    /// Create the config and data directories if they are missing.
    ///
    /// # Errors
    /// Propagates the first directory creation failure.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::AppPaths;

    fn paths_in(root: &TempDir) -> AppPaths {
        AppPaths {
            config_dir: root.path().join("settings-home"),
            data_dir: root.path().join("state-home"),
        }
    }

    #[test]
    fn files_live_in_their_directories() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let paths = paths_in(&root);

        assert!(
            paths
                .settings_file()
                .ends_with(Path::new("settings-home").join("settings.json"))
        );
        for (file, name) in [
            (paths.reminder_state_file(), "reminder.json"),
            (paths.check_lock_file(), "check.lock"),
            (paths.log_file(), "debug.log"),
        ] {
            assert_eq!(file, paths.data_dir.join(name));
        }
    }

    #[test]
    fn ensure_dirs_creates_missing_directories() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let paths = paths_in(&root);
        assert!(!paths.data_dir.exists());

        paths
            .ensure_dirs()
            .expect("directories should be created under a temp root");

        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
    }
}
