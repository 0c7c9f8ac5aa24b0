#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, Config, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use upcheck_platform::AppPaths;

use crate::settings::AppSettings;

/// Append-only log file that is reopened if it disappears between writes.
struct ReopeningLogFile {
    path: PathBuf,
    file: Mutex<File>,
}

impl ReopeningLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = open_append(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    fn with_file<T>(&self, op: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.path.exists() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            *file = open_append(&self.path)?;
        }
        op(&mut file)
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for ReopeningLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(File::flush)
    }
}

/// Drop the older half of the log once it grows past `max_len` bytes.
fn trim_oversized_log(log_path: &Path, max_len: u64) {
    let Ok(metadata) = std::fs::metadata(log_path) else {
        return;
    };
    if metadata.len() <= max_len {
        return;
    }
    let Ok(contents) = std::fs::read(log_path) else {
        return;
    };
    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(half, |pos| half + pos + 1);
    let _ = std::fs::write(log_path, &contents[keep_from..]);
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("upcheck")
        .build()
}

/// Loggers to install: a file logger in the data directory plus a stderr
/// logger in debug builds. The path is set only when the log file opened.
fn build_loggers(
    paths: &AppPaths,
    settings: &AppSettings,
) -> (Vec<Box<dyn SharedLogger>>, Option<PathBuf>) {
    let _ = paths.ensure_dirs();
    let log_path = paths.log_file();
    trim_oversized_log(&log_path, settings.max_log_size_bytes);

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    #[cfg(debug_assertions)]
    loggers.push(TermLogger::new(
        LevelFilter::Debug,
        log_config(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    match ReopeningLogFile::open(log_path.clone()) {
        Ok(file) => {
            loggers.push(WriteLogger::new(LevelFilter::Debug, log_config(), file));
            (loggers, Some(log_path))
        }
        Err(_) => (loggers, None),
    }
}

/// Install the global logger. Returns the log file path when file logging
/// is active.
pub fn init_logging(paths: &AppPaths, settings: &AppSettings) -> Option<PathBuf> {
    let (loggers, log_path) = build_loggers(paths, settings);
    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
    set_debug_logging(settings.debug_logging);
    log_path
}

/// Warnings are always recorded; debug detail only when enabled.
pub fn set_debug_logging(enabled: bool) {
    log::set_max_level(if enabled {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
}
