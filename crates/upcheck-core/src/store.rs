use std::sync::Mutex;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode reminder state: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }
}

/// Persisted "last reminded" timestamp.
///
/// Implementations return the Unix epoch when nothing has been stored yet.
pub trait ReminderStore: Send + Sync {
    fn last_reminded_at(&self) -> DateTime<Utc>;

    /// Persist a new timestamp.
    ///
    /// # Errors
    /// Returns an error when the backing storage cannot be written.
    fn set_last_reminded_at(&self, at: DateTime<Utc>) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub struct MemoryReminderStore {
    last_reminded_at: Mutex<DateTime<Utc>>,
}

impl MemoryReminderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::UNIX_EPOCH)
    }

    #[must_use]
    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self {
            last_reminded_at: Mutex::new(at),
        }
    }
}

impl Default for MemoryReminderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderStore for MemoryReminderStore {
    fn last_reminded_at(&self) -> DateTime<Utc> {
        *self
            .last_reminded_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_last_reminded_at(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        *self
            .last_reminded_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = at;
        Ok(())
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
