use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info, warn};

use crate::fetcher::VersionInfo;
use crate::store::ReminderStore;
use crate::version::AppVersion;

pub const DEFAULT_COOLDOWN_HOURS: i64 = 24;

pub const ALERT_TITLE: &str = "Update Available";
pub const REMIND_LATER_LABEL: &str = "Remind me later";
pub const LEARN_HOW_LABEL: &str = "Learn how to update";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disconnected,
    NoVersionInfo,
    UnknownCurrentVersion,
    UpToDate,
    CoolingDown,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "not connected",
            Self::NoVersionInfo => "no version info",
            Self::UnknownCurrentVersion => "current version unknown",
            Self::UpToDate => "already up to date",
            Self::CoolingDown => "reminded recently",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The alert to show when an update reminder is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAlert {
    pub title: String,
    pub message: String,
    pub latest_version: String,
    pub primary_label: &'static str,
    pub secondary_label: &'static str,
    pub help_url: String,
}

/// What the user picked in an [`UpdateAlert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertChoice {
    Dismiss,
    OpenHelp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Notify(UpdateAlert),
    Skip(SkipReason),
}

impl Decision {
    #[must_use]
    pub fn is_notify(&self) -> bool {
        matches!(self, Self::Notify(_))
    }
}

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub cooldown: TimeDelta,
    pub app_name: String,
    pub help_url: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            cooldown: TimeDelta::hours(DEFAULT_COOLDOWN_HOURS),
            app_name: "Upcheck".to_string(),
            help_url: "https://upcheck.dev/docs/#how-do-i-update-the-app".to_string(),
        }
    }
}

#[must_use]
pub fn compose_message(app_name: &str, info: &VersionInfo) -> String {
    let mut message = format!(
        "{app_name} Version {} is available and ready to install.",
        info.latest_version
    );
    if info.show_message {
        message.push_str("\n\n What's New: \n ");
        message.push_str(&info.update_message);
    }
    message
}

/// Decide whether a reminder is due, without touching any state.
#[must_use]
pub fn decide(
    config: &ReminderConfig,
    info: Option<&VersionInfo>,
    current_version: Option<&str>,
    now: DateTime<Utc>,
    last_reminded_at: DateTime<Utc>,
    is_connected: bool,
) -> Decision {
    if !is_connected {
        return Decision::Skip(SkipReason::Disconnected);
    }
    let Some(info) = info else {
        return Decision::Skip(SkipReason::NoVersionInfo);
    };
    let Some(current) = current_version.and_then(|raw| AppVersion::parse(raw).ok()) else {
        return Decision::Skip(SkipReason::UnknownCurrentVersion);
    };
    if current >= info.latest_version {
        return Decision::Skip(SkipReason::UpToDate);
    }
    if now - last_reminded_at <= config.cooldown {
        return Decision::Skip(SkipReason::CoolingDown);
    }

    Decision::Notify(UpdateAlert {
        title: ALERT_TITLE.to_string(),
        message: compose_message(&config.app_name, info),
        latest_version: info.latest_version.to_string(),
        primary_label: REMIND_LATER_LABEL,
        secondary_label: LEARN_HOW_LABEL,
        help_url: config.help_url.clone(),
    })
}

/// Throttled update reminders backed by a [`ReminderStore`].
pub struct UpdateReminderPolicy {
    config: ReminderConfig,
    store: Arc<dyn ReminderStore>,
    guard: Mutex<()>,
}

impl UpdateReminderPolicy {
    pub fn new(config: ReminderConfig, store: Arc<dyn ReminderStore>) -> Self {
        Self {
            config,
            store,
            guard: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Evaluate a check cycle and record the reminder time on `Notify`.
    ///
    /// Reading and updating the stored timestamp happen under one lock, so
    /// concurrent evaluations cannot both notify.
    pub fn evaluate(
        &self,
        info: Option<&VersionInfo>,
        current_version: Option<&str>,
        now: DateTime<Utc>,
        is_connected: bool,
    ) -> Decision {
        let _guard = self
            .guard
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let last_reminded_at = self.store.last_reminded_at();
        let decision = decide(
            &self.config,
            info,
            current_version,
            now,
            last_reminded_at,
            is_connected,
        );

        match &decision {
            Decision::Notify(alert) => {
                if let Err(error) = self.store.set_last_reminded_at(now) {
                    warn!("Failed to persist update reminder time: {error}");
                }
                info!(
                    "Update {} available, reminding user (current {})",
                    alert.latest_version,
                    current_version.unwrap_or("unknown")
                );
            }
            Decision::Skip(reason) => debug!("Update reminder skipped: {reason}"),
        }

        decision
    }
}
