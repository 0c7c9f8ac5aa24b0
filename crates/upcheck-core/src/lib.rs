//! Core update-check logic for Upcheck.
//!
//! This crate is independent of any UI toolkit or storage backend:
//! - Version endpoint fetching and payload decoding.
//! - Numeric dot-segment version ordering.
//! - The throttled reminder policy and its collaborator traits.
//! - A connectivity signal that can be awaited until it settles.
//! - The check workflow tying these together.

pub mod checker;
pub mod connectivity;
mod fetcher;
mod policy;
mod store;
mod version;

/// Update check workflow and the alert presenter it reports to.
pub use checker::{AlertPresenter, CheckOutcome, DEFAULT_SETTLE_TIMEOUT, UpdateChecker};
/// Connectivity status, observable monitor, and its reporter.
pub use connectivity::{
    ConnectivityMonitor, ConnectivityReporter, ConnectivitySignal, ConnectivityStatus,
};
/// Version endpoint request, payload model, and fetch helpers.
pub use fetcher::{
    DEFAULT_VERSION_ENDPOINT, FetchError, VersionInfo, VersionRequest, fetch_version_info,
    spawn_fetch, try_fetch_version_info,
};
/// Reminder decision, alert model, and the throttling policy.
pub use policy::{
    AlertChoice, DEFAULT_COOLDOWN_HOURS, Decision, ReminderConfig, SkipReason, UpdateAlert,
    UpdateReminderPolicy, compose_message, decide,
};
/// Reminder timestamp persistence and time source.
pub use store::{Clock, MemoryReminderStore, ReminderStore, StoreError, SystemClock};
/// Parsed application versions and comparison helpers.
pub use version::{AppVersion, VersionParseError, is_newer_version};
