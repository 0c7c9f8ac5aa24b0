use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::task::JoinHandle;

use crate::connectivity::ConnectivitySignal;
use crate::fetcher::{VersionInfo, VersionRequest, fetch_version_info};
use crate::policy::{AlertChoice, Decision, SkipReason, UpdateAlert, UpdateReminderPolicy};
use crate::store::Clock;

pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(3);

/// Displays an update alert and reports which action the user took.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    async fn present(&self, alert: &UpdateAlert) -> AlertChoice;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Skipped(SkipReason),
    Reminded {
        alert: UpdateAlert,
        choice: AlertChoice,
    },
}

/// Runs one update check cycle: connectivity, fetch, policy, alert.
pub struct UpdateChecker {
    client: reqwest::Client,
    request: VersionRequest,
    current_version: Option<String>,
    connectivity: Arc<dyn ConnectivitySignal>,
    clock: Arc<dyn Clock>,
    policy: UpdateReminderPolicy,
    presenter: Arc<dyn AlertPresenter>,
    settle_timeout: Duration,
}

impl UpdateChecker {
    pub fn new(
        client: reqwest::Client,
        request: VersionRequest,
        current_version: Option<String>,
        connectivity: Arc<dyn ConnectivitySignal>,
        clock: Arc<dyn Clock>,
        policy: UpdateReminderPolicy,
        presenter: Arc<dyn AlertPresenter>,
    ) -> Self {
        Self {
            client,
            request,
            current_version,
            connectivity,
            clock,
            policy,
            presenter,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Run the whole check and wait for the user's answer, if any.
    pub async fn run(&self) -> CheckOutcome {
        let (info, is_connected) = settle_and_fetch(
            self.connectivity.as_ref(),
            &self.client,
            &self.request,
            self.settle_timeout,
        )
        .await;
        self.finish(info.as_ref(), is_connected).await
    }

    /// Start a check in the background.
    ///
    /// The task only keeps a weak reference while the fetch is in flight.
    /// If every other handle to the checker is gone by the time the fetch
    /// completes, the result is dropped and the task yields `None`.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<Option<CheckOutcome>> {
        let weak = Arc::downgrade(&self);
        let client = self.client.clone();
        let request = self.request.clone();
        let connectivity = Arc::clone(&self.connectivity);
        let settle_timeout = self.settle_timeout;
        drop(self);

        tokio::spawn(async move {
            let (info, is_connected) =
                settle_and_fetch(connectivity.as_ref(), &client, &request, settle_timeout).await;
            let checker = upgrade(&weak)?;
            Some(checker.finish(info.as_ref(), is_connected).await)
        })
    }

    async fn finish(&self, info: Option<&VersionInfo>, is_connected: bool) -> CheckOutcome {
        let decision = self.policy.evaluate(
            info,
            self.current_version.as_deref(),
            self.clock.now(),
            is_connected,
        );

        match decision {
            Decision::Skip(reason) => CheckOutcome::Skipped(reason),
            Decision::Notify(alert) => {
                let choice = self.presenter.present(&alert).await;
                debug!("Update alert answered with {choice:?}");
                CheckOutcome::Reminded { alert, choice }
            }
        }
    }
}

/// Wait for connectivity, then fetch only when connected.
async fn settle_and_fetch(
    connectivity: &dyn ConnectivitySignal,
    client: &reqwest::Client,
    request: &VersionRequest,
    settle_timeout: Duration,
) -> (Option<VersionInfo>, bool) {
    if !connectivity.settled(settle_timeout).await {
        return (None, false);
    }
    (fetch_version_info(client, request).await, true)
}

fn upgrade(weak: &Weak<UpdateChecker>) -> Option<Arc<UpdateChecker>> {
    let checker = weak.upgrade();
    if checker.is_none() {
        debug!("Update checker dropped before the check finished, discarding result");
    }
    checker
}
