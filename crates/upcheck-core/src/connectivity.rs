use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectivityStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ConnectivityStatus {
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

#[async_trait]
pub trait ConnectivitySignal: Send + Sync {
    /// Current view of connectivity. May be stale right after startup.
    fn is_connected(&self) -> bool;

    /// Wait until the status has settled and report whether we are online.
    ///
    /// A status still unknown after `timeout` counts as disconnected.
    async fn settled(&self, timeout: Duration) -> bool;
}

/// Connectivity state observed through a watch channel.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    rx: watch::Receiver<ConnectivityStatus>,
}

/// Publishing half of a [`ConnectivityMonitor`].
#[derive(Debug)]
pub struct ConnectivityReporter {
    tx: watch::Sender<ConnectivityStatus>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new() -> (Self, ConnectivityReporter) {
        let (tx, rx) = watch::channel(ConnectivityStatus::Unknown);
        (Self { rx }, ConnectivityReporter { tx })
    }

    #[must_use]
    pub fn status(&self) -> ConnectivityStatus {
        *self.rx.borrow()
    }
}

impl ConnectivityReporter {
    pub fn report(&self, status: ConnectivityStatus) {
        self.tx.send_replace(status);
    }

    pub fn set_connected(&self, connected: bool) {
        self.report(if connected {
            ConnectivityStatus::Online
        } else {
            ConnectivityStatus::Offline
        });
    }
}

#[async_trait]
impl ConnectivitySignal for ConnectivityMonitor {
    fn is_connected(&self) -> bool {
        self.status() == ConnectivityStatus::Online
    }

    async fn settled(&self, timeout: Duration) -> bool {
        let mut rx = self.rx.clone();
        let settled = tokio::time::timeout(timeout, async {
            rx.wait_for(|status| status.is_settled())
                .await
                .map(|status| *status)
        })
        .await;
        match settled {
            Ok(Ok(status)) => status == ConnectivityStatus::Online,
            // Reporter dropped or the wait timed out: go with whatever we have.
            Ok(Err(_)) | Err(_) => self.is_connected(),
        }
    }
}
