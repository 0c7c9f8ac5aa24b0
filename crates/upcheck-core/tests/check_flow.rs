use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use upcheck_core::{
    AlertChoice, AlertPresenter, CheckOutcome, Clock, ConnectivityMonitor, MemoryReminderStore,
    ReminderConfig, ReminderStore, SkipReason, UpdateAlert, UpdateChecker, UpdateReminderPolicy,
    VersionRequest,
};

const NEWER_PAYLOAD: &str =
    r#"{"latest_version":"1.10.0","update_message":"","show_message":false}"#;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

struct RecordingPresenter {
    choice: AlertChoice,
    shown: Mutex<Vec<UpdateAlert>>,
}

impl RecordingPresenter {
    fn answering(choice: AlertChoice) -> Arc<Self> {
        Arc::new(Self {
            choice,
            shown: Mutex::new(Vec::new()),
        })
    }

    fn shown(&self) -> usize {
        self.shown.lock().expect("presenter lock should not be poisoned").len()
    }
}

#[async_trait]
impl AlertPresenter for RecordingPresenter {
    async fn present(&self, alert: &UpdateAlert) -> AlertChoice {
        self.shown
            .lock()
            .expect("presenter lock should not be poisoned")
            .push(alert.clone());
        self.choice
    }
}

struct Harness {
    store: Arc<MemoryReminderStore>,
    presenter: Arc<RecordingPresenter>,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 8, 30, 0)
        .single()
        .expect("timestamp should be valid")
}

async fn serve(status: &'static str, body: &'static str, hits: Arc<AtomicUsize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            hits.fetch_add(1, Ordering::SeqCst);
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/version.json")
}

fn checker(
    url: &str,
    last_reminded_at: DateTime<Utc>,
    connected: bool,
    choice: AlertChoice,
) -> (UpdateChecker, Harness) {
    let store = Arc::new(MemoryReminderStore::starting_at(last_reminded_at));
    let presenter = RecordingPresenter::answering(choice);
    let (monitor, reporter) = ConnectivityMonitor::new();
    reporter.set_connected(connected);

    let policy_store: Arc<dyn ReminderStore> = store.clone();
    let policy = UpdateReminderPolicy::new(
        ReminderConfig {
            app_name: "Puckboard".to_string(),
            ..ReminderConfig::default()
        },
        policy_store,
    );
    let checker = UpdateChecker::new(
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test client should build"),
        VersionRequest::version(url),
        Some("1.9.0".to_string()),
        Arc::new(monitor),
        Arc::new(FixedClock(now())),
        policy,
        presenter.clone(),
    )
    .with_settle_timeout(Duration::from_millis(200));

    (checker, Harness { store, presenter })
}

#[tokio::test]
async fn newer_version_after_cooldown_reminds_and_records_time() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("200 OK", NEWER_PAYLOAD, hits.clone()).await;
    let (checker, harness) = checker(
        &url,
        now() - TimeDelta::hours(30),
        true,
        AlertChoice::Dismiss,
    );

    let outcome = checker.run().await;

    let CheckOutcome::Reminded { alert, choice } = outcome else {
        panic!("expected a reminder, got {outcome:?}");
    };
    assert_eq!(choice, AlertChoice::Dismiss);
    assert_eq!(
        alert.message,
        "Puckboard Version 1.10.0 is available and ready to install."
    );
    assert_eq!(harness.store.last_reminded_at(), now());
    assert_eq!(harness.presenter.shown(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn recent_reminder_skips_without_touching_state() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("200 OK", NEWER_PAYLOAD, hits.clone()).await;
    let last = now() - TimeDelta::hours(2);
    let (checker, harness) = checker(&url, last, true, AlertChoice::Dismiss);

    let outcome = checker.run().await;

    assert_eq!(outcome, CheckOutcome::Skipped(SkipReason::CoolingDown));
    assert_eq!(harness.store.last_reminded_at(), last);
    assert_eq!(harness.presenter.shown(), 0);
}

#[tokio::test]
async fn offline_check_never_hits_the_endpoint() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("200 OK", NEWER_PAYLOAD, hits.clone()).await;
    let last = now() - TimeDelta::days(3);
    let (checker, harness) = checker(&url, last, false, AlertChoice::Dismiss);

    let outcome = checker.run().await;

    assert_eq!(outcome, CheckOutcome::Skipped(SkipReason::Disconnected));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.store.last_reminded_at(), last);
}

#[tokio::test]
async fn server_error_is_treated_as_no_version_info() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("503 Service Unavailable", NEWER_PAYLOAD, hits.clone()).await;
    let (checker, harness) = checker(
        &url,
        DateTime::<Utc>::UNIX_EPOCH,
        true,
        AlertChoice::Dismiss,
    );

    let outcome = checker.run().await;

    assert_eq!(outcome, CheckOutcome::Skipped(SkipReason::NoVersionInfo));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.presenter.shown(), 0);
}

#[tokio::test]
async fn malformed_payload_is_treated_as_no_version_info() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("200 OK", r#"{"latest_version":"1.10.0"}"#, hits.clone()).await;
    let (checker, harness) = checker(
        &url,
        DateTime::<Utc>::UNIX_EPOCH,
        true,
        AlertChoice::Dismiss,
    );

    let outcome = checker.run().await;

    assert_eq!(outcome, CheckOutcome::Skipped(SkipReason::NoVersionInfo));
    assert_eq!(harness.store.last_reminded_at(), DateTime::<Utc>::UNIX_EPOCH);
}

#[tokio::test]
async fn up_to_date_payload_skips() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve(
        "200 OK",
        r#"{"latest_version":"1.9","update_message":"x","show_message":true}"#,
        hits.clone(),
    )
    .await;
    let (checker, _harness) = checker(
        &url,
        DateTime::<Utc>::UNIX_EPOCH,
        true,
        AlertChoice::Dismiss,
    );

    assert_eq!(
        checker.run().await,
        CheckOutcome::Skipped(SkipReason::UpToDate)
    );
}

#[tokio::test]
async fn spawned_check_reports_open_help_choice() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve(
        "200 OK",
        r#"{"latest_version":"2.0.0","update_message":"New sync engine","show_message":true}"#,
        hits.clone(),
    )
    .await;
    let (checker, harness) = checker(
        &url,
        DateTime::<Utc>::UNIX_EPOCH,
        true,
        AlertChoice::OpenHelp,
    );
    let checker = Arc::new(checker);

    let outcome = Arc::clone(&checker)
        .spawn()
        .await
        .expect("check task should not panic");

    let Some(CheckOutcome::Reminded { alert, choice }) = outcome else {
        panic!("expected a reminder, got {outcome:?}");
    };
    assert_eq!(choice, AlertChoice::OpenHelp);
    assert!(alert.message.ends_with("What's New: \n New sync engine"));
    assert_eq!(harness.store.last_reminded_at(), now());
}

#[tokio::test]
async fn spawned_check_discards_result_when_owner_is_gone() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("200 OK", NEWER_PAYLOAD, hits.clone()).await;
    let (checker, harness) = checker(
        &url,
        DateTime::<Utc>::UNIX_EPOCH,
        true,
        AlertChoice::Dismiss,
    );

    let outcome = Arc::new(checker)
        .spawn()
        .await
        .expect("check task should not panic");

    assert!(outcome.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.presenter.shown(), 0);
    assert_eq!(harness.store.last_reminded_at(), DateTime::<Utc>::UNIX_EPOCH);
}

#[tokio::test]
async fn spawned_offline_check_skips_without_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve("200 OK", NEWER_PAYLOAD, hits.clone()).await;
    let (checker, harness) = checker(
        &url,
        DateTime::<Utc>::UNIX_EPOCH,
        false,
        AlertChoice::Dismiss,
    );
    let checker = Arc::new(checker);

    let outcome = Arc::clone(&checker)
        .spawn()
        .await
        .expect("check task should not panic");

    assert_eq!(
        outcome,
        Some(CheckOutcome::Skipped(SkipReason::Disconnected))
    );
    assert_eq!(
        checker.run().await,
        CheckOutcome::Skipped(SkipReason::Disconnected)
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(harness.presenter.shown(), 0);
}
