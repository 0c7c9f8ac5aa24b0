mod check_lock;
mod error;
mod logging;
mod presenter;
mod probe;
mod reminder_state;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use upcheck_core::{
    AlertChoice, CheckOutcome, ConnectivityMonitor, SystemClock, UpdateChecker,
    UpdateReminderPolicy, VersionRequest,
};
use upcheck_platform::AppPaths;

use crate::check_lock::CheckLock;
use crate::error::AppError;
use crate::presenter::TerminalPresenter;
use crate::reminder_state::FileReminderStore;
use crate::settings::AppSettings;

/// Extra time the checker waits beyond the probe's own timeout.
const SETTLE_GRACE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> ExitCode {
    let paths = match AppPaths::new() {
        Ok(paths) => paths,
        Err(error) => {
            eprintln!("{}", AppError::paths_unavailable(error));
            return ExitCode::FAILURE;
        }
    };
    let settings = AppSettings::load();
    match logging::init_logging(&paths, &settings) {
        Some(log_path) => debug!("Logging to {}", log_path.display()),
        None => eprintln!(
            "File logging unavailable in {}",
            paths.data_dir.display()
        ),
    }

    if !paths.settings_file().exists()
        && let Err(error) = settings.save()
    {
        warn!("Failed to write default settings: {error}");
    }

    if !settings.check_for_updates {
        info!("Update checks are disabled in settings");
        return ExitCode::SUCCESS;
    }

    match check_for_update(&paths, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CheckAlreadyRunning) => {
            debug!("{}", AppError::CheckAlreadyRunning);
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn check_for_update(paths: &AppPaths, settings: &AppSettings) -> Result<(), AppError> {
    let _lock = CheckLock::acquire(&paths.check_lock_file())?;

    let client = reqwest::Client::builder()
        .timeout(settings.http_timeout())
        .user_agent(format!("upcheck/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(AppError::http_client_failed)?;

    let (monitor, reporter) = ConnectivityMonitor::new();
    probe::spawn_reachability_probe(
        &settings.version_endpoint,
        settings.connectivity_timeout(),
        reporter,
    );

    let store = Arc::new(FileReminderStore::new(paths.reminder_state_file()));
    let policy = UpdateReminderPolicy::new(settings.reminder_config(), store);
    let checker = UpdateChecker::new(
        client,
        VersionRequest::version(settings.version_endpoint.clone()),
        Some(settings.current_version()),
        Arc::new(monitor),
        Arc::new(SystemClock),
        policy,
        Arc::new(TerminalPresenter),
    )
    .with_settle_timeout(settings.connectivity_timeout() + SETTLE_GRACE);

    match checker.run().await {
        CheckOutcome::Skipped(reason) => debug!("No update reminder: {reason}"),
        CheckOutcome::Reminded {
            choice: AlertChoice::Dismiss,
            ..
        } => debug!("Update reminder dismissed"),
        CheckOutcome::Reminded {
            alert,
            choice: AlertChoice::OpenHelp,
        } => {
            info!("Opening update instructions at {}", alert.help_url);
            open::that(&alert.help_url)
                .map_err(|error| AppError::open_help_failed(alert.help_url.clone(), error))?;
        }
    }

    Ok(())
}
