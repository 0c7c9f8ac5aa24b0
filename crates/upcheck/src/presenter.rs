use async_trait::async_trait;
use inquire::{InquireError, Select};
use log::debug;
use upcheck_core::{AlertChoice, AlertPresenter, UpdateAlert};

/// Shows update alerts as an interactive terminal selection.
pub struct TerminalPresenter;

fn prompt_message(alert: &UpdateAlert) -> String {
    format!("{}\n\n{}\n", alert.title, alert.message)
}

fn choice_for(alert: &UpdateAlert, selected: &str) -> AlertChoice {
    if selected == alert.secondary_label {
        AlertChoice::OpenHelp
    } else {
        AlertChoice::Dismiss
    }
}

fn choice_from_prompt(
    alert: &UpdateAlert,
    answer: Result<&'static str, InquireError>,
) -> AlertChoice {
    match answer {
        Ok(selected) => choice_for(alert, selected),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            debug!("Update alert closed without a selection");
            AlertChoice::Dismiss
        }
        Err(error) => {
            debug!("Could not show update alert, dismissing: {error}");
            AlertChoice::Dismiss
        }
    }
}

fn prompt(alert: &UpdateAlert) -> AlertChoice {
    let message = prompt_message(alert);
    let answer = Select::new(
        &message,
        vec![alert.primary_label, alert.secondary_label],
    )
    .with_help_message("enter to choose, esc to be reminded later")
    .prompt();
    choice_from_prompt(alert, answer)
}

#[async_trait]
impl AlertPresenter for TerminalPresenter {
    async fn present(&self, alert: &UpdateAlert) -> AlertChoice {
        let alert = alert.clone();
        tokio::task::spawn_blocking(move || prompt(&alert))
            .await
            .unwrap_or_else(|error| {
                debug!("Alert prompt task failed, dismissing: {error}");
                AlertChoice::Dismiss
            })
    }
}
