#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorDetail {
    Message(String),
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl std::fmt::Display for AppErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Io { kind, message } => write!(f, "{kind}: {message}"),
        }
    }
}

impl From<String> for AppErrorDetail {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppErrorDetail {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<std::io::Error> for AppErrorDetail {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<upcheck_platform::AppPathsError> for AppErrorDetail {
    fn from(value: upcheck_platform::AppPathsError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<reqwest::Error> for AppErrorDetail {
    fn from(value: reqwest::Error) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    PathsUnavailable {
        details: AppErrorDetail,
    },
    CheckAlreadyRunning,
    CheckLockFailed {
        action: &'static str,
        details: AppErrorDetail,
    },
    HttpClientFailed {
        details: AppErrorDetail,
    },
    OpenHelpFailed {
        url: String,
        details: AppErrorDetail,
    },
}

impl AppError {
    pub fn paths_unavailable(details: impl Into<AppErrorDetail>) -> Self {
        Self::PathsUnavailable {
            details: details.into(),
        }
    }

    pub fn check_already_running() -> Self {
        Self::CheckAlreadyRunning
    }

    pub fn check_lock_failed(action: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::CheckLockFailed {
            action,
            details: details.into(),
        }
    }

    pub fn http_client_failed(details: impl Into<AppErrorDetail>) -> Self {
        Self::HttpClientFailed {
            details: details.into(),
        }
    }

    pub fn open_help_failed(url: impl Into<String>, details: impl Into<AppErrorDetail>) -> Self {
        Self::OpenHelpFailed {
            url: url.into(),
            details: details.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PathsUnavailable { details } => {
                write!(f, "Application directories unavailable: {details}")
            }
            Self::CheckAlreadyRunning => write!(f, "Another update check is already running"),
            Self::CheckLockFailed { action, details } => {
                write!(f, "Update check lock {action} failed: {details}")
            }
            Self::HttpClientFailed { details } => {
                write!(f, "Failed to build HTTP client: {details}")
            }
            Self::OpenHelpFailed { url, details } => {
                write!(f, "Failed to open {url}: {details}")
            }
        }
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::{AppError, AppErrorDetail};

    #[test]
    fn check_lock_constructors_include_context() {
        let running = AppError::check_already_running();
        let failed = AppError::check_lock_failed("open", "permission denied");

        assert_eq!(running, AppError::CheckAlreadyRunning);
        assert_eq!(
            failed,
            AppError::CheckLockFailed {
                action: "open",
                details: AppErrorDetail::from("permission denied")
            }
        );
        assert_eq!(
            running.to_string(),
            "Another update check is already running"
        );
        assert_eq!(
            failed.to_string(),
            "Update check lock open failed: permission denied"
        );
    }

    #[test]
    fn open_help_failed_names_the_url() {
        let error = AppError::open_help_failed("https://example.com/help", "no browser");

        assert_eq!(
            error.to_string(),
            "Failed to open https://example.com/help: no browser"
        );
    }

    #[test]
    fn paths_error_converts_to_message_detail() {
        let error = AppError::paths_unavailable(upcheck_platform::AppPathsError::DataDirUnavailable);

        assert_eq!(
            error,
            AppError::PathsUnavailable {
                details: AppErrorDetail::Message(
                    "Could not determine data directory".to_string()
                )
            }
        );
    }

    #[test]
    fn io_detail_keeps_error_kind_and_message() {
        let detail = AppErrorDetail::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(matches!(
            detail,
            AppErrorDetail::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert_eq!(detail.to_string(), "permission denied: denied");
    }
}
