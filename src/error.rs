use std::time::Duration;
use thiserror::Error;

/// Errors raised by the pilot layer
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A required element did not become visible within the wait timeout
    #[error("Element '{selector}' not ready after {timeout:?}")]
    ElementNotReady { selector: String, timeout: Duration },

    #[error("Browser driver failed during {action}: {reason}")]
    DriverFailed { action: String, reason: String },

    /// The calendar never rendered the target month label
    #[error("Month {target} not found after {reads} reads")]
    MonthNotFound { target: String, reads: usize },

    #[error("No valid listings among {cards} result cards")]
    NoValidListings { cards: usize },

    /// Best-effort step failure. Logged and swallowed by the step runner, never returned to callers.
    #[error("Optional step '{step}' failed: {reason}")]
    OptionalStepFailed { step: String, reason: String },

    #[error("Mandatory reservation step '{step}' failed: {source}")]
    MandatoryReservationStepFailed {
        step: String,
        #[source]
        source: Box<PilotError>,
    },

    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),

    #[error("Failed to write artifact {name}: {reason}")]
    ArtifactWriteFailed { name: String, reason: String },

    #[error("Watchdog is already armed")]
    WatchdogAlreadyArmed,
}

impl PilotError {
    pub(crate) fn driver(action: &str, err: impl std::fmt::Display) -> Self {
        PilotError::DriverFailed {
            action: action.to_string(),
            reason: err.to_string(),
        }
    }

    /// The failure underneath a mandatory-step wrapper, or the error itself
    pub fn root_cause(&self) -> &PilotError {
        match self {
            PilotError::MandatoryReservationStepFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;
