/// Error types for the schedule editor.
///
/// Validation failures are local and never touch the network. Remote
/// failures come from the persistence backend. Neither is fatal: the
/// engine leaves its in-memory state intact on every error.

use thiserror::Error;

/// Why a slot or a day may not be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("Start time and end time are required")]
    MissingField,
    #[error("The clinic is closed on Sundays")]
    ClosedDay,
    #[error("Times must be within business hours (9:00 AM - 8:00 PM)")]
    OutsideBusinessHours,
    #[error("Start time must be before end time")]
    InvertedInterval,
    #[error("Start time must be at least 5 minutes from now")]
    PastStartTime,
    #[error("This day can no longer be edited")]
    NotEditable,
}

/// Failure talking to the schedule backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFailure {
    #[error("Session expired, please log in again")]
    AuthExpired,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

/// Any failure surfaced by the schedule manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
    #[error("No day is open for editing")]
    NoOpenSession,
    #[error("Slot not found in the draft")]
    SlotNotFound,
}

impl ScheduleError {
    /// Whether the user has to log in again before retrying.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ScheduleError::Remote(RemoteFailure::AuthExpired))
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}
