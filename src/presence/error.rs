use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    #[error("Not connected: {0}")]
    NotPresent(String),

    #[error("Send to {mrn} failed: {reason}")]
    SendFailed { mrn: String, reason: String },
}

pub type PresenceResult<T> = Result<T, PresenceError>;
