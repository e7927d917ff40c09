use planpin_proto::PinStatus;
use thiserror::Error;

/// Capture-time input errors.
///
/// These are recovered locally by prompting the user to correct the input;
/// a write that fails validation never reaches the queue or the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a label is required")]
    MissingLabel,
    #[error("a photo is mandatory for status '{status}'")]
    PhotoRequired { status: PinStatus },
    #[error("required field '{0}' is missing")]
    MissingField(String),
}

/// Local persistence failures.
///
/// Surfaced to the caller as "save failed"; there is no volatile-memory
/// fallback for data that could not be persisted.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("queue storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("queue database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("corrupt queue payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Per-call backend failures.
///
/// Transient by assumption: a queued batch that hits one of these is
/// retained verbatim and retried on the next sync.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend rejected the call ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected backend payload: {0}")]
    Parse(String),
}

/// Errors produced by the save and sync paths.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("client is offline")]
    Offline,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
