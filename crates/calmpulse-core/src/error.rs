//! Core error types for calmpulse-core.
//!
//! Nothing in here is fatal to tracking. Storage and notification failures are
//! logged and swallowed by the callers that own them, validation errors reject
//! a single edit, and advisory errors are shown to the user as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for calmpulse-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Burnout prediction errors (message is user-facing)
    #[error(transparent)]
    Advisory(#[from] AdvisoryError),

    /// Rejected settings edits
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tracker task has exited and no longer accepts commands
    #[error("Tracker service is not running")]
    ServiceStopped,
}

/// Errors from the durable key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Database is locked")]
    Locked,

    /// A previous holder of the connection panicked
    #[error("Storage handle poisoned")]
    Poisoned,
}

/// Application configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No home or config directory could be resolved
    #[error("Could not determine a data directory")]
    NoDataDir,
}

/// Failures of the burnout prediction round trip.
///
/// The `Display` output is what the user sees.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    /// Endpoint URL could not be parsed
    #[error("Invalid prediction endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Request input out of range
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// Network-level failure (connection refused, timeout, ...)
    #[error("Could not get burnout prediction. Is the prediction service running? ({0})")]
    Request(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Could not get burnout prediction: service returned HTTP {status}")]
    Status { status: u16 },

    /// Body was not the expected JSON object
    #[error("Could not get burnout prediction: malformed response ({0})")]
    MalformedResponse(String),
}

/// Rejected settings edits. The edited value keeps its previous state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No such setting
    #[error("Unknown setting: {0}")]
    UnknownField(String),

    /// Value is not a whole number
    #[error("'{value}' is not a valid number for {field}")]
    NotANumber { field: String, value: String },

    /// Value is below the field's minimum
    #[error("{field} must be at least {minimum} (got {value})")]
    BelowMinimum { field: String, minimum: u32, value: u32 },

    /// Value is not a recognised on/off word
    #[error("'{value}' is not a valid on/off value for {field}")]
    NotABoolean { field: String, value: String },
}

/// Failure reported by a notification backend.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// User has not granted notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Platform notification API failed
    #[error("Notification backend failed: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
