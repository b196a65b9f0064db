//! Core error types for habitual-core.
//!
//! Each layer owns a typed error built with thiserror; `CoreError`
//! aggregates them for callers that drive the whole library.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::habit::HabitId;

/// Core error type for habitual-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Store-level errors (missing habit, database failures)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a `HabitStore`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The habit id does not exist.
    #[error("habit not found: {0}")]
    NotFound(HabitId),

    /// Backend failure.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A persisted row could not be decoded into a domain value.
    #[error("corrupt record in {table}: {message}")]
    CorruptRecord { table: &'static str, message: String },

    /// An applied check-in outcome without a check-in date.
    #[error("applied check-in for habit {0} carries no date")]
    MissingCheckInDate(HabitId),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
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

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Periodicity outside {daily, weekly}
    #[error("invalid periodicity '{0}': expected 'daily' or 'weekly'")]
    InvalidPeriodicity(String),

    /// Habit name is blank
    #[error("habit name must not be empty")]
    EmptyName,

    /// Check-in dated before the habit's last check-in
    #[error("check-in date {today} is earlier than last check-in {last}")]
    CheckInBeforeLast { last: NaiveDate, today: NaiveDate },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked
                    || inner.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.into())
    }
}

impl CoreError {
    /// True when the error means the requested habit does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Store(StoreError::NotFound(_)))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
