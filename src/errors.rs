#![allow(dead_code)]

use thiserror::Error;

/// Application-wide error type - single point of truth for anything other
/// than the ingestion entry point itself (config loading, schema setup, CLI
/// commands use this).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Database operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operations (reading a message log, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Coefficient lookup for a game the engine isn't configured to handle
    #[error("Unknown game: {0}")]
    UnknownGame(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Config(format!("JSON error: {}", err))
    }
}

impl From<ProcessError> for EngineError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::ParseFailed(e) => EngineError::Config(e.to_string()),
            ProcessError::UnknownGame(g) => EngineError::UnknownGame(g),
            ProcessError::StorageFailed(e) => EngineError::Database(e),
            ProcessError::Cancelled => EngineError::Config("processing cancelled".to_string()),
        }
    }
}

impl From<EngineError> for ProcessError {
    /// `UnknownGame` must stay distinct rather than fall into the generic
    /// storage-failure bucket (spec §6/§7: `UnknownGame` is non-retryable,
    /// `StorageFailed` is retryable - collapsing the two would make a
    /// configuration fix look like a transient failure worth retrying).
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownGame(g) => ProcessError::UnknownGame(g),
            EngineError::Database(e) => ProcessError::StorageFailed(e),
            other => ProcessError::StorageFailed(rusqlite::Error::ToSqlConversionFailure(
                Box::new(other),
            )),
        }
    }
}

/// Parser-specific failure detail (C2). Always fatal for the message that
/// produced it - the caller must not mark the message processed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to parse {label} message: {reason}")]
pub struct ParseError {
    pub label: &'static str,
    pub reason: String,
}

impl ParseError {
    pub fn new(label: &'static str, reason: impl Into<String>) -> Self {
        Self {
            label,
            reason: reason.into(),
        }
    }
}

/// The engine's single public ingestion error (spec §6).
///
/// `ParseFailed` and `UnknownGame` are non-retryable for the same input;
/// `StorageFailed` and `Cancelled` are retryable.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("parse failed: {0}")]
    ParseFailed(#[from] ParseError),

    #[error("unknown game: {0}")]
    UnknownGame(String),

    #[error("storage failed: {0}")]
    StorageFailed(#[from] rusqlite::Error),

    #[error("processing cancelled")]
    Cancelled,
}

impl ProcessError {
    /// Whether replaying the same `(raw_text, timestamp)` is expected to
    /// succeed once the underlying condition is addressed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessError::StorageFailed(_) | ProcessError::Cancelled
        )
    }

    /// Short tag used in audit `error` records.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::ParseFailed(_) => "parse_failed",
            ProcessError::UnknownGame(_) => "unknown_game",
            ProcessError::StorageFailed(_) => "storage_failed",
            ProcessError::Cancelled => "cancelled",
        }
    }
}
