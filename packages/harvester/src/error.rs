//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for library consumers,
//! wrapping the parser's `ConjugationError` for per-verb parse failures.

use conjugaison_parser::ConjugationError;
use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// All retry attempts for a request failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The dictionary did not hand out a session cookie.
    #[error("No JSESSIONID cookie in response from {url}")]
    SessionNotFound { url: String },

    /// Conjugation page could not be parsed.
    #[error("Conjugation parsing failed: {0}")]
    Conjugation(#[from] ConjugationError),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite export error.
    #[error("Database export failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON (de)serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
