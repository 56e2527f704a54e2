//! Error types for the conjugation parser.
//!
//! Structural absence (a missing voice, mood or tense) is never an error:
//! it is logged and skipped. Only markup that cannot be composed without
//! guessing surfaces here, scoped to the one verb being parsed.

use thiserror::Error;

/// Main error type for the parser library.
#[derive(Debug, Error)]
pub enum ConjugationError {
    /// The page has no element whose id equals the dictionary entry id.
    #[error("No element with id '{entry_id}' in conjugation page")]
    EntryNotFound { entry_id: String },

    /// A table row lacks a cell the composer needs.
    #[error("Missing <td class=\"{cell}\"> in {context}")]
    MissingCell { cell: &'static str, context: String },
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ConjugationError>;
