//! Unified error types for the studio ledger.
//!
//! All fallible operations in the crate return [`Result`], built on a single
//! [`Error`] enum. Lifecycle violations (`InvalidState`), missing records
//! (`NotFound`) and malformed input (`Validation`) are always surfaced to the
//! caller; they are never silently absorbed by core logic.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced student/teacher/lesson/series/enrollment does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up (e.g. `"student"`, `"lesson"`)
        entity: &'static str,
        /// Identifier used for the lookup
        id: String,
    },

    /// A lifecycle transition was attempted from a state that forbids it,
    /// e.g. cancelling an already-cancelled lesson.
    #[error("invalid lesson state: {message}")]
    InvalidState {
        /// Human-readable description of the rejected transition
        message: String,
    },

    /// Malformed input: unknown recurrence pattern, empty teacher list,
    /// non-positive duration, and similar.
    #[error("validation failed: {message}")]
    Validation {
        /// Human-readable description of the rejected input
        message: String,
    },

    /// Database-level failure from `SeaORM`.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// JSON (de)serialization failure, e.g. a corrupt `teacher_ids` column.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
