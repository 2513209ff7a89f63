use thiserror::Error;

use crate::game::types::LocationId;

/// Errors that can arise inside the game core.
///
/// Precondition failures (too little gold, a full pack, an ineligible quest)
/// are reported through outcome enums instead; these variants are reserved
/// for conditions the caller cannot recover from by re-prompting.
#[derive(Debug, Error)]
pub enum GameError {
    /// A location in the topology has no registered handler.
    #[error("no handler registered for location {0}")]
    MissingHandler(LocationId),

    /// A location identifier could not be resolved.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A loaded or constructed record breaks a data-model invariant.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Another session already holds the data directory.
    #[error("another game is already running on this data directory (lock: {0})")]
    SessionInUse(String),

    /// Wrapper around IO errors (save directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around JSON snapshot errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
