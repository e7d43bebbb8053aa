//! Error types for review-core.

use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionPhase;

/// Result type alias using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Errors reported by the review engine.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("invalid quality {0}: expected 0..=4")]
    InvalidQuality(i64),

    #[error("cannot {action} while session is {phase}")]
    IllegalTransition {
        action: &'static str,
        phase: SessionPhase,
    },

    #[error("card store failure: {0}")]
    Persistence(#[from] StoreError),
}

/// Errors returned by a card store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("card not found: {0}")]
    CardNotFound(Uuid),

    #[error("deck not found: {0}")]
    DeckNotFound(Uuid),

    #[error("store unavailable: {0}")]
    Backend(String),
}
