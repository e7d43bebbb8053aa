//! Spaced-repetition review engine.
//!
//! Provides:
//! - SM-2 style interval recurrence on a 0-4 quality scale
//! - Due-card selection for a study day
//! - Review session state machine and its statistics
//! - Session controller that persists answers through a [`CardStore`]

pub mod algorithm;
pub mod controller;
pub mod due;
pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use algorithm::{next_state, next_state_raw, IntervalPreview, Sm2, MAX_INTERVAL_DAYS};
pub use controller::{AbortHandle, AnswerOutcome, CommandOutcome, ReviewCommand, ReviewController};
pub use due::{select_due, select_due_with_rng, study_day, DueSelector};
pub use error::{Result, ReviewError, StoreError};
pub use session::{ReviewSession, ScheduledAnswer, SessionPhase, SessionStats, SessionSummary};
pub use store::{CardStore, InMemoryCardStore};
pub use types::{CardId, Deck, DeckId, Flashcard, Outcome, Quality, RepetitionState};
