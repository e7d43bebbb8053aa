//! Core types for the review engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ReviewError;

/// Identifier of a flashcard.
pub type CardId = Uuid;

/// Identifier of a deck.
pub type DeckId = Uuid;

/// Self-reported recall grade, 0 (worst) to 4 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 4;

    /// Create from a numeric grade, rejecting anything outside `0..=4`.
    pub fn new(value: i64) -> Result<Self, ReviewError> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ReviewError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Bucket this grade is counted under in session statistics.
    pub fn outcome(self) -> Outcome {
        match self.0 {
            0 => Outcome::Error,
            1 => Outcome::Hard,
            2 => Outcome::Medium,
            3 => Outcome::Good,
            _ => Outcome::Easy,
        }
    }

    /// Every accepted grade, lowest first.
    pub fn all() -> impl Iterator<Item = Quality> {
        (0..=Self::MAX).map(Quality)
    }
}

impl TryFrom<i64> for Quality {
    type Error = ReviewError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Per-outcome bucket used in session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Error,
    Hard,
    Medium,
    Good,
    Easy,
}

/// Scheduling state of a single card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionState {
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive passing answers.
    pub repetitions: u32,
    pub ease_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: DateTime<Utc>,
}

impl RepetitionState {
    /// State of a card that has never been reviewed.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            interval: 0,
            repetitions: 0,
            ease_factor: 2.5,
            last_review: None,
            next_review: now,
        }
    }
}

/// A flashcard together with its scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: CardId,
    pub deck_id: DeckId,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
    pub repetition: RepetitionState,
}

impl Flashcard {
    /// Create a card that is due immediately.
    pub fn new(
        deck_id: DeckId,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            deck_id,
            front: front.into(),
            back: back.into(),
            created_at: now,
            repetition: RepetitionState::new(now),
        }
    }
}

/// A named collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Deck {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
        }
    }
}
