//! Database rows and API types

use chrono::{DateTime, Utc};
use review_core::{
    CommandOutcome, Deck, Flashcard, IntervalPreview, RepetitionState, SessionPhase, SessionStats,
    SessionSummary,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// === Database Entity Types ===

/// Deck stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbDeck {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<DbDeck> for Deck {
    fn from(row: DbDeck) -> Self {
        Deck {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

/// Card stored in PostgreSQL, scheduling columns inline
#[derive(Debug, Clone, FromRow)]
pub struct DbCard {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub created_at: DateTime<Utc>,
    pub interval_days: i32,
    pub repetitions: i32,
    pub ease_factor: f64,
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: DateTime<Utc>,
}

impl DbCard {
    /// Convert to engine card type
    pub fn to_flashcard(&self) -> Flashcard {
        Flashcard {
            id: self.id,
            deck_id: self.deck_id,
            front: self.front.clone(),
            back: self.back.clone(),
            created_at: self.created_at,
            repetition: RepetitionState {
                interval: self.interval_days.max(0) as u32,
                repetitions: self.repetitions.max(0) as u32,
                ease_factor: self.ease_factor,
                last_review: self.last_review,
                next_review: self.next_review,
            },
        }
    }
}

// === Deck API Types ===

#[derive(Debug, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardListResponse {
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteDeckResponse {
    pub deck_id: Uuid,
    pub cards_deleted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DuePreviewResponse {
    pub deck_id: Uuid,
    pub total: usize,
    pub due: usize,
    pub card_ids: Vec<Uuid>,
}

// === Session API Types ===

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub deck_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Raw grade; validated against 0..=4 by the engine.
    pub quality: i64,
}

/// Card as shown during a session. The back is only sent once revealed.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCardView {
    pub id: Uuid,
    pub front: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    /// Missing when nothing was due and no session was kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub deck_id: Option<Uuid>,
    pub phase: SessionPhase,
    pub position: usize,
    pub length: usize,
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<SessionCardView>,
    /// Interval each grade would give the revealed card.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intervals: Vec<IntervalPreview>,
    pub stats: SessionStats,
    pub elapsed_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub outcome: CommandOutcome,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct AbortResponse {
    pub session_id: Uuid,
    pub aborted: bool,
    /// Missing when an answer for this session is still being saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}
