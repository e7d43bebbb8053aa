//! Test fixtures and factory functions for creating test data.

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use review_core::Flashcard;

/// Body for POST /api/decks.
pub fn deck_request(name: &str) -> Value {
    json!({ "name": name, "description": format!("{name} deck") })
}

/// Body for POST /api/decks/:id/cards.
pub fn card_request(i: usize) -> Value {
    json!({
        "front": format!("Question {}?", i + 1),
        "back": format!("Answer {}.", i + 1),
    })
}

/// A card that has been passed before and is next due in `days` days.
pub fn reviewed_card(deck_id: Uuid, days: i64) -> Flashcard {
    let now = Utc::now();
    let mut card = Flashcard::new(deck_id, "Reviewed?", "Yes.", now - Duration::days(30));
    card.repetition.repetitions = 3;
    card.repetition.interval = 15;
    card.repetition.last_review = Some(now - Duration::days(15));
    card.repetition.next_review = now + Duration::days(days);
    card
}
