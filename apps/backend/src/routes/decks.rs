//! Deck endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use review_core::{Deck, Flashcard};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<Deck>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("deck name must not be empty".to_string()));
    }

    let deck = Deck::new(name, payload.description);
    state.decks.create_deck(&deck).await?;

    tracing::info!(deck_id = %deck.id, "Created deck");
    Ok((StatusCode::CREATED, Json(deck)))
}

/// DELETE /api/decks/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeleteDeckResponse>> {
    let cards_deleted = state.decks.delete_deck(deck_id).await?;

    tracing::info!(deck_id = %deck_id, cards_deleted, "Deleted deck");
    Ok(Json(DeleteDeckResponse {
        deck_id,
        cards_deleted,
    }))
}

/// GET /api/decks/:id/cards
pub async fn list_cards(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<CardListResponse>> {
    let cards = state.store.list_cards(deck_id).await?;
    Ok(Json(CardListResponse { cards }))
}

/// POST /api/decks/:id/cards
pub async fn add_card(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<Flashcard>)> {
    if payload.front.trim().is_empty() || payload.back.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "card front and back must not be empty".to_string(),
        ));
    }

    let card = Flashcard::new(deck_id, payload.front, payload.back, Utc::now());
    state.decks.add_card(&card).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// GET /api/decks/:id/due
///
/// Read-only count of the cards a new session could draw from, in stored
/// order and before any session limit.
pub async fn due(
    State(state): State<AppState>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DuePreviewResponse>> {
    let cards = state.store.list_cards(deck_id).await?;
    let now = Utc::now();
    let due: Vec<&Flashcard> = cards
        .iter()
        .filter(|card| state.selector.is_due(card, &now))
        .collect();

    Ok(Json(DuePreviewResponse {
        deck_id,
        total: cards.len(),
        due: due.len(),
        card_ids: due.iter().map(|c| c.id).collect(),
    }))
}
