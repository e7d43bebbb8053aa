//! Card store seam and an in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::types::{CardId, Deck, DeckId, Flashcard, RepetitionState};

/// Persistence the review engine needs from its host.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Current snapshot of every card in a deck.
    async fn list_cards(&self, deck_id: DeckId) -> Result<Vec<Flashcard>, StoreError>;

    /// Save one card's state after an answer. Must be safe to repeat.
    async fn update_repetition_state(
        &self,
        card_id: CardId,
        state: &RepetitionState,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    decks: HashMap<DeckId, Deck>,
    cards: Vec<Flashcard>,
}

/// Card store kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCardStore {
    inner: RwLock<Inner>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_deck(&self, deck: Deck) {
        self.inner.write().await.decks.insert(deck.id, deck);
    }

    pub async fn deck(&self, deck_id: DeckId) -> Option<Deck> {
        self.inner.read().await.decks.get(&deck_id).cloned()
    }

    /// Add a card to an existing deck.
    pub async fn insert_card(&self, card: Flashcard) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.decks.contains_key(&card.deck_id) {
            return Err(StoreError::DeckNotFound(card.deck_id));
        }
        inner.cards.push(card);
        Ok(())
    }

    pub async fn card(&self, card_id: CardId) -> Option<Flashcard> {
        self.inner
            .read()
            .await
            .cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
    }

    /// Remove a deck and all of its cards. Returns the number of cards removed.
    pub async fn delete_deck(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.decks.remove(&deck_id).is_none() {
            return Err(StoreError::DeckNotFound(deck_id));
        }
        let before = inner.cards.len();
        inner.cards.retain(|c| c.deck_id != deck_id);
        Ok(before - inner.cards.len())
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn list_cards(&self, deck_id: DeckId) -> Result<Vec<Flashcard>, StoreError> {
        let inner = self.inner.read().await;
        if !inner.decks.contains_key(&deck_id) {
            return Err(StoreError::DeckNotFound(deck_id));
        }
        Ok(inner
            .cards
            .iter()
            .filter(|c| c.deck_id == deck_id)
            .cloned()
            .collect())
    }

    async fn update_repetition_state(
        &self,
        card_id: CardId,
        state: &RepetitionState,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let card = inner
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or(StoreError::CardNotFound(card_id))?;
        card.repetition = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    #[tokio::test]
    async fn lists_only_cards_of_deck() {
        let store = InMemoryCardStore::new();
        let a = Deck::new("a", "");
        let b = Deck::new("b", "");
        store.insert_deck(a.clone()).await;
        store.insert_deck(b.clone()).await;
        store.insert_card(Flashcard::new(a.id, "1", "1", Utc::now())).await.unwrap();
        store.insert_card(Flashcard::new(b.id, "2", "2", Utc::now())).await.unwrap();

        let cards = store.list_cards(a.id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].front, "1");
    }

    #[tokio::test]
    async fn card_requires_existing_deck() {
        let store = InMemoryCardStore::new();
        let err = store
            .insert_card(Flashcard::new(Uuid::new_v4(), "q", "a", Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DeckNotFound(_)));
    }

    #[tokio::test]
    async fn deleting_deck_removes_its_cards() {
        let store = InMemoryCardStore::new();
        let deck = Deck::new("d", "");
        store.insert_deck(deck.clone()).await;
        let card = Flashcard::new(deck.id, "q", "a", Utc::now());
        store.insert_card(card.clone()).await.unwrap();
        store.insert_card(Flashcard::new(deck.id, "q2", "a2", Utc::now())).await.unwrap();

        assert_eq!(store.delete_deck(deck.id).await.unwrap(), 2);
        assert!(store.card(card.id).await.is_none());
        assert!(store.list_cards(deck.id).await.is_err());
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let store = InMemoryCardStore::new();
        let deck = Deck::new("d", "");
        store.insert_deck(deck.clone()).await;
        let card = Flashcard::new(deck.id, "q", "a", Utc::now());
        store.insert_card(card.clone()).await.unwrap();

        let mut state = card.repetition.clone();
        state.repetitions = 1;
        state.interval = 1;
        store.update_repetition_state(card.id, &state).await.unwrap();
        store.update_repetition_state(card.id, &state).await.unwrap();
        assert_eq!(store.card(card.id).await.unwrap().repetition, state);
    }

    #[tokio::test]
    async fn update_unknown_card_fails() {
        let store = InMemoryCardStore::new();
        let state = RepetitionState::new(Utc::now());
        let err = store
            .update_repetition_state(Uuid::new_v4(), &state)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CardNotFound(_)));
    }
}
