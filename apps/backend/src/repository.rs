//! Deck management on top of a card store.

use async_trait::async_trait;
use review_core::{Deck, DeckId, Flashcard, InMemoryCardStore, StoreError};

/// Minimal deck and card management the HTTP API needs.
#[async_trait]
pub trait DeckRepository: Send + Sync {
    async fn create_deck(&self, deck: &Deck) -> Result<(), StoreError>;

    async fn get_deck(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError>;

    async fn add_card(&self, card: &Flashcard) -> Result<(), StoreError>;

    /// Delete a deck together with all of its cards, atomically.
    async fn delete_deck(&self, deck_id: DeckId) -> Result<usize, StoreError>;
}

#[async_trait]
impl DeckRepository for InMemoryCardStore {
    async fn create_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        self.insert_deck(deck.clone()).await;
        Ok(())
    }

    async fn get_deck(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError> {
        Ok(self.deck(deck_id).await)
    }

    async fn add_card(&self, card: &Flashcard) -> Result<(), StoreError> {
        self.insert_card(card.clone()).await
    }

    async fn delete_deck(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        InMemoryCardStore::delete_deck(self, deck_id).await
    }
}
