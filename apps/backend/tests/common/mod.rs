//! Common test utilities for API tests.
//!
//! Every test runs against the in-memory card store, so no database is
//! needed.

pub mod fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::Value;
use uuid::Uuid;

use review_backend::repository::DeckRepository;
use review_backend::{app, AppState};
use review_core::{
    CardId, CardStore, Deck, DeckId, DueSelector, Flashcard, InMemoryCardStore, RepetitionState,
    StoreError,
};

/// In-memory store whose state updates can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryCardStore,
    pub failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CardStore for FlakyStore {
    async fn list_cards(&self, deck_id: DeckId) -> Result<Vec<Flashcard>, StoreError> {
        self.inner.list_cards(deck_id).await
    }

    async fn update_repetition_state(
        &self,
        card_id: CardId,
        state: &RepetitionState,
    ) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection dropped".to_string()));
        }
        self.inner.update_repetition_state(card_id, state).await
    }
}

#[async_trait]
impl DeckRepository for FlakyStore {
    async fn create_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        self.inner.create_deck(deck).await
    }

    async fn get_deck(&self, deck_id: DeckId) -> Result<Option<Deck>, StoreError> {
        self.inner.get_deck(deck_id).await
    }

    async fn add_card(&self, card: &Flashcard) -> Result<(), StoreError> {
        self.inner.add_card(card).await
    }

    async fn delete_deck(&self, deck_id: DeckId) -> Result<usize, StoreError> {
        DeckRepository::delete_deck(&self.inner, deck_id).await
    }
}

/// Test context holding the server and the store behind it.
pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<FlakyStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_selector(DueSelector::default())
    }

    pub fn with_selector(selector: DueSelector) -> Self {
        let store = Arc::new(FlakyStore::default());
        let state = AppState::new(store.clone(), selector);
        let server = TestServer::new(app(state.clone())).expect("Failed to start test server");
        Self {
            server,
            store,
            state,
        }
    }

    /// Create a deck through the API and return its id.
    pub async fn create_deck(&self, name: &str) -> Uuid {
        let response = self
            .server
            .post("/api/decks")
            .json(&fixtures::deck_request(name))
            .await;
        let body: Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    /// Add `count` new cards to a deck through the API.
    pub async fn add_cards(&self, deck_id: Uuid, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let response = self
                .server
                .post(&format!("/api/decks/{deck_id}/cards"))
                .json(&fixtures::card_request(i))
                .await;
            let body: Value = response.json();
            ids.push(body["id"].as_str().unwrap().parse().unwrap());
        }
        ids
    }

    /// Insert a card directly into the store.
    pub async fn insert_card(&self, card: Flashcard) {
        self.store.inner.insert_card(card).await.unwrap();
    }

    /// Start a session for a deck and return the response body.
    pub async fn start_session(&self, deck_id: Uuid) -> Value {
        self.server
            .post("/api/sessions")
            .json(&serde_json::json!({ "deck_id": deck_id }))
            .await
            .json()
    }
}
