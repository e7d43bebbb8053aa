//! PostgreSQL card store

use async_trait::async_trait;
use review_core::{CardId, CardStore, Deck, DeckId, Flashcard, RepetitionState, StoreError};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{ApiError, Result};
use crate::models::{DbCard, DbDeck};
use crate::repository::DeckRepository;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Scheduling counters are stored as INTEGER; refuse to write a value that
/// would not read back unchanged.
fn column(value: u32, name: &str) -> std::result::Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::Backend(format!("{name} {value} does not fit an INTEGER column")))
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CardStore for Database {
    async fn list_cards(&self, deck_id: DeckId) -> std::result::Result<Vec<Flashcard>, StoreError> {
        if self.get_deck(deck_id).await?.is_none() {
            return Err(StoreError::DeckNotFound(deck_id));
        }

        let cards = sqlx::query_as::<_, DbCard>(
            r#"
            SELECT id, deck_id, front, back, created_at,
                   interval_days, repetitions, ease_factor, last_review, next_review
            FROM cards
            WHERE deck_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(cards.iter().map(DbCard::to_flashcard).collect())
    }

    async fn update_repetition_state(
        &self,
        card_id: CardId,
        state: &RepetitionState,
    ) -> std::result::Result<(), StoreError> {
        let interval = column(state.interval, "interval")?;
        let repetitions = column(state.repetitions, "repetitions")?;

        let result = sqlx::query(
            r#"
            UPDATE cards
            SET interval_days = $2,
                repetitions = $3,
                ease_factor = $4,
                last_review = $5,
                next_review = $6
            WHERE id = $1
            "#,
        )
        .bind(card_id)
        .bind(interval)
        .bind(repetitions)
        .bind(state.ease_factor)
        .bind(state.last_review)
        .bind(state.next_review)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CardNotFound(card_id));
        }
        Ok(())
    }
}

#[async_trait]
impl DeckRepository for Database {
    async fn create_deck(&self, deck: &Deck) -> std::result::Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO decks (id, name, description)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(deck.id)
        .bind(&deck.name)
        .bind(&deck.description)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn get_deck(&self, deck_id: DeckId) -> std::result::Result<Option<Deck>, StoreError> {
        let deck = sqlx::query_as::<_, DbDeck>(
            r#"
            SELECT id, name, description
            FROM decks
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(deck.map(Deck::from))
    }

    async fn add_card(&self, card: &Flashcard) -> std::result::Result<(), StoreError> {
        if self.get_deck(card.deck_id).await?.is_none() {
            return Err(StoreError::DeckNotFound(card.deck_id));
        }

        let state = &card.repetition;
        let interval = column(state.interval, "interval")?;
        let repetitions = column(state.repetitions, "repetitions")?;

        sqlx::query(
            r#"
            INSERT INTO cards (id, deck_id, front, back, created_at,
                               interval_days, repetitions, ease_factor, last_review, next_review)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(card.id)
        .bind(card.deck_id)
        .bind(&card.front)
        .bind(&card.back)
        .bind(card.created_at)
        .bind(interval)
        .bind(repetitions)
        .bind(state.ease_factor)
        .bind(state.last_review)
        .bind(state.next_review)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn delete_deck(&self, deck_id: DeckId) -> std::result::Result<usize, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let cards = sqlx::query("DELETE FROM cards WHERE deck_id = $1")
            .bind(deck_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        let deck = sqlx::query("DELETE FROM decks WHERE id = $1")
            .bind(deck_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        if deck.rows_affected() == 0 {
            tx.rollback().await.map_err(backend)?;
            return Err(StoreError::DeckNotFound(deck_id));
        }

        tx.commit().await.map_err(backend)?;
        Ok(cards.rows_affected() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_accepts_integer_range() {
        assert_eq!(column(0, "interval").unwrap(), 0);
        assert_eq!(column(i32::MAX as u32, "interval").unwrap(), i32::MAX);
    }

    #[test]
    fn test_column_rejects_values_past_integer_range() {
        let err = column(u32::MAX, "repetitions").unwrap_err();
        assert!(matches!(err, StoreError::Backend(ref message) if message.contains("repetitions")));
    }
}
