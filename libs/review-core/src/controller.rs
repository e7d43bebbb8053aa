//! Session controller.
//!
//! Binds learner commands to a [`ReviewSession`], persists every answer
//! through a [`CardStore`] before moving on, and reports a summary once the
//! session is over.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::due::DueSelector;
use crate::error::{Result, StoreError};
use crate::session::{ReviewSession, SessionPhase, SessionSummary};
use crate::store::CardStore;
use crate::types::{DeckId, Flashcard, Quality};

/// Command issued by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Flip,
    Rate(Quality),
    Abort,
}

/// Result of an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The next card is being presented.
    Advanced,
    Completed { summary: SessionSummary },
    /// The session was aborted while the answer was being saved.
    Aborted { summary: SessionSummary },
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandOutcome {
    Flipped { phase: SessionPhase },
    Answered { outcome: AnswerOutcome },
    /// A grade arrived before the card was flipped.
    Ignored,
    Aborted { summary: SessionSummary },
}

/// Aborts a session from outside the task driving it.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Drives one review session against a card store.
pub struct ReviewController {
    store: Arc<dyn CardStore>,
    deck_id: Option<DeckId>,
    session: ReviewSession,
    abort_tx: Arc<watch::Sender<bool>>,
    abort_rx: watch::Receiver<bool>,
}

impl std::fmt::Debug for ReviewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewController")
            .field("deck_id", &self.deck_id)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ReviewController {
    /// Load a deck from the store and start a session over its due cards.
    pub async fn start<Tz: TimeZone>(
        store: Arc<dyn CardStore>,
        deck_id: DeckId,
        selector: &DueSelector,
        now: &DateTime<Tz>,
    ) -> Result<Self> {
        let cards = store.list_cards(deck_id).await?;
        let mut controller = Self::from_cards(store, &cards, selector, now);
        controller.deck_id = Some(deck_id);
        info!(
            deck_id = %deck_id,
            deck_size = cards.len(),
            due = controller.session.cards().len(),
            "review session started"
        );
        Ok(controller)
    }

    /// Start a session over the due subset of `cards`.
    pub fn from_cards<Tz: TimeZone>(
        store: Arc<dyn CardStore>,
        cards: &[Flashcard],
        selector: &DueSelector,
        now: &DateTime<Tz>,
    ) -> Self {
        let due: Vec<Flashcard> = selector.select(cards, now).into_iter().cloned().collect();
        let session = ReviewSession::new(due, now.with_timezone(&Utc));
        let (abort_tx, abort_rx) = watch::channel(false);
        Self {
            store,
            deck_id: None,
            session,
            abort_tx: Arc::new(abort_tx),
            abort_rx,
        }
    }

    pub fn deck_id(&self) -> Option<DeckId> {
        self.deck_id
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.session.current_card()
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            tx: Arc::clone(&self.abort_tx),
        }
    }

    pub fn is_complete(&mut self) -> bool {
        self.sync_abort();
        self.session.is_complete()
    }

    /// Summary of a finished session.
    pub fn summary(&mut self, now: DateTime<Utc>) -> Option<SessionSummary> {
        if self.is_complete() {
            Some(self.session.summary(now))
        } else {
            None
        }
    }

    pub fn flip(&mut self) -> Result<SessionPhase> {
        self.sync_abort();
        self.session.flip()?;
        debug!(phase = %self.session.phase(), "card flipped");
        Ok(self.session.phase())
    }

    /// Grade the revealed card, save its new state and move on.
    ///
    /// A failed save leaves the session on the same revealed card with its
    /// counters untouched, so the answer can be retried.
    pub async fn answer(&mut self, quality: Quality, now: DateTime<Utc>) -> Result<AnswerOutcome> {
        self.sync_abort();
        let scheduled = self.session.prepare_answer(quality, now)?;

        let store = Arc::clone(&self.store);
        let card_id = scheduled.card_id;
        let next = scheduled.next.clone();
        // Runs to completion even if the session is aborted meanwhile.
        let write = tokio::spawn(async move { store.update_repetition_state(card_id, &next).await });

        let mut abort_rx = self.abort_rx.clone();
        tokio::select! {
            biased;
            () = aborted(&mut abort_rx) => {
                self.session.abort();
                info!(card_id = %card_id, "review session aborted during save");
                return Ok(AnswerOutcome::Aborted { summary: self.session.summary(now) });
            }
            joined = write => {
                let saved = joined.map_err(|e| StoreError::Backend(e.to_string()))?;
                if let Err(err) = saved {
                    warn!(card_id = %card_id, error = %err, "failed to save review");
                    return Err(err.into());
                }
            }
        }

        debug!(
            card_id = %card_id,
            quality = quality.value(),
            interval = scheduled.next.interval,
            repetitions = scheduled.next.repetitions,
            ease_factor = scheduled.next.ease_factor,
            "review saved"
        );
        self.session.commit_answer(scheduled)?;

        if self.session.is_complete() {
            let summary = self.session.summary(now);
            info!(
                total = summary.total,
                success_rate = summary.success_rate,
                "review session completed"
            );
            Ok(AnswerOutcome::Completed { summary })
        } else {
            Ok(AnswerOutcome::Advanced)
        }
    }

    /// End the session without saving anything further.
    pub fn abort(&mut self, now: DateTime<Utc>) -> SessionSummary {
        self.abort_tx.send_replace(true);
        if !self.session.is_complete() {
            info!(answered = self.session.stats().total, "review session aborted");
        }
        self.session.abort();
        self.session.summary(now)
    }

    /// Dispatch a learner command.
    ///
    /// Grades sent while the card is still face down are dropped.
    pub async fn handle(&mut self, command: ReviewCommand, now: DateTime<Utc>) -> Result<CommandOutcome> {
        self.sync_abort();
        match command {
            ReviewCommand::Flip => Ok(CommandOutcome::Flipped { phase: self.flip()? }),
            ReviewCommand::Rate(quality) => {
                if self.session.phase() == SessionPhase::Presenting {
                    debug!(quality = quality.value(), "grade ignored before flip");
                    return Ok(CommandOutcome::Ignored);
                }
                let outcome = self.answer(quality, now).await?;
                Ok(CommandOutcome::Answered { outcome })
            }
            ReviewCommand::Abort => Ok(CommandOutcome::Aborted {
                summary: self.abort(now),
            }),
        }
    }

    fn sync_abort(&mut self) {
        if *self.abort_rx.borrow() {
            self.session.abort();
        }
    }
}

async fn aborted(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|aborted| *aborted).await;
}
