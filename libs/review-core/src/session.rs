//! Review session state machine.
//!
//! A session walks a fixed snapshot of cards. Each card is first presented
//! front side up, flipped to reveal the answer, then graded. Answering is
//! split into [`ReviewSession::prepare_answer`] and
//! [`ReviewSession::commit_answer`] so the caller can persist the new state
//! in between; nothing changes until the commit.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::algorithm::Sm2;
use crate::error::{ReviewError, Result};
use crate::types::{CardId, Flashcard, Outcome, Quality, RepetitionState};

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Front of the current card is shown.
    Presenting,
    /// Back of the current card is shown and it can be graded.
    Revealed,
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Presenting => "presenting",
            Self::Revealed => "revealed",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Running answer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub error: u32,
    pub hard: u32,
    pub medium: u32,
    pub good: u32,
    pub easy: u32,
    pub total: u32,
}

impl SessionStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Error => self.error += 1,
            Outcome::Hard => self.hard += 1,
            Outcome::Medium => self.medium += 1,
            Outcome::Good => self.good += 1,
            Outcome::Easy => self.easy += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Error => self.error,
            Outcome::Hard => self.hard,
            Outcome::Medium => self.medium,
            Outcome::Good => self.good,
            Outcome::Easy => self.easy,
        }
    }

    /// Share of answers graded good or easy; 0 when nothing was answered.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.good + self.easy) / f64::from(self.total)
        }
    }
}

/// Report produced once a session is over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total: u32,
    pub error: u32,
    pub hard: u32,
    pub medium: u32,
    pub good: u32,
    pub easy: u32,
    pub success_rate: f64,
    pub elapsed_secs: i64,
    /// Cards in the snapshot that were never answered.
    pub skipped: usize,
    pub aborted: bool,
}

/// An answer whose new state has been computed but not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAnswer {
    pub card_id: CardId,
    pub quality: Quality,
    pub previous: RepetitionState,
    pub next: RepetitionState,
    cursor: usize,
}

/// In-memory state of one pass through a set of due cards.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    cards: Vec<Flashcard>,
    cursor: usize,
    flipped: bool,
    completed: bool,
    aborted: bool,
    stats: SessionStats,
    started_at: DateTime<Utc>,
    scheduler: Sm2,
}

impl ReviewSession {
    /// Start a session over `cards` in the given order.
    pub fn new(cards: Vec<Flashcard>, now: DateTime<Utc>) -> Self {
        Self::with_scheduler(cards, now, Sm2::default())
    }

    pub fn with_scheduler(cards: Vec<Flashcard>, now: DateTime<Utc>, scheduler: Sm2) -> Self {
        let completed = cards.is_empty();
        Self {
            cards,
            cursor: 0,
            flipped: false,
            completed,
            aborted: false,
            stats: SessionStats::default(),
            started_at: now,
            scheduler,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.completed {
            SessionPhase::Completed
        } else if self.flipped {
            SessionPhase::Revealed
        } else {
            SessionPhase::Presenting
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn was_aborted(&self) -> bool {
        self.aborted
    }

    /// Card being shown, if the session is still running.
    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.completed {
            None
        } else {
            self.cards.get(self.cursor)
        }
    }

    /// 1-based position of the current card and the session length.
    pub fn position(&self) -> (usize, usize) {
        let shown = if self.completed {
            self.stats.total as usize
        } else {
            self.cursor + 1
        };
        (shown, self.cards.len())
    }

    /// Cards not yet answered, the current one included.
    pub fn remaining(&self) -> usize {
        if self.completed {
            0
        } else {
            self.cards.len() - self.cursor
        }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }

    /// Turn the current card over.
    pub fn flip(&mut self) -> Result<()> {
        self.ensure_running("flip")?;
        self.flipped = !self.flipped;
        Ok(())
    }

    /// Compute the current card's next state without applying it.
    pub fn prepare_answer(&self, quality: Quality, now: DateTime<Utc>) -> Result<ScheduledAnswer> {
        if self.phase() != SessionPhase::Revealed {
            return Err(self.illegal("answer"));
        }
        let card = &self.cards[self.cursor];
        let next = self.scheduler.schedule(&card.repetition, quality, now);
        Ok(ScheduledAnswer {
            card_id: card.id,
            quality,
            previous: card.repetition.clone(),
            next,
            cursor: self.cursor,
        })
    }

    /// Apply a prepared answer and move on to the next card.
    ///
    /// Fails if the session moved since the answer was prepared.
    pub fn commit_answer(&mut self, answer: ScheduledAnswer) -> Result<()> {
        if self.phase() != SessionPhase::Revealed || answer.cursor != self.cursor {
            return Err(self.illegal("commit answer"));
        }

        self.stats.record(answer.quality.outcome());
        self.cards[self.cursor].repetition = answer.next;

        if self.cursor + 1 >= self.cards.len() {
            self.completed = true;
        } else {
            self.cursor += 1;
            self.flipped = false;
        }
        Ok(())
    }

    /// End the session early. Ending a finished session does nothing.
    pub fn abort(&mut self) {
        if !self.completed {
            self.completed = true;
            self.aborted = true;
        }
    }

    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let stats = self.stats;
        SessionSummary {
            total: stats.total,
            error: stats.error,
            hard: stats.hard,
            medium: stats.medium,
            good: stats.good,
            easy: stats.easy,
            success_rate: stats.success_rate(),
            elapsed_secs: self.elapsed(now).num_seconds(),
            skipped: self.cards.len() - stats.total as usize,
            aborted: self.aborted,
        }
    }

    fn ensure_running(&self, action: &'static str) -> Result<()> {
        if self.completed {
            Err(self.illegal(action))
        } else {
            Ok(())
        }
    }

    fn illegal(&self, action: &'static str) -> ReviewError {
        ReviewError::IllegalTransition {
            action,
            phase: self.phase(),
        }
    }
}
