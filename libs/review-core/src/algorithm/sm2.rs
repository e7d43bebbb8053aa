//! SM-2 style interval recurrence.
//!
//! Grades below 3 fail and restart the card at a one day interval. Passing
//! grades grow the interval 1 → 6 → `interval * ease_factor`.
//!
//! The ease factor update still uses the classic `5 - q` term although the
//! highest accepted grade is 4. A perfect answer therefore leaves the ease
//! factor unchanged and grade 2 counts as a failure. This matches the
//! behaviour existing schedules were built with; changing it needs product
//! sign-off.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::types::{Quality, RepetitionState};

/// Default interval cap, roughly one hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Recurrence parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after a failure and after the first passing answer.
    pub first_interval: u32,
    pub second_interval: u32,
    /// Upper bound for any scheduled interval, in days.
    pub max_interval: u32,
    /// Lowest grade counted as a pass.
    pub pass_threshold: u8,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            first_interval: 1,
            second_interval: 6,
            max_interval: MAX_INTERVAL_DAYS,
            pass_threshold: 3,
        }
    }
}

/// Interval a grade would produce, for labelling answer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntervalPreview {
    pub quality: Quality,
    pub interval: u32,
}

impl Sm2 {
    /// State of a card that has never been reviewed.
    pub fn initial_state(&self, now: DateTime<Utc>) -> RepetitionState {
        RepetitionState {
            ease_factor: self.initial_ease,
            ..RepetitionState::new(now)
        }
    }

    /// Compute the state after answering with `quality` at `now`.
    pub fn schedule(
        &self,
        prior: &RepetitionState,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> RepetitionState {
        let q = quality.value();

        let (repetitions, interval) = if q < self.pass_threshold {
            (0, self.first_interval)
        } else {
            let repetitions = prior.repetitions.saturating_add(1);
            let interval = match repetitions {
                1 => self.first_interval,
                2 => self.second_interval,
                // `as` saturates, so huge priors land on the cap below.
                _ => (f64::from(prior.interval) * prior.ease_factor).round() as u32,
            };
            (repetitions, interval)
        };
        let interval = interval.min(self.max_interval);

        RepetitionState {
            interval,
            repetitions,
            ease_factor: self.next_ease(prior.ease_factor, q),
            last_review: Some(now),
            next_review: now
                .checked_add_signed(Duration::days(i64::from(interval)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Intervals every grade would produce from `prior`.
    pub fn preview(&self, prior: &RepetitionState, now: DateTime<Utc>) -> Vec<IntervalPreview> {
        Quality::all()
            .map(|quality| IntervalPreview {
                quality,
                interval: self.schedule(prior, quality, now).interval,
            })
            .collect()
    }

    fn next_ease(&self, ease_factor: f64, q: u8) -> f64 {
        let miss = f64::from(5 - q);
        let delta = 0.1 - miss * (0.08 + miss * 0.02);
        (ease_factor + delta).max(self.minimum_ease)
    }
}

/// Apply the default recurrence.
pub fn next_state(prior: &RepetitionState, quality: Quality, now: DateTime<Utc>) -> RepetitionState {
    Sm2::default().schedule(prior, quality, now)
}

/// Apply the default recurrence to an unvalidated grade.
pub fn next_state_raw(
    prior: &RepetitionState,
    quality: i64,
    now: DateTime<Utc>,
) -> Result<RepetitionState> {
    let quality = Quality::new(quality)?;
    Ok(next_state(prior, quality, now))
}
