//! Due-card selection.
//!
//! A card is due when it has never been passed, or when its next review
//! falls on or before the current study day. Only dates are compared; the
//! time of day is ignored.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::Flashcard;

/// Study date of `now`.
///
/// Before `daily_reset_hour` the previous calendar date is still the current
/// study day. With a reset hour of 0 this is the plain calendar date.
pub fn study_day<Tz: TimeZone>(now: &DateTime<Tz>, daily_reset_hour: u32) -> NaiveDate {
    let local = now.naive_local();
    if local.hour() < daily_reset_hour {
        (local - Duration::days(1)).date()
    } else {
        local.date()
    }
}

/// Due-set selection options.
#[derive(Debug, Clone, Default)]
pub struct DueSelector {
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    /// Maximum number of cards returned, applied after shuffling.
    pub limit: Option<usize>,
}

impl DueSelector {
    pub fn new(daily_reset_hour: u32, limit: Option<usize>) -> Self {
        Self {
            daily_reset_hour,
            limit,
        }
    }

    /// Whether `card` belongs in a session started at `now`.
    ///
    /// The card's next review date is read in the time zone of `now`.
    pub fn is_due<Tz: TimeZone>(&self, card: &Flashcard, now: &DateTime<Tz>) -> bool {
        if card.repetition.repetitions == 0 {
            return true;
        }
        let next_review = card.repetition.next_review.with_timezone(&now.timezone());
        study_day(&next_review, self.daily_reset_hour) <= study_day(now, self.daily_reset_hour)
    }

    /// Due cards in random order.
    pub fn select<'a, Tz: TimeZone>(
        &self,
        cards: &'a [Flashcard],
        now: &DateTime<Tz>,
    ) -> Vec<&'a Flashcard> {
        self.select_with_rng(cards, now, &mut rand::thread_rng())
    }

    /// Due cards shuffled with the given RNG.
    pub fn select_with_rng<'a, Tz: TimeZone, R: Rng + ?Sized>(
        &self,
        cards: &'a [Flashcard],
        now: &DateTime<Tz>,
        rng: &mut R,
    ) -> Vec<&'a Flashcard> {
        let mut due: Vec<&Flashcard> = cards.iter().filter(|card| self.is_due(card, now)).collect();
        due.shuffle(rng);
        if let Some(limit) = self.limit {
            due.truncate(limit);
        }
        due
    }
}

/// Due cards for `now` with calendar-day boundaries and no limit.
pub fn select_due<'a, Tz: TimeZone>(cards: &'a [Flashcard], now: &DateTime<Tz>) -> Vec<&'a Flashcard> {
    DueSelector::default().select(cards, now)
}

/// Due cards shuffled with the given RNG.
pub fn select_due_with_rng<'a, Tz: TimeZone, R: Rng + ?Sized>(
    cards: &'a [Flashcard],
    now: &DateTime<Tz>,
    rng: &mut R,
) -> Vec<&'a Flashcard> {
    DueSelector::default().select_with_rng(cards, now, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 14, 30, 0).unwrap()
    }

    fn card(repetitions: u32, next_review: DateTime<Utc>) -> Flashcard {
        let mut card = Flashcard::new(Uuid::nil(), "front", "back", now());
        card.repetition.repetitions = repetitions;
        card.repetition.interval = if repetitions == 0 { 0 } else { 1 };
        card.repetition.next_review = next_review;
        card
    }

    fn ids(cards: &[&Flashcard]) -> HashSet<Uuid> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn new_cards_always_due() {
        let far_future = now() + Duration::days(365);
        let cards = vec![card(0, far_future)];
        assert_eq!(select_due(&cards, &now()).len(), 1);
    }

    #[test]
    fn future_reviews_not_due() {
        let tomorrow_midnight = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        let cards = vec![card(3, tomorrow_midnight), card(1, now() + Duration::days(10))];
        assert!(select_due(&cards, &now()).is_empty());
    }

    #[test]
    fn today_and_past_reviews_due() {
        let later_today = Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 0).unwrap();
        let cards = vec![
            card(2, later_today),
            card(2, now() - Duration::days(3)),
            card(5, now()),
        ];
        assert_eq!(select_due(&cards, &now()).len(), 3);
    }

    #[test]
    fn selects_only_due_cards_from_mixed_deck() {
        let cards = vec![
            card(0, now()),
            card(0, now()),
            card(1, now() + Duration::days(1)),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let due = select_due_with_rng(&cards, &now(), &mut rng);
        assert_eq!(due.len(), 2);
        assert_eq!(ids(&due), ids(&[&cards[0], &cards[1]]));
        assert!(!ids(&due).contains(&cards[2].id));
    }

    #[test]
    fn shuffle_keeps_every_due_card() {
        let cards: Vec<Flashcard> = (0..20).map(|_| card(0, now())).collect();
        let all: Vec<&Flashcard> = cards.iter().collect();
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let due = select_due_with_rng(&cards, &now(), &mut rng);
            assert_eq!(ids(&due), ids(&all));
        }
    }

    #[test]
    fn dates_compared_in_callers_time_zone() {
        // 22:30 UTC on the 10th is already the 11th at UTC+2.
        let next_review = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        let cards = vec![card(2, next_review)];

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = offset.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        assert!(select_due(&cards, &local_now).is_empty());

        let utc_now = local_now.with_timezone(&Utc);
        assert_eq!(select_due(&cards, &utc_now).len(), 1);
    }

    #[test]
    fn reset_hour_shifts_study_day() {
        let early = Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap();
        assert_eq!(study_day(&early, 0), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(study_day(&early, 4), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());

        let due_this_morning = Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap();
        let cards = vec![card(2, due_this_morning)];
        assert_eq!(DueSelector::new(0, None).select(&cards, &early).len(), 1);
        assert!(DueSelector::new(4, None).select(&cards, &early).is_empty());
    }

    #[test]
    fn limit_caps_selection() {
        let cards: Vec<Flashcard> = (0..10).map(|_| card(0, now())).collect();
        let selector = DueSelector::new(0, Some(4));
        assert_eq!(selector.select(&cards, &now()).len(), 4);
    }
}
