//! Interval scheduling.
//!
//! Only the SM-2 style two-branch recurrence is carried; it works on the
//! `0..=4` quality scale used throughout the engine.

pub mod sm2;

pub use sm2::{next_state, next_state_raw, IntervalPreview, Sm2, MAX_INTERVAL_DAYS};
