//! HTTP route handlers

pub mod decks;
pub mod study;
