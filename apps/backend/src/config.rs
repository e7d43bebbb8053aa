//! Service configuration read from the environment.

use anyhow::Context;
use review_core::DueSelector;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    /// Maximum number of cards per session.
    pub session_card_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: None,
            daily_reset_hour: 0,
            session_card_limit: None,
        }
    }
}

impl Config {
    /// Load from process environment (after `.env`, if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.parse().context("PORT must be a port number")?,
            None => defaults.port,
        };

        let daily_reset_hour = match lookup("DAILY_RESET_HOUR") {
            Some(value) => value
                .parse()
                .context("DAILY_RESET_HOUR must be an hour between 0 and 23")?,
            None => defaults.daily_reset_hour,
        };
        anyhow::ensure!(
            daily_reset_hour < 24,
            "DAILY_RESET_HOUR must be an hour between 0 and 23, got {daily_reset_hour}"
        );

        let session_card_limit = lookup("SESSION_CARD_LIMIT")
            .map(|value| value.parse().context("SESSION_CARD_LIMIT must be a number"))
            .transpose()?;

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            daily_reset_hour,
            session_card_limit,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Due-set selection settings for new sessions.
    pub fn selector(&self) -> DueSelector {
        DueSelector::new(self.daily_reset_hour, self.session_card_limit)
    }
}
