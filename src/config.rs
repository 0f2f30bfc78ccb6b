use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::recorder::{RankingPolicy, RecorderConfig};

/// Runtime settings, read from the process environment
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueConfig {
    /// Most players a single match may record
    pub max_players_per_match: usize,
    /// Deadline for each entity store call
    pub adapter_timeout: Duration,
    pub ranking_policy: RankingPolicy,
    pub bind_addr: String,
    /// Postgres connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// JSON file with people and corporations for the in-memory store
    pub seed_path: Option<PathBuf>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            max_players_per_match: 5,
            adapter_timeout: Duration::from_millis(5000),
            ranking_policy: RankingPolicy::Supplied,
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            seed_path: None,
        }
    }
}

impl LeagueConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset keys keep their
    /// default; unparsable ones are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_players_per_match = parse_or(&lookup, "LEAGUE_MAX_PLAYERS", defaults.max_players_per_match)
            .max(1);
        let timeout_ms = parse_or(
            &lookup,
            "LEAGUE_ADAPTER_TIMEOUT_MS",
            defaults.adapter_timeout.as_millis() as u64,
        );

        Self {
            max_players_per_match,
            adapter_timeout: Duration::from_millis(timeout_ms),
            ranking_policy: parse_or(&lookup, "LEAGUE_RANKING_POLICY", defaults.ranking_policy),
            bind_addr: lookup("LEAGUE_BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            seed_path: lookup("LEAGUE_SEED_PATH")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn recorder(&self) -> RecorderConfig {
        RecorderConfig {
            max_entries: self.max_players_per_match,
            ranking_policy: self.ranking_policy,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparsable setting, using default");
            default
        }),
    }
}
