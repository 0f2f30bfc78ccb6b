use async_trait::async_trait;
use chrono::NaiveDate;

use crate::league::{Corporation, LeagueError, Match, MatchId, Player, Score, ScoreEntry};

mod memory;
mod postgres;
mod timed;

pub use memory::{InMemoryEntityStore, SeedData, SeedError};
pub use postgres::PostgresEntityStore;
pub use timed::TimedEntityStore;

/// Result of a successful match commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedMatch {
    pub league_match: Match,
    pub scores_committed: u64,
}

/// Durable storage for people, corporations, matches and scores.
///
/// Every read returns typed records; raw rows never leave an implementation.
/// Implementations report an unreachable or failing backend as
/// `LeagueError::AdapterUnavailable` and never retry on their own.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn fetch_players(&self) -> Result<Vec<Player>, LeagueError>;
    async fn fetch_corporations(&self) -> Result<Vec<Corporation>, LeagueError>;
    async fn fetch_matches(&self) -> Result<Vec<Match>, LeagueError>;
    async fn fetch_match(&self, id: MatchId) -> Result<Match, LeagueError>;
    async fn fetch_scores_by_match(&self, ids: &[MatchId]) -> Result<Vec<Score>, LeagueError>;

    /// Inserts the match row and all of its score rows as one transaction.
    /// Readers of the store see either both or neither.
    async fn insert_match_with_scores(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<CommittedMatch, LeagueError>;
}
