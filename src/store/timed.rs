use async_trait::async_trait;
use chrono::NaiveDate;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::{CommittedMatch, EntityStore};
use crate::league::{Corporation, LeagueError, Match, MatchId, Player, Score, ScoreEntry};

/// Puts a deadline on every call to the wrapped store.
///
/// An elapsed deadline surfaces as `AdapterUnavailable`. Nothing is retried here.
pub struct TimedEntityStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: EntityStore> TimedEntityStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn within<T, F>(&self, operation: &'static str, call: F) -> Result<T, LeagueError>
    where
        F: Future<Output = Result<T, LeagueError>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "Entity store call timed out");
                Err(LeagueError::AdapterUnavailable(format!(
                    "{operation} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<S: EntityStore> EntityStore for TimedEntityStore<S> {
    async fn fetch_players(&self) -> Result<Vec<Player>, LeagueError> {
        self.within("fetch_players", self.inner.fetch_players()).await
    }

    async fn fetch_corporations(&self) -> Result<Vec<Corporation>, LeagueError> {
        self.within("fetch_corporations", self.inner.fetch_corporations())
            .await
    }

    async fn fetch_matches(&self) -> Result<Vec<Match>, LeagueError> {
        self.within("fetch_matches", self.inner.fetch_matches()).await
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Match, LeagueError> {
        self.within("fetch_match", self.inner.fetch_match(id)).await
    }

    async fn fetch_scores_by_match(&self, ids: &[MatchId]) -> Result<Vec<Score>, LeagueError> {
        self.within("fetch_scores_by_match", self.inner.fetch_scores_by_match(ids))
            .await
    }

    async fn insert_match_with_scores(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<CommittedMatch, LeagueError> {
        self.within(
            "insert_match_with_scores",
            self.inner.insert_match_with_scores(occurred_on, entries),
        )
        .await
    }
}
