use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tmleague::league::{Corporation, Match, MatchId, Player, Score, ScoreEntry};
use tmleague::store::CommittedMatch;
use tmleague::{EntityStore, InMemoryEntityStore, LeagueError};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Wraps an in-memory store and can be told to fail or stall commits
pub struct FlakyStore {
    inner: InMemoryEntityStore,
    fail_commits: AtomicBool,
    commit_delay: Option<Duration>,
    commit_attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: InMemoryEntityStore) -> Self {
        Self {
            inner,
            fail_commits: AtomicBool::new(false),
            commit_delay: None,
            commit_attempts: AtomicUsize::new(0),
        }
    }

    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn commit_attempts(&self) -> usize {
        self.commit_attempts.load(Ordering::SeqCst)
    }

    pub fn match_count(&self) -> usize {
        self.inner.match_count()
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn fetch_players(&self) -> Result<Vec<Player>, LeagueError> {
        self.inner.fetch_players().await
    }

    async fn fetch_corporations(&self) -> Result<Vec<Corporation>, LeagueError> {
        self.inner.fetch_corporations().await
    }

    async fn fetch_matches(&self) -> Result<Vec<Match>, LeagueError> {
        self.inner.fetch_matches().await
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Match, LeagueError> {
        self.inner.fetch_match(id).await
    }

    async fn fetch_scores_by_match(&self, ids: &[MatchId]) -> Result<Vec<Score>, LeagueError> {
        self.inner.fetch_scores_by_match(ids).await
    }

    async fn insert_match_with_scores(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<CommittedMatch, LeagueError> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.commit_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(LeagueError::AdapterUnavailable("connection refused".into()));
        }
        self.inner.insert_match_with_scores(occurred_on, entries).await
    }
}

/// Lets tests keep a handle on a store after handing it to the ledger
#[derive(Clone)]
pub struct SharedStore<S>(pub Arc<S>);

#[async_trait]
impl<S: EntityStore> EntityStore for SharedStore<S> {
    async fn fetch_players(&self) -> Result<Vec<Player>, LeagueError> {
        self.0.fetch_players().await
    }

    async fn fetch_corporations(&self) -> Result<Vec<Corporation>, LeagueError> {
        self.0.fetch_corporations().await
    }

    async fn fetch_matches(&self) -> Result<Vec<Match>, LeagueError> {
        self.0.fetch_matches().await
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Match, LeagueError> {
        self.0.fetch_match(id).await
    }

    async fn fetch_scores_by_match(&self, ids: &[MatchId]) -> Result<Vec<Score>, LeagueError> {
        self.0.fetch_scores_by_match(ids).await
    }

    async fn insert_match_with_scores(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<CommittedMatch, LeagueError> {
        self.0.insert_match_with_scores(occurred_on, entries).await
    }
}
