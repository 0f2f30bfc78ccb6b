use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::{CommittedMatch, EntityStore};
use crate::league::{
    Corporation, CorporationId, LeagueError, Match, MatchId, Player, PlayerId, Score, ScoreEntry,
    MAX_STORED_VALUE,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// People and corporations to preload into an in-memory store
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub corporations: Vec<Corporation>,
}

#[derive(Debug, Default)]
struct Tables {
    players: BTreeMap<PlayerId, Player>,
    corporations: BTreeMap<CorporationId, Corporation>,
    matches: BTreeMap<MatchId, Match>,
    scores: Vec<Score>,
    last_match_id: i64,
}

/// In-memory implementation of EntityStore for development and testing
///
/// Data lives only as long as the process. Match ids are handed out from a
/// monotonic counter, the way a serial column would.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    tables: Mutex<Tables>,
}

impl InMemoryEntityStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-populated people and corporations
    pub fn with_entities(players: Vec<Player>, corporations: Vec<Corporation>) -> Self {
        let tables = Tables {
            players: players.into_iter().map(|p| (p.id, p)).collect(),
            corporations: corporations.into_iter().map(|c| (c.id, c)).collect(),
            ..Tables::default()
        };

        Self {
            tables: Mutex::new(tables),
        }
    }

    pub fn from_seed(seed: SeedData) -> Self {
        Self::with_entities(seed.players, seed.corporations)
    }

    /// Loads people and corporations from a JSON file shaped like `SeedData`
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&raw)?;
        Ok(Self::from_seed(seed))
    }

    /// Returns the number of committed matches (useful for debugging)
    pub fn match_count(&self) -> usize {
        self.tables().map(|t| t.matches.len()).unwrap_or_default()
    }

    /// Returns the number of committed score rows
    pub fn score_count(&self) -> usize {
        self.tables().map(|t| t.scores.len()).unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, LeagueError> {
        self.tables
            .lock()
            .map_err(|_| LeagueError::AdapterUnavailable("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    #[instrument(skip(self))]
    async fn fetch_players(&self) -> Result<Vec<Player>, LeagueError> {
        let tables = self.tables()?;
        debug!(count = tables.players.len(), "Fetched players from memory");
        Ok(tables.players.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn fetch_corporations(&self) -> Result<Vec<Corporation>, LeagueError> {
        let tables = self.tables()?;
        debug!(count = tables.corporations.len(), "Fetched corporations from memory");
        Ok(tables.corporations.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn fetch_matches(&self) -> Result<Vec<Match>, LeagueError> {
        let tables = self.tables()?;
        Ok(tables.matches.values().copied().collect())
    }

    #[instrument(skip(self))]
    async fn fetch_match(&self, id: MatchId) -> Result<Match, LeagueError> {
        let tables = self.tables()?;
        tables.matches.get(&id).copied().ok_or_else(|| {
            debug!(match_id = %id, "Match not found in memory");
            LeagueError::NotFound(format!("match {id}"))
        })
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn fetch_scores_by_match(&self, ids: &[MatchId]) -> Result<Vec<Score>, LeagueError> {
        let wanted: HashSet<MatchId> = ids.iter().copied().collect();
        let tables = self.tables()?;
        Ok(tables
            .scores
            .iter()
            .filter(|score| wanted.contains(&score.match_id))
            .copied()
            .collect())
    }

    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    async fn insert_match_with_scores(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<CommittedMatch, LeagueError> {
        let mut tables = self.tables()?;

        // Checked before anything is written so a rejected insert leaves no trace
        for entry in entries {
            if !tables.players.contains_key(&entry.player_id) {
                warn!(player_id = %entry.player_id, "Rejecting score for unknown player");
                return Err(LeagueError::UnknownReference(format!(
                    "player {}",
                    entry.player_id
                )));
            }
            if !tables.corporations.contains_key(&entry.corporation_id) {
                warn!(corporation_id = %entry.corporation_id, "Rejecting score for unknown corporation");
                return Err(LeagueError::UnknownReference(format!(
                    "corporation {}",
                    entry.corporation_id
                )));
            }
            if entry.points > MAX_STORED_VALUE || entry.ranking > MAX_STORED_VALUE {
                return Err(LeagueError::InvalidScore(format!(
                    "score for player {} exceeds {MAX_STORED_VALUE}",
                    entry.player_id
                )));
            }
        }

        tables.last_match_id += 1;
        let league_match = Match {
            id: MatchId(tables.last_match_id),
            occurred_on,
        };
        tables.matches.insert(league_match.id, league_match);
        tables
            .scores
            .extend(entries.iter().map(|entry| entry.into_score(league_match.id)));

        debug!(match_id = %league_match.id, "Match committed in memory");
        Ok(CommittedMatch {
            league_match,
            scores_committed: entries.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> InMemoryEntityStore {
        InMemoryEntityStore::with_entities(
            vec![
                Player {
                    id: PlayerId(1),
                    name: "Ada".into(),
                },
                Player {
                    id: PlayerId(2),
                    name: "Brook".into(),
                },
            ],
            vec![Corporation {
                id: CorporationId(10),
                name: "Tharsis Republic".into(),
                pack_id: None,
                pack_name: None,
            }],
        )
    }

    fn entry(player: i64, ranking: u32) -> ScoreEntry {
        ScoreEntry {
            player_id: PlayerId(player),
            corporation_id: CorporationId(10),
            points: 40,
            ranking,
            cubes_remaining: 0,
        }
    }

    #[tokio::test]
    async fn assigns_increasing_match_ids() {
        let store = store();

        let first = store
            .insert_match_with_scores(date(2025, 3, 1), &[entry(1, 1)])
            .await
            .unwrap();
        let second = store
            .insert_match_with_scores(date(2025, 3, 2), &[entry(2, 1)])
            .await
            .unwrap();

        assert!(second.league_match.id > first.league_match.id);
        assert_eq!(first.scores_committed, 1);
        assert_eq!(store.match_count(), 2);
    }

    #[tokio::test]
    async fn fetches_scores_only_for_requested_matches() {
        let store = store();
        let a = store
            .insert_match_with_scores(date(2025, 3, 1), &[entry(1, 1), entry(2, 2)])
            .await
            .unwrap();
        store
            .insert_match_with_scores(date(2025, 3, 2), &[entry(2, 1)])
            .await
            .unwrap();

        let scores = store
            .fetch_scores_by_match(&[a.league_match.id])
            .await
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.match_id == a.league_match.id));
    }

    #[tokio::test]
    async fn unknown_reference_writes_nothing() {
        let store = store();

        let result = store
            .insert_match_with_scores(date(2025, 3, 1), &[entry(1, 1), entry(99, 2)])
            .await;

        assert!(matches!(result, Err(LeagueError::UnknownReference(_))));
        assert_eq!(store.match_count(), 0);
        assert_eq!(store.score_count(), 0);
    }

    #[tokio::test]
    async fn rejects_points_wider_than_the_stored_column() {
        let store = store();
        let mut oversized = entry(1, 1);
        oversized.points = 3_000_000_000;

        let result = store
            .insert_match_with_scores(date(2025, 3, 1), &[oversized])
            .await;

        assert!(matches!(result, Err(LeagueError::InvalidScore(_))));
        assert_eq!(store.match_count(), 0);
    }

    #[tokio::test]
    async fn fetch_match_reports_not_found() {
        let store = store();
        let result = store.fetch_match(MatchId(5)).await;
        assert!(matches!(result, Err(LeagueError::NotFound(_))));
    }

    #[test]
    fn seed_parses_players_and_corporations() {
        let seed: SeedData = serde_json::from_str(
            r#"{
                "players": [{"id": 1, "name": "Ada"}],
                "corporations": [{"id": 4, "name": "Helion", "pack_id": 1}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.players.len(), 1);
        assert_eq!(seed.corporations[0].pack_id, Some(1));
    }
}
