use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::league::{
    validate_ranking, CorporationId, LeagueError, Match, MatchId, PlayerId, Score, ScoreEntry,
};
use crate::store::EntityStore;

mod snapshot;

pub use snapshot::LedgerSnapshot;

/// Authoritative, append-only collection of committed matches and their scores.
///
/// Readers work on an immutable `LedgerSnapshot`. A commit builds the next
/// snapshot and swaps it in only after the store accepted the match, so a
/// reader sees a match with all of its scores or not at all.
pub struct ScoreLedger {
    store: Arc<dyn EntityStore>,
    current: RwLock<Arc<LedgerSnapshot>>,
    writer: AsyncMutex<()>,
}

impl ScoreLedger {
    /// Creates a ledger with nothing loaded yet
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(LedgerSnapshot::default())),
            writer: AsyncMutex::new(()),
        }
    }

    /// Creates a ledger and hydrates it from the store
    pub async fn load(store: Arc<dyn EntityStore>) -> Result<Self, LeagueError> {
        let ledger = Self::new(store);
        ledger.reload().await?;
        Ok(ledger)
    }

    pub fn store(&self) -> Arc<dyn EntityStore> {
        Arc::clone(&self.store)
    }

    /// Replaces the whole in-memory view with what the store currently holds
    #[instrument(skip(self))]
    pub async fn reload(&self) -> Result<(), LeagueError> {
        let _guard = self.writer.lock().await;
        self.hydrate().await
    }

    /// Caller must hold `writer`
    async fn hydrate(&self) -> Result<(), LeagueError> {
        let (players, corporations, matches) = futures::try_join!(
            self.store.fetch_players(),
            self.store.fetch_corporations(),
            self.store.fetch_matches(),
        )?;

        let ids: Vec<MatchId> = matches.iter().map(|m| m.id).collect();
        let scores = self.store.fetch_scores_by_match(&ids).await?;

        let mut next = LedgerSnapshot::default();
        next.set_directory(players, corporations);

        let mut grouped: std::collections::BTreeMap<MatchId, Vec<Score>> = Default::default();
        for score in scores {
            grouped.entry(score.match_id).or_default().push(score);
        }

        for league_match in matches {
            let Some(match_scores) = grouped.remove(&league_match.id) else {
                warn!(match_id = %league_match.id, "Skipping stored match without scores");
                continue;
            };
            if let Err(err) = validate_ranking(&match_scores) {
                warn!(match_id = %league_match.id, error = %err, "Stored match has inconsistent rankings");
            }
            next.insert_match(league_match, match_scores);
        }

        info!(
            players = next.players().count(),
            corporations = next.corporations().count(),
            matches = next.match_count(),
            "Ledger loaded from entity store"
        );

        *self.current.write().await = Arc::new(next);
        Ok(())
    }

    /// Re-reads people and corporations, leaving committed matches untouched
    #[instrument(skip(self))]
    pub async fn refresh_directory(&self) -> Result<(), LeagueError> {
        let (players, corporations) = futures::try_join!(
            self.store.fetch_players(),
            self.store.fetch_corporations(),
        )?;

        let mut current = self.current.write().await;
        let mut next = LedgerSnapshot::clone(&current);
        next.set_directory(players, corporations);
        *current = Arc::new(next);

        debug!("Directory refreshed");
        Ok(())
    }

    /// The state as of the last completed commit
    pub async fn snapshot(&self) -> Arc<LedgerSnapshot> {
        Arc::clone(&*self.current.read().await)
    }

    pub async fn all_scores_for_player(&self, player_id: PlayerId) -> Vec<Score> {
        self.snapshot().await.scores_for_player(player_id)
    }

    pub async fn all_scores_for_corporation(&self, corporation_id: CorporationId) -> Vec<Score> {
        self.snapshot().await.scores_for_corporation(corporation_id)
    }

    pub async fn all_scores_for_match(&self, match_id: MatchId) -> Result<Vec<Score>, LeagueError> {
        self.snapshot()
            .await
            .scores_for_match(match_id)
            .map(<[Score]>::to_vec)
            .ok_or_else(|| LeagueError::NotFound(format!("match {match_id}")))
    }

    /// Commits one match with all of its scores.
    ///
    /// The store commit happens first; the in-memory view only changes once it
    /// succeeded. Writers are serialized.
    ///
    /// When the store reports `AdapterUnavailable` the match may still have been
    /// committed (a timeout after COMMIT was sent). The ledger then resyncs from
    /// the store before returning the error, so callers should check
    /// `snapshot()` before retrying.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn append(
        &self,
        occurred_on: NaiveDate,
        entries: &[ScoreEntry],
    ) -> Result<Match, LeagueError> {
        validate_ranking(entries)?;

        let _guard = self.writer.lock().await;

        let committed = match self.store.insert_match_with_scores(occurred_on, entries).await {
            Ok(committed) => committed,
            Err(err @ LeagueError::AdapterUnavailable(_)) => {
                // The store may have committed before the failure was seen
                warn!(error = %err, "Commit outcome unknown, resyncing ledger from store");
                if let Err(resync) = self.hydrate().await {
                    warn!(error = %resync, "Ledger resync failed");
                }
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        if committed.scores_committed != entries.len() as u64 {
            warn!(
                match_id = %committed.league_match.id,
                expected = entries.len(),
                committed = committed.scores_committed,
                "Store committed an unexpected number of scores"
            );
        }

        let league_match = committed.league_match;
        let scores = entries
            .iter()
            .map(|entry| entry.into_score(league_match.id))
            .collect();

        let mut current = self.current.write().await;
        let mut next = LedgerSnapshot::clone(&current);
        next.insert_match(league_match, scores);
        *current = Arc::new(next);

        info!(match_id = %league_match.id, occurred_on = %league_match.occurred_on, "Match appended to ledger");
        Ok(league_match)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{Corporation, Player};
    use crate::store::InMemoryEntityStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> Arc<InMemoryEntityStore> {
        Arc::new(InMemoryEntityStore::with_entities(
            (1..=3)
                .map(|id| Player {
                    id: PlayerId(id),
                    name: format!("player-{id}"),
                })
                .collect(),
            vec![Corporation {
                id: CorporationId(1),
                name: "Credicor".into(),
                pack_id: None,
                pack_name: None,
            }],
        ))
    }

    fn entry(player: i64, points: u32, ranking: u32) -> ScoreEntry {
        ScoreEntry {
            player_id: PlayerId(player),
            corporation_id: CorporationId(1),
            points,
            ranking,
            cubes_remaining: 0,
        }
    }

    #[tokio::test]
    async fn player_scores_come_back_in_date_order() {
        let ledger = ScoreLedger::load(store()).await.unwrap();

        ledger
            .append(date(2025, 5, 2), &[entry(1, 50, 1), entry(2, 40, 2)])
            .await
            .unwrap();
        ledger
            .append(date(2025, 4, 1), &[entry(1, 30, 2), entry(2, 45, 1)])
            .await
            .unwrap();

        let points: Vec<u32> = ledger
            .all_scores_for_player(PlayerId(1))
            .await
            .iter()
            .map(|s| s.points)
            .collect();
        assert_eq!(points, vec![30, 50]);
    }

    #[tokio::test]
    async fn unknown_entities_have_no_scores() {
        let ledger = ScoreLedger::load(store()).await.unwrap();

        assert!(ledger.all_scores_for_player(PlayerId(77)).await.is_empty());
        assert!(ledger
            .all_scores_for_corporation(CorporationId(77))
            .await
            .is_empty());
        assert!(matches!(
            ledger.all_scores_for_match(MatchId(77)).await,
            Err(LeagueError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejected_append_leaves_store_and_ledger_untouched() {
        let store = store();
        let ledger = ScoreLedger::load(store.clone()).await.unwrap();

        let result = ledger
            .append(date(2025, 5, 2), &[entry(1, 50, 1), entry(2, 40, 1)])
            .await;

        assert!(matches!(result, Err(LeagueError::InvalidRanking(_))));
        assert_eq!(store.match_count(), 0);
        assert_eq!(ledger.snapshot().await.match_count(), 0);
    }

    #[tokio::test]
    async fn reload_picks_up_matches_committed_elsewhere() {
        let store = store();
        store
            .insert_match_with_scores(date(2025, 1, 1), &[entry(3, 20, 1)])
            .await
            .unwrap();

        let ledger = ScoreLedger::load(store.clone()).await.unwrap();
        assert_eq!(ledger.snapshot().await.match_count(), 1);
        assert_eq!(ledger.all_scores_for_player(PlayerId(3)).await.len(), 1);
    }

    #[tokio::test]
    async fn snapshots_taken_before_a_commit_do_not_change() {
        let ledger = ScoreLedger::load(store()).await.unwrap();
        let before = ledger.snapshot().await;

        ledger
            .append(date(2025, 5, 2), &[entry(1, 50, 1)])
            .await
            .unwrap();

        assert_eq!(before.match_count(), 0);
        assert_eq!(ledger.snapshot().await.match_count(), 1);
    }

    /// Commits, then hangs before reporting back
    struct CommitThenStall(InMemoryEntityStore);

    #[async_trait::async_trait]
    impl EntityStore for CommitThenStall {
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
        ) -> Result<crate::store::CommittedMatch, LeagueError> {
            let committed = self.0.insert_match_with_scores(occurred_on, entries).await?;
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(committed)
        }
    }

    #[tokio::test]
    async fn commit_timeout_resyncs_with_what_the_store_holds() {
        let inner = Arc::try_unwrap(store()).ok().unwrap();
        let timed = crate::store::TimedEntityStore::new(
            CommitThenStall(inner),
            std::time::Duration::from_millis(20),
        );
        let ledger = ScoreLedger::load(Arc::new(timed)).await.unwrap();

        let result = ledger
            .append(date(2025, 5, 2), &[entry(1, 50, 1), entry(2, 40, 2)])
            .await;

        assert!(matches!(result, Err(LeagueError::AdapterUnavailable(_))));
        let snapshot = ledger.snapshot().await;
        assert_eq!(snapshot.match_count(), 1, "committed match must not be lost");
        assert_eq!(snapshot.scores_for_player(PlayerId(2)).len(), 1);
    }
}
