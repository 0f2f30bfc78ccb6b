use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{MatchEntry, RankingPolicy, RecorderConfig};
use crate::league::{
    ensure_distinct_players, rank_by_points, validate_ranking, LeagueError, MatchId, ScoreEntry,
    MAX_CUBES_REMAINING, MAX_STORED_VALUE,
};
use crate::ledger::ScoreLedger;

/// The only write path into the ledger: validates a full match and commits it
/// as one unit.
pub struct MatchRecorder {
    ledger: Arc<ScoreLedger>,
    config: RecorderConfig,
}

impl MatchRecorder {
    pub fn new(ledger: Arc<ScoreLedger>, config: RecorderConfig) -> Self {
        Self { ledger, config }
    }

    /// Records a match played on `date` (today when `None`) and returns its new id.
    ///
    /// Nothing is written unless every check passes.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn record_match(
        &self,
        date: Option<NaiveDate>,
        entries: &[MatchEntry],
    ) -> Result<MatchId, LeagueError> {
        let occurred_on = date.unwrap_or_else(|| Utc::now().date_naive());

        let scores = self.prepare(entries).inspect_err(|err| {
            warn!(error = %err, "Rejected match submission");
        })?;

        self.check_references(&scores).await?;

        let league_match = self.ledger.append(occurred_on, &scores).await?;

        info!(
            match_id = %league_match.id,
            occurred_on = %league_match.occurred_on,
            players = scores.len(),
            "Match recorded"
        );
        Ok(league_match.id)
    }

    /// Shape and ranking checks that need no store access
    fn prepare(&self, entries: &[MatchEntry]) -> Result<Vec<ScoreEntry>, LeagueError> {
        if entries.is_empty() {
            return Err(LeagueError::EmptyMatch);
        }
        if entries.len() > self.config.max_entries {
            return Err(LeagueError::TooManyEntries {
                max: self.config.max_entries,
                actual: entries.len(),
            });
        }

        let mut scores = entries
            .iter()
            .map(|entry| self.to_score_entry(entry))
            .collect::<Result<Vec<_>, _>>()?;

        ensure_distinct_players(&scores)?;

        match self.config.ranking_policy {
            RankingPolicy::ByPoints => {
                rank_by_points(&mut scores);
                debug!("Rankings derived from points");
            }
            RankingPolicy::Supplied => {
                if let Some(entry) = entries.iter().find(|entry| entry.ranking.is_none()) {
                    return Err(LeagueError::InvalidRanking(format!(
                        "missing ranking for player {}",
                        entry.player_id
                    )));
                }
            }
        }

        validate_ranking(&scores)?;
        Ok(scores)
    }

    fn to_score_entry(&self, entry: &MatchEntry) -> Result<ScoreEntry, LeagueError> {
        let points = u32::try_from(entry.points)
            .ok()
            .filter(|points| *points <= MAX_STORED_VALUE)
            .ok_or_else(|| {
                LeagueError::InvalidScore(format!(
                    "points for player {} must be between 0 and {MAX_STORED_VALUE}, got {}",
                    entry.player_id, entry.points
                ))
            })?;

        let cubes_remaining = u8::try_from(entry.cubes_remaining)
            .ok()
            .filter(|cubes| *cubes <= MAX_CUBES_REMAINING)
            .ok_or_else(|| {
                LeagueError::InvalidScore(format!(
                    "cubes remaining for player {} must be between 0 and {MAX_CUBES_REMAINING}, got {}",
                    entry.player_id, entry.cubes_remaining
                ))
            })?;

        // Missing rankings are reported once players are known to be distinct
        Ok(ScoreEntry {
            player_id: entry.player_id,
            corporation_id: entry.corporation_id,
            points,
            ranking: entry.ranking.unwrap_or_default(),
            cubes_remaining,
        })
    }

    /// Every player and corporation must exist in the entity store
    async fn check_references(&self, scores: &[ScoreEntry]) -> Result<(), LeagueError> {
        self.ledger.refresh_directory().await?;
        let snapshot = self.ledger.snapshot().await;

        for score in scores {
            if snapshot.player(score.player_id).is_none() {
                warn!(player_id = %score.player_id, "Match references unknown player");
                return Err(LeagueError::UnknownReference(format!(
                    "player {}",
                    score.player_id
                )));
            }
            if snapshot.corporation(score.corporation_id).is_none() {
                warn!(corporation_id = %score.corporation_id, "Match references unknown corporation");
                return Err(LeagueError::UnknownReference(format!(
                    "corporation {}",
                    score.corporation_id
                )));
            }
        }
        Ok(())
    }
}
