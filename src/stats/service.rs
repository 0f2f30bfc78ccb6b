use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    history, EntityKind, EntityStats, LeaderboardRow, MatchDetail, MatchSummary, PlayerHistory,
    CorporationHistory, Standing,
};
use crate::league::{CorporationId, LeagueError, MatchId, PlayerId};
use crate::ledger::{LedgerSnapshot, ScoreLedger};

/// Read-only statistics over the score ledger.
///
/// Every query works on a single ledger snapshot, so it observes a match either
/// fully committed or not at all. Nothing is cached between calls.
#[derive(Clone)]
pub struct Aggregator {
    ledger: Arc<ScoreLedger>,
}

impl Aggregator {
    pub fn new(ledger: Arc<ScoreLedger>) -> Self {
        Self { ledger }
    }

    #[instrument(skip(self))]
    pub async fn player_stats(&self, player_id: PlayerId) -> EntityStats {
        let snapshot = self.ledger.snapshot().await;
        EntityStats::from_scores(&snapshot.scores_for_player(player_id))
    }

    #[instrument(skip(self))]
    pub async fn corporation_stats(&self, corporation_id: CorporationId) -> EntityStats {
        let snapshot = self.ledger.snapshot().await;
        EntityStats::from_scores(&snapshot.scores_for_corporation(corporation_id))
    }

    /// The match's scores, winner first
    #[instrument(skip(self))]
    pub async fn match_standings(&self, match_id: MatchId) -> Result<Vec<Standing>, LeagueError> {
        let snapshot = self.ledger.snapshot().await;
        standings(&snapshot, match_id)
    }

    #[instrument(skip(self))]
    pub async fn leaderboard(&self, kind: EntityKind) -> Vec<LeaderboardRow> {
        let snapshot = self.ledger.snapshot().await;
        let rows = leaderboard(&snapshot, kind);
        debug!(%kind, rows = rows.len(), "Leaderboard computed");
        rows
    }

    #[instrument(skip(self))]
    pub async fn match_history(&self) -> Vec<MatchSummary> {
        history::match_history(&*self.ledger.snapshot().await)
    }

    #[instrument(skip(self))]
    pub async fn match_detail(&self, match_id: MatchId) -> Result<MatchDetail, LeagueError> {
        history::match_detail(&*self.ledger.snapshot().await, match_id)
    }

    #[instrument(skip(self))]
    pub async fn player_history(&self, player_id: PlayerId) -> Result<PlayerHistory, LeagueError> {
        history::player_history(&*self.ledger.snapshot().await, player_id)
    }

    #[instrument(skip(self))]
    pub async fn corporation_history(
        &self,
        corporation_id: CorporationId,
    ) -> Result<CorporationHistory, LeagueError> {
        history::corporation_history(&*self.ledger.snapshot().await, corporation_id)
    }
}

pub(super) fn standings(
    snapshot: &LedgerSnapshot,
    match_id: MatchId,
) -> Result<Vec<Standing>, LeagueError> {
    let scores = snapshot
        .scores_for_match(match_id)
        .filter(|scores| !scores.is_empty())
        .ok_or_else(|| LeagueError::NotFound(format!("match {match_id}")))?;

    let mut standings: Vec<Standing> = scores.iter().map(Standing::from).collect();
    standings.sort_by_key(|s| (s.ranking, s.player_id));
    Ok(standings)
}

/// Most games first, then best win percentage, then name
pub(super) fn leaderboard(snapshot: &LedgerSnapshot, kind: EntityKind) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = match kind {
        EntityKind::Player => snapshot
            .players()
            .map(|player| LeaderboardRow {
                kind,
                id: player.id.0,
                name: player.name.clone(),
                pack: None,
                stats: EntityStats::from_scores(&snapshot.scores_for_player(player.id)),
            })
            .collect(),
        EntityKind::Corporation => snapshot
            .corporations()
            .map(|corporation| LeaderboardRow {
                kind,
                id: corporation.id.0,
                name: corporation.name.clone(),
                pack: corporation.pack_name.clone(),
                stats: EntityStats::from_scores(
                    &snapshot.scores_for_corporation(corporation.id),
                ),
            })
            .collect(),
    };

    rows.sort_by(compare_rows);
    rows
}

fn compare_rows(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.stats
        .games_played
        .cmp(&a.stats.games_played)
        .then_with(|| b.stats.win_percent.total_cmp(&a.stats.win_percent))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
