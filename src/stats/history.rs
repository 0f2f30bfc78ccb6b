use crate::league::{CorporationId, LeagueError, MatchId, PlayerId, Score};
use crate::ledger::LedgerSnapshot;

use super::{
    service::standings, CorporationHistory, EntityStats, HistoryRow, MatchDetail, MatchSummary,
    NamedStanding, Participant, PlayerHistory, Standing,
};

fn named(snapshot: &LedgerSnapshot, standing: Standing) -> NamedStanding {
    NamedStanding {
        standing,
        player_name: snapshot.player(standing.player_id).map(|p| p.name.clone()),
        corporation_name: snapshot
            .corporation(standing.corporation_id)
            .map(|c| c.name.clone()),
    }
}

fn history_rows(snapshot: &LedgerSnapshot, scores: &[Score]) -> Vec<HistoryRow> {
    scores
        .iter()
        .filter_map(|score| {
            let league_match = snapshot.league_match(score.match_id)?;
            Some(HistoryRow {
                match_id: score.match_id,
                occurred_on: league_match.occurred_on,
                player_id: score.player_id,
                corporation_id: score.corporation_id,
                points: score.points,
                ranking: score.ranking,
                players_in_match: snapshot.players_in_match(score.match_id),
            })
        })
        .collect()
}

/// Every match, most recent first
pub(super) fn match_history(snapshot: &LedgerSnapshot) -> Vec<MatchSummary> {
    snapshot
        .matches_chronological()
        .rev()
        .map(|league_match| {
            let scores = snapshot.scores_for_match(league_match.id).unwrap_or_default();

            let winner = scores
                .iter()
                .find(|score| score.is_win())
                .map(|score| named(snapshot, Standing::from(score)));

            let mut participants: Vec<Participant> = scores
                .iter()
                .map(|score| Participant {
                    player_id: score.player_id,
                    name: snapshot.player(score.player_id).map(|p| p.name.clone()),
                    ranking: score.ranking,
                })
                .collect();
            participants.sort_by_cached_key(|participant| {
                (
                    participant.name.as_deref().unwrap_or_default().to_lowercase(),
                    participant.player_id,
                )
            });

            MatchSummary {
                match_id: league_match.id,
                occurred_on: league_match.occurred_on,
                winner,
                participants,
            }
        })
        .collect()
}

pub(super) fn match_detail(
    snapshot: &LedgerSnapshot,
    match_id: MatchId,
) -> Result<MatchDetail, LeagueError> {
    let league_match = snapshot
        .league_match(match_id)
        .ok_or_else(|| LeagueError::NotFound(format!("match {match_id}")))?;

    let standings = standings(snapshot, match_id)?
        .into_iter()
        .map(|standing| named(snapshot, standing))
        .collect();

    Ok(MatchDetail {
        match_id,
        occurred_on: league_match.occurred_on,
        standings,
    })
}

pub(super) fn player_history(
    snapshot: &LedgerSnapshot,
    player_id: PlayerId,
) -> Result<PlayerHistory, LeagueError> {
    let player = snapshot
        .player(player_id)
        .cloned()
        .ok_or_else(|| LeagueError::NotFound(format!("player {player_id}")))?;

    let scores = snapshot.scores_for_player(player_id);
    Ok(PlayerHistory {
        player,
        stats: EntityStats::from_scores(&scores),
        matches: history_rows(snapshot, &scores),
    })
}

pub(super) fn corporation_history(
    snapshot: &LedgerSnapshot,
    corporation_id: CorporationId,
) -> Result<CorporationHistory, LeagueError> {
    let corporation = snapshot
        .corporation(corporation_id)
        .cloned()
        .ok_or_else(|| LeagueError::NotFound(format!("corporation {corporation_id}")))?;

    let scores = snapshot.scores_for_corporation(corporation_id);
    Ok(CorporationHistory {
        corporation,
        stats: EntityStats::from_scores(&scores),
        matches: history_rows(snapshot, &scores),
    })
}
