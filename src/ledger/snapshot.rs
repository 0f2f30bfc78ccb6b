use std::collections::BTreeMap;

use crate::league::{
    Corporation, CorporationId, Match, MatchId, Player, PlayerId, Score,
};

/// Immutable view of the ledger at one point in time
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    players: BTreeMap<PlayerId, Player>,
    corporations: BTreeMap<CorporationId, Corporation>,
    matches: BTreeMap<MatchId, Match>,
    scores: BTreeMap<MatchId, Vec<Score>>,
    // match ids ordered by (occurred_on, id)
    chronological: Vec<MatchId>,
}

impl LedgerSnapshot {
    pub(super) fn set_directory(&mut self, players: Vec<Player>, corporations: Vec<Corporation>) {
        self.players = players.into_iter().map(|p| (p.id, p)).collect();
        self.corporations = corporations.into_iter().map(|c| (c.id, c)).collect();
    }

    pub(super) fn insert_match(&mut self, league_match: Match, scores: Vec<Score>) {
        let key = (league_match.occurred_on, league_match.id);
        let position = self
            .chronological
            .partition_point(|id| (self.matches[id].occurred_on, *id) <= key);

        self.chronological.insert(position, league_match.id);
        self.matches.insert(league_match.id, league_match);
        self.scores.insert(league_match.id, scores);
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn corporations(&self) -> impl Iterator<Item = &Corporation> {
        self.corporations.values()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn corporation(&self, id: CorporationId) -> Option<&Corporation> {
        self.corporations.get(&id)
    }

    pub fn league_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Oldest first; reverse for most recent first
    pub fn matches_chronological(&self) -> impl DoubleEndedIterator<Item = &Match> {
        self.chronological.iter().map(|id| &self.matches[id])
    }

    pub fn scores_for_match(&self, id: MatchId) -> Option<&[Score]> {
        self.scores.get(&id).map(Vec::as_slice)
    }

    /// Number of players who took part in a match, zero when unknown
    pub fn players_in_match(&self, id: MatchId) -> usize {
        self.scores.get(&id).map(Vec::len).unwrap_or_default()
    }

    pub fn scores_for_player(&self, id: PlayerId) -> Vec<Score> {
        self.chronological_scores(|score| score.player_id == id)
    }

    pub fn scores_for_corporation(&self, id: CorporationId) -> Vec<Score> {
        self.chronological_scores(|score| score.corporation_id == id)
    }

    fn chronological_scores(&self, keep: impl Fn(&Score) -> bool) -> Vec<Score> {
        self.chronological
            .iter()
            .filter_map(|id| self.scores.get(id))
            .flatten()
            .filter(|score| keep(score))
            .copied()
            .collect()
    }
}
