use std::collections::HashSet;

use super::{LeagueError, PlayerId, Score, ScoreEntry};

/// Anything that places a player within one match
pub trait Placement {
    fn player_id(&self) -> PlayerId;
    fn ranking(&self) -> u32;
}

impl Placement for Score {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn ranking(&self) -> u32 {
        self.ranking
    }
}

impl Placement for ScoreEntry {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn ranking(&self) -> u32 {
        self.ranking
    }
}

/// Fails on an empty match or on the first player placed twice
pub fn ensure_distinct_players<P: Placement>(placements: &[P]) -> Result<(), LeagueError> {
    if placements.is_empty() {
        return Err(LeagueError::EmptyMatch);
    }

    let mut seen = HashSet::with_capacity(placements.len());
    for placement in placements {
        if !seen.insert(placement.player_id()) {
            return Err(LeagueError::DuplicatePlayer(placement.player_id()));
        }
    }
    Ok(())
}

/// Checks one match's placements: non-empty, each player once, and rankings
/// forming exactly `1..=N`.
pub fn validate_ranking<P: Placement>(placements: &[P]) -> Result<(), LeagueError> {
    ensure_distinct_players(placements)?;

    let mut ranks: Vec<u32> = placements.iter().map(Placement::ranking).collect();
    ranks.sort_unstable();

    let winners = ranks.iter().filter(|&&rank| rank == 1).count();
    if winners != 1 {
        return Err(LeagueError::InvalidRanking(format!(
            "expected exactly one winner, found {winners}"
        )));
    }

    let size = ranks.len();
    if let Some((expected, found)) = ranks
        .iter()
        .enumerate()
        .map(|(index, &rank)| (index as u32 + 1, rank))
        .find(|(expected, found)| expected != found)
    {
        return Err(LeagueError::InvalidRanking(format!(
            "rankings must cover 1..={size} exactly once, expected {expected} but found {found}"
        )));
    }

    Ok(())
}

/// Assigns rankings by descending points. Equal points are ordered by player id,
/// lowest first, so the result is always a permutation of `1..=N`.
pub fn rank_by_points(entries: &mut [ScoreEntry]) {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| {
        entries[b]
            .points
            .cmp(&entries[a].points)
            .then_with(|| entries[a].player_id.cmp(&entries[b].player_id))
    });

    for (position, index) in order.into_iter().enumerate() {
        entries[index].ranking = position as u32 + 1;
    }
}
