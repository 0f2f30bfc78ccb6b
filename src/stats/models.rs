use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::league::{Corporation, CorporationId, MatchId, Player, PlayerId, Score};

/// Which entity a leaderboard is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Player,
    Corporation,
}

/// Games played, wins and win percentage for one player or corporation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityStats {
    pub games_played: u32,
    pub wins: u32,
    pub win_percent: f64,
}

impl EntityStats {
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a Score>) -> Self {
        let (games_played, wins) = scores
            .into_iter()
            .fold((0, 0), |(games, wins), score| {
                (games + 1, wins + u32::from(score.is_win()))
            });

        Self {
            games_played,
            wins,
            win_percent: win_percent(wins, games_played),
        }
    }
}

/// `wins / games * 100`, rounded to one decimal. Zero games gives zero.
pub fn win_percent(wins: u32, games_played: u32) -> f64 {
    if games_played == 0 {
        return 0.0;
    }
    let percent = f64::from(wins) / f64::from(games_played) * 100.0;
    (percent * 10.0).round() / 10.0
}

/// One row of a match, as committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub corporation_id: CorporationId,
    pub points: u32,
    pub ranking: u32,
    pub cubes_remaining: u8,
}

impl From<&Score> for Standing {
    fn from(score: &Score) -> Self {
        Self {
            player_id: score.player_id,
            corporation_id: score.corporation_id,
            points: score.points,
            ranking: score.ranking,
            cubes_remaining: score.cubes_remaining,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub kind: EntityKind,
    pub id: i64,
    pub name: String,
    /// Expansion pack name, corporations only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack: Option<String>,
    #[serde(flatten)]
    pub stats: EntityStats,
}

/// A standing with the names the directory knows for its ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedStanding {
    #[serde(flatten)]
    pub standing: Standing,
    pub player_name: Option<String>,
    pub corporation_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub match_id: MatchId,
    pub occurred_on: NaiveDate,
    pub standings: Vec<NamedStanding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub ranking: u32,
}

/// One line of the match history: the winner plus everyone who played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub occurred_on: NaiveDate,
    pub winner: Option<NamedStanding>,
    pub participants: Vec<Participant>,
}

/// One score of a player or corporation in the context of its match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub match_id: MatchId,
    pub occurred_on: NaiveDate,
    pub player_id: PlayerId,
    pub corporation_id: CorporationId,
    pub points: u32,
    pub ranking: u32,
    pub players_in_match: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHistory {
    pub player: Player,
    pub stats: EntityStats,
    pub matches: Vec<HistoryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporationHistory {
    pub corporation: Corporation,
    pub stats: EntityStats,
    pub matches: Vec<HistoryRow>,
}
