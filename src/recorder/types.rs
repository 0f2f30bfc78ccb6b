use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::league::{CorporationId, PlayerId};

/// Where a new match's rankings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RankingPolicy {
    /// Every entry carries its ranking and it is validated as given
    #[default]
    Supplied,
    /// Rankings are derived from points, highest first; ties go to the lower player id
    ByPoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    pub max_entries: usize,
    pub ranking_policy: RankingPolicy,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_entries: 5,
            ranking_policy: RankingPolicy::Supplied,
        }
    }
}

/// One player's line as submitted for a new match.
///
/// Out-of-range numbers are rejected by the recorder with `InvalidScore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub player_id: PlayerId,
    pub corporation_id: CorporationId,
    pub points: i64,
    #[serde(default)]
    pub cubes_remaining: i64,
    #[serde(default)]
    pub ranking: Option<u32>,
}
