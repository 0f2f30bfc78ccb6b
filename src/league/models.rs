use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of a row in the people table
    PlayerId
);
entity_id!(
    /// Identifier of a corporation card
    CorporationId
);
entity_id!(
    /// Identifier assigned to a match when it is committed
    MatchId
);

/// Highest number of black cubes a player can have left at the end of a game
pub const MAX_CUBES_REMAINING: u8 = 10;

/// Points and rankings are stored as `INTEGER` columns
pub const MAX_STORED_VALUE: u32 = i32::MAX as u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corporation {
    pub id: CorporationId,
    pub name: String,
    /// Expansion pack the corporation ships with. Grouping only.
    #[serde(default)]
    pub pack_id: Option<i64>,
    #[serde(default)]
    pub pack_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub occurred_on: NaiveDate,
}

/// One player's committed result within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub corporation_id: CorporationId,
    pub points: u32,
    pub ranking: u32,
    pub cubes_remaining: u8,
}

/// A validated, not yet committed score line. The match id is assigned on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub corporation_id: CorporationId,
    pub points: u32,
    pub ranking: u32,
    pub cubes_remaining: u8,
}

impl ScoreEntry {
    pub fn into_score(self, match_id: MatchId) -> Score {
        Score {
            match_id,
            player_id: self.player_id,
            corporation_id: self.corporation_id,
            points: self.points,
            ranking: self.ranking,
            cubes_remaining: self.cubes_remaining,
        }
    }
}

impl Score {
    pub fn is_win(&self) -> bool {
        self.ranking == 1
    }
}
