use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::league::MatchId;
use crate::recorder::MatchEntry;

/// Request payload for recording a new match
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordMatchRequest {
    /// Day the match was played; today when omitted
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub entries: Vec<MatchEntry>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordMatchResponse {
    pub match_id: MatchId,
}
