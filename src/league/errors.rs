use thiserror::Error;

use super::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeagueError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A match needs at least one score")]
    EmptyMatch,

    #[error("Player {0} appears more than once in the match")]
    DuplicatePlayer(PlayerId),

    #[error("Invalid ranking: {0}")]
    InvalidRanking(String),

    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Too many entries: at most {max} players per match, got {actual}")]
    TooManyEntries { max: usize, actual: usize },

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Entity store unavailable: {0}")]
    AdapterUnavailable(String),
}

impl LeagueError {
    /// True for failures caused by the submitted data rather than the backing store
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LeagueError::EmptyMatch
                | LeagueError::DuplicatePlayer(_)
                | LeagueError::InvalidRanking(_)
                | LeagueError::UnknownReference(_)
                | LeagueError::TooManyEntries { .. }
                | LeagueError::InvalidScore(_)
        )
    }
}
