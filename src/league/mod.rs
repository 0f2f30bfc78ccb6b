mod errors;
pub mod models;
pub mod ranking;

pub use errors::LeagueError;
pub use models::*;
pub use ranking::{ensure_distinct_players, rank_by_points, validate_ranking, Placement};
