// Library crate for the Terraforming Mars league tracker
// This file exposes the public API for the server binary and integration tests

pub mod api;
pub mod config;
pub mod league;
pub mod ledger;
pub mod recorder;
pub mod shared;
pub mod stats;
pub mod store;

// Re-export commonly used types for easier access in tests
pub use config::LeagueConfig;
pub use league::{LeagueError, MatchId, PlayerId, CorporationId};
pub use ledger::ScoreLedger;
pub use recorder::{MatchEntry, MatchRecorder, RankingPolicy, RecorderConfig};
pub use shared::{AppError, AppState};
pub use stats::{Aggregator, EntityKind, EntityStats};
pub use store::{EntityStore, InMemoryEntityStore, PostgresEntityStore, TimedEntityStore};
