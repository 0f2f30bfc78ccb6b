pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::{FlakyStore, SharedStore};
pub use setup::{TestSetup, TestSetupBuilder};

use tmleague::{CorporationId, MatchEntry, PlayerId};

/// Shorthand for a submitted score line
pub fn entry(player: i64, corporation: i64, points: i64, ranking: u32) -> MatchEntry {
    MatchEntry {
        player_id: PlayerId(player),
        corporation_id: CorporationId(corporation),
        points,
        cubes_remaining: 0,
        ranking: Some(ranking),
    }
}
