pub mod service;
mod types;

pub use service::MatchRecorder;
pub use types::{MatchEntry, RankingPolicy, RecorderConfig};
