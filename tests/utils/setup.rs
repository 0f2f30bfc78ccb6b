use std::sync::Arc;
use std::time::Duration;

use tmleague::league::{Corporation, CorporationId, Player, PlayerId};
use tmleague::{
    Aggregator, EntityStore, InMemoryEntityStore, MatchRecorder, RecorderConfig, ScoreLedger,
    TimedEntityStore,
};

use super::mocks::{FlakyStore, SharedStore};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub store: Arc<FlakyStore>,
    pub ledger: Arc<ScoreLedger>,
    pub aggregator: Aggregator,
    pub recorder: Arc<MatchRecorder>,
}

pub struct TestSetupBuilder {
    players: Vec<&'static str>,
    corporations: Vec<&'static str>,
    recorder_config: RecorderConfig,
    commit_delay: Option<Duration>,
    adapter_timeout: Option<Duration>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            corporations: vec!["Ecoline", "Helion", "Tharsis Republic"],
            recorder_config: RecorderConfig::default(),
            commit_delay: None,
            adapter_timeout: None,
        }
    }

    /// Players get ids 1, 2, 3... in the order given
    pub fn with_players(mut self, players: Vec<&'static str>) -> Self {
        self.players = players;
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_five_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david", "erin"])
    }

    pub fn with_recorder_config(mut self, config: RecorderConfig) -> Self {
        self.recorder_config = config;
        self
    }

    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    pub fn with_adapter_timeout(mut self, timeout: Duration) -> Self {
        self.adapter_timeout = Some(timeout);
        self
    }

    pub async fn build(self) -> TestSetup {
        let players = self
            .players
            .iter()
            .zip(1..)
            .map(|(name, id)| Player {
                id: PlayerId(id),
                name: name.to_string(),
            })
            .collect();
        let corporations = self
            .corporations
            .iter()
            .zip(1..)
            .map(|(name, id)| Corporation {
                id: CorporationId(id),
                name: name.to_string(),
                pack_id: None,
                pack_name: None,
            })
            .collect();

        let mut flaky = FlakyStore::new(InMemoryEntityStore::with_entities(players, corporations));
        if let Some(delay) = self.commit_delay {
            flaky = flaky.with_commit_delay(delay);
        }
        let store = Arc::new(flaky);

        let backing: Arc<dyn EntityStore> = match self.adapter_timeout {
            Some(timeout) => Arc::new(TimedEntityStore::new(SharedStore(store.clone()), timeout)),
            None => store.clone(),
        };

        let ledger = Arc::new(
            ScoreLedger::load(backing)
                .await
                .expect("ledger should load from the test store"),
        );

        TestSetup {
            store,
            aggregator: Aggregator::new(ledger.clone()),
            recorder: Arc::new(MatchRecorder::new(ledger.clone(), self.recorder_config)),
            ledger,
        }
    }
}
