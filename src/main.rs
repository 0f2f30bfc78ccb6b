use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tmleague::{
    api, AppState, EntityStore, InMemoryEntityStore, LeagueConfig, PostgresEntityStore,
    ScoreLedger, TimedEntityStore,
};

async fn build_store(config: &LeagueConfig) -> Result<Arc<dyn EntityStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn EntityStore> = match (&config.database_url, &config.seed_path) {
        (Some(database_url), _) => {
            info!("Using PostgreSQL entity store");
            let store = PostgresEntityStore::connect(database_url).await?;
            Arc::new(TimedEntityStore::new(store, config.adapter_timeout))
        }
        (None, Some(seed_path)) => {
            info!(seed_path = %seed_path.display(), "Using in-memory entity store with seed data");
            let store = InMemoryEntityStore::from_seed_file(seed_path)?;
            Arc::new(TimedEntityStore::new(store, config.adapter_timeout))
        }
        (None, None) => {
            info!("Using empty in-memory entity store");
            Arc::new(TimedEntityStore::new(
                InMemoryEntityStore::new(),
                config.adapter_timeout,
            ))
        }
    };
    Ok(store)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tmleague=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting league tracker");

    let config = LeagueConfig::from_env();
    info!(
        max_players = config.max_players_per_match,
        ranking_policy = %config.ranking_policy,
        adapter_timeout_ms = config.adapter_timeout.as_millis() as u64,
        "Configuration loaded"
    );

    let store = match build_store(&config).await {
        Ok(store) => store,
        Err(err) => {
            error!(error = %err, "Failed to set up entity store");
            std::process::exit(1);
        }
    };

    let ledger = match ScoreLedger::load(store).await {
        Ok(ledger) => Arc::new(ledger),
        Err(err) => {
            error!(error = %err, "Failed to load score ledger");
            std::process::exit(1);
        }
    };

    let app_state = AppState::new(ledger, config.recorder());

    let app = api::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, bind_addr = %config.bind_addr, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(bind_addr = %config.bind_addr, "Server running");

    if let Err(err) = axum::serve(listener, app).await {
        error!(error = %err, "Server stopped with an error");
    }
}
