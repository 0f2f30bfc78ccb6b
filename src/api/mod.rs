use axum::{routing::get, Router};

use crate::shared::AppState;

pub mod handlers;
pub mod types;

/// All league routes, ready to be served
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/players", get(handlers::list_players))
        .route("/players/:id", get(handlers::get_player))
        .route("/corporations", get(handlers::list_corporations))
        .route("/corporations/:id", get(handlers::get_corporation))
        .route(
            "/matches",
            get(handlers::list_matches).post(handlers::create_match),
        )
        .route("/matches/:id", get(handlers::get_match))
        .route("/leaderboard/:kind", get(handlers::get_leaderboard))
        .with_state(state)
}
