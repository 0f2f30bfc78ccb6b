use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;
use tracing::{info, instrument};

use super::types::{RecordMatchRequest, RecordMatchResponse};
use crate::league::{CorporationId, MatchId, PlayerId};
use crate::shared::{AppError, AppState};
use crate::stats::{
    CorporationHistory, EntityKind, LeaderboardRow, MatchDetail, MatchSummary, PlayerHistory,
};

/// GET /players
/// Every player with games played, wins and win percentage
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(State(state): State<AppState>) -> Json<Vec<LeaderboardRow>> {
    Json(state.aggregator.leaderboard(EntityKind::Player).await)
}

/// GET /players/:id
#[instrument(name = "get_player", skip(state))]
pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> Result<Json<PlayerHistory>, AppError> {
    Ok(Json(state.aggregator.player_history(player_id).await?))
}

/// GET /corporations
#[instrument(name = "list_corporations", skip(state))]
pub async fn list_corporations(State(state): State<AppState>) -> Json<Vec<LeaderboardRow>> {
    Json(state.aggregator.leaderboard(EntityKind::Corporation).await)
}

/// GET /corporations/:id
#[instrument(name = "get_corporation", skip(state))]
pub async fn get_corporation(
    State(state): State<AppState>,
    Path(corporation_id): Path<CorporationId>,
) -> Result<Json<CorporationHistory>, AppError> {
    Ok(Json(
        state.aggregator.corporation_history(corporation_id).await?,
    ))
}

/// GET /matches
/// Most recent match first
#[instrument(name = "list_matches", skip(state))]
pub async fn list_matches(State(state): State<AppState>) -> Json<Vec<MatchSummary>> {
    Json(state.aggregator.match_history().await)
}

/// GET /matches/:id
#[instrument(name = "get_match", skip(state))]
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchDetail>, AppError> {
    Ok(Json(state.aggregator.match_detail(match_id).await?))
}

/// GET /leaderboard/:kind
/// `kind` is `player` or `corporation`
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<LeaderboardRow>>, AppError> {
    let kind = EntityKind::from_str(&kind)
        .map_err(|_| AppError::BadRequest(format!("unknown leaderboard kind '{kind}'")))?;
    Ok(Json(state.aggregator.leaderboard(kind).await))
}

/// POST /matches
/// Records a match with all of its scores; 201 with the new id
#[instrument(name = "create_match", skip(state, request))]
pub async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<RecordMatchRequest>,
) -> Result<(StatusCode, Json<RecordMatchResponse>), AppError> {
    let match_id = state
        .recorder
        .record_match(request.date, &request.entries)
        .await?;

    info!(match_id = %match_id, "Match created");
    Ok((StatusCode::CREATED, Json(RecordMatchResponse { match_id })))
}
