use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::league::LeagueError;
use crate::ledger::ScoreLedger;
use crate::recorder::{MatchRecorder, RecorderConfig};
use crate::stats::Aggregator;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<ScoreLedger>,
    pub aggregator: Aggregator,
    pub recorder: Arc<MatchRecorder>,
}

impl AppState {
    pub fn new(ledger: Arc<ScoreLedger>, recorder_config: RecorderConfig) -> Self {
        Self {
            aggregator: Aggregator::new(Arc::clone(&ledger)),
            recorder: Arc::new(MatchRecorder::new(Arc::clone(&ledger), recorder_config)),
            ledger,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    League(#[from] LeagueError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::League(LeagueError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::League(LeagueError::AdapterUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::League(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::League(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            warn!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
