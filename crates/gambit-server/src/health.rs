use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use gambit_core::room::GameKind;

use crate::error::AppError;
use crate::room_manager::available_games;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub games: Vec<GameKind>,
    pub connections: Connections,
    pub rooms: Rooms,
}

#[derive(Debug, Serialize)]
pub struct Connections {
    pub websocket: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rooms {
    pub active: usize,
    pub limit: usize,
    pub by_game: BTreeMap<GameKind, usize>,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let websocket = state.ws_connection_count.load(Ordering::Relaxed);
    let by_game = state.rooms.read().await.counts_by_game();
    let limits = &state.config.limits;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        games: available_games(),
        connections: Connections {
            websocket,
            limit: limits.max_ws_connections,
        },
        rooms: Rooms {
            active: by_game.values().sum(),
            limit: limits.max_rooms,
            by_game,
        },
    })
}

/// `GET /ready`: 503 when the build hosts no game at all.
pub async fn readiness_check() -> Result<&'static str, AppError> {
    if available_games().is_empty() {
        return Err(AppError::Unavailable("no games enabled".to_string()));
    }
    Ok("ready")
}
