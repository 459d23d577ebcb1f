use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use gambit_core::room::{GameKind, RoomId};

use crate::error::AppError;
use crate::room_actor::RoomCommand;
use crate::room_manager::RoomSummary;
use crate::state::AppState;

/// Request body for creating a room.
#[derive(Debug, Deserialize)]
pub struct CreateRoomBody {
    pub game: String,
    #[serde(default)]
    pub board: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub game: GameKind,
}

const DEFAULT_BOARD: &str = "1";

/// `POST /api/v1/rooms`: spawn a room under a generated base code.
pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomBody>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), AppError> {
    let game: GameKind = body.game.parse()?;
    let board = body.board.as_deref().unwrap_or(DEFAULT_BOARD);

    let id = state.rooms.write().await.create_room(game, board)?;
    tracing::info!(room = %id, "Room created via API");

    Ok((
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_id: id.to_string(),
            game,
        }),
    ))
}

/// `GET /api/v1/rooms`: live rooms and their games.
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.rooms.read().await.list())
}

/// `GET /api/v1/rooms/{room_id}`: the room's current full snapshot.
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id: RoomId = room_id.parse()?;
    let key = id.to_string();

    let sender = state
        .rooms
        .read()
        .await
        .get(&key)
        .ok_or_else(|| AppError::NotFound(format!("room {key} is not open")))?;

    let (reply, rx) = oneshot::channel();
    sender
        .send(RoomCommand::Inspect { reply })
        .await
        .map_err(|_| AppError::Unavailable(format!("room {key} closed")))?;
    let snapshot = rx
        .await
        .map_err(|_| AppError::Unavailable(format!("room {key} closed")))?;
    Ok(Json(snapshot))
}
