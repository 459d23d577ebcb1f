use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendError;
use uuid::Uuid;

use gambit_core::room::RoomId;

use crate::error::AppError;
use crate::room_actor::RoomCommand;
use crate::state::{AppState, ConnectionGuard};

/// `GET /ws/{room_id}`: attach a connection to the room, creating it on
/// first use.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let max_ws = state.config.limits.max_ws_connections;
    let current = state.ws_connection_count.load(Ordering::Relaxed);
    if current >= max_ws {
        tracing::warn!(current, max = max_ws, "WS connection limit reached");
        return Err(AppError::Unavailable("connection limit reached".to_string()));
    }

    let id: RoomId = room_id.parse()?;
    let room = state.rooms.write().await.get_or_create(&id)?;

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, room, id))
        .into_response())
}

async fn handle_socket(
    mut socket: WebSocket,
    state: AppState,
    room: mpsc::Sender<RoomCommand>,
    id: RoomId,
) {
    let _guard = ConnectionGuard::new(Arc::clone(&state.ws_connection_count));
    let room_id = id.to_string();
    let conn_id = Uuid::new_v4().to_string();

    let (tx, rx) = mpsc::channel::<Bytes>(state.config.limits.player_message_buffer);
    let connect = RoomCommand::Connect {
        conn_id: conn_id.clone(),
        sender: tx,
    };
    let Some(room) = attach(&state, &id, room, connect).await else {
        tracing::warn!(room = %room_id, conn = %conn_id, "Room unavailable at connect");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::AGAIN,
                reason: "room unavailable".into(),
            })))
            .await;
        return;
    };
    tracing::info!(room = %room_id, conn = %conn_id, "Connection opened");

    let (ws_sender, mut ws_receiver) = socket.split();

    spawn_writer(ws_sender, rx);

    read_loop(&mut ws_receiver, &state, &room, &room_id, &conn_id).await;

    // The actor drops its sender on disconnect, which ends the writer task.
    let _ = room
        .send(RoomCommand::Disconnect {
            conn_id: conn_id.clone(),
        })
        .await;
    tracing::info!(room = %room_id, conn = %conn_id, "Connection closed");
}

/// Deliver `connect` to the room. A room that stopped since it was looked up
/// is replaced once through the registry.
async fn attach(
    state: &AppState,
    id: &RoomId,
    room: mpsc::Sender<RoomCommand>,
    connect: RoomCommand,
) -> Option<mpsc::Sender<RoomCommand>> {
    let Err(SendError(connect)) = room.send(connect).await else {
        return Some(room);
    };
    tracing::debug!(room = %id, "Room stopped before connect, respawning");
    let fresh = match state.rooms.write().await.get_or_create(id) {
        Ok(fresh) => fresh,
        Err(e) => {
            tracing::warn!(room = %id, error = %e, "Could not respawn room");
            return None;
        },
    };
    fresh.send(connect).await.ok()?;
    Some(fresh)
}

fn spawn_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Bytes>,
) {
    tokio::spawn(async move {
        while let Some(data) = rx.recv().await {
            let Ok(text) = String::from_utf8(Vec::from(data)) else {
                continue;
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });
}

/// Per-connection rate limiter (token bucket).
struct RateLimiter {
    tokens: f64,
    last_refill: tokio::time::Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            last_refill: tokio::time::Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    /// Returns true if the message is allowed; false if rate-limited.
    fn allow(&mut self) -> bool {
        let now = tokio::time::Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

async fn read_loop(
    ws_receiver: &mut futures::stream::SplitStream<WebSocket>,
    state: &AppState,
    room: &mpsc::Sender<RoomCommand>,
    room_id: &str,
    conn_id: &str,
) {
    let rate = state.config.limits.ws_rate_limit_per_sec;
    let max_bytes = state.config.limits.max_message_bytes;
    let mut rate_limiter = RateLimiter::new(rate, rate);

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        if !rate_limiter.allow() {
            tracing::debug!(room = room_id, conn = conn_id, "Rate limited");
            continue;
        }

        if text.len() > max_bytes {
            tracing::debug!(room = room_id, conn = conn_id, len = text.len(), "Oversized frame dropped");
            continue;
        }

        let cmd = RoomCommand::Client {
            conn_id: conn_id.to_string(),
            text: text.as_str().to_owned(),
        };
        if room.send(cmd).await.is_err() {
            tracing::debug!(room = room_id, conn = conn_id, "Room closed during read loop");
            break;
        }
    }
}
