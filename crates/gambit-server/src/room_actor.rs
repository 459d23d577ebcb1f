//! One task per room. The actor owns every piece of mutable room state and
//! handles exactly one command at a time, so no locks guard the board.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use gambit_core::clock::ClockState;
use gambit_core::game_trait::{ActionContext, BoardGame, Outcome};
use gambit_core::protocol::{
    ClientMessage, ServerMessage, decode_client_message, encode_server_message, parse_seat,
};
use gambit_core::result::GameResult;
use gambit_core::seat::{SeatInfo, Seats};
use gambit_core::snapshot::RoomSnapshot;

use crate::config::ServerConfig;

/// Per-connection sender for outbound WebSocket text frames.
/// Bounded so a slow client cannot grow memory without limit.
pub type PlayerSender = mpsc::Sender<Bytes>;

#[derive(Debug)]
pub enum RoomCommand {
    Connect {
        conn_id: String,
        sender: PlayerSender,
    },
    Disconnect {
        conn_id: String,
    },
    Client {
        conn_id: String,
        text: String,
    },
    /// Fired by the auto-reset timer. Applied only if nothing happened since.
    AutoReset {
        token: u64,
        expected_sequence: u64,
    },
    /// Reply with the current full snapshot.
    Inspect {
        reply: oneshot::Sender<serde_json::Value>,
    },
}

/// Room-level knobs taken from [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct RoomSettings {
    pub base_ms: u64,
    pub increment_ms: u64,
    pub max_base_ms: u64,
    pub max_increment_ms: u64,
    pub watchdog_interval: Duration,
    pub auto_reset_delay: Duration,
    pub idle_timeout: Duration,
    pub command_buffer: usize,
}

impl RoomSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            base_ms: config.clock.default_base_secs * 1000,
            increment_ms: config.clock.default_increment_secs * 1000,
            max_base_ms: config.clock.max_base_secs * 1000,
            max_increment_ms: config.clock.max_increment_secs * 1000,
            watchdog_interval: config.clock.watchdog_interval(),
            auto_reset_delay: config.clock.auto_reset_delay(),
            idle_timeout: Duration::from_secs(config.rooms.idle_timeout_secs),
            command_buffer: config.limits.player_message_buffer,
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

/// Spawn the actor task for one room.
pub fn spawn_room<G: BoardGame>(
    room_id: String,
    game: G,
    settings: RoomSettings,
) -> (mpsc::Sender<RoomCommand>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(settings.command_buffer.max(1));
    let actor = RoomActor::new(room_id, game, settings, tx.downgrade());
    let handle = tokio::spawn(actor.run(rx));
    (tx, handle)
}

struct RoomActor<G: BoardGame> {
    room_id: String,
    game: G,
    seats: Seats<G::Seat>,
    clock: ClockState<G::Seat>,
    sequence: u64,
    result: Option<GameResult<G::Winner>>,
    connections: HashMap<String, PlayerSender>,
    /// Generation of the pending auto-reset. Every new timeout bumps it.
    reset_token: u64,
    settings: RoomSettings,
    epoch_ms: u64,
    started: Instant,
    self_tx: mpsc::WeakSender<RoomCommand>,
}

impl<G: BoardGame> RoomActor<G> {
    fn new(
        room_id: String,
        game: G,
        settings: RoomSettings,
        self_tx: mpsc::WeakSender<RoomCommand>,
    ) -> Self {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            room_id,
            game,
            seats: Seats::new(),
            clock: ClockState::new(settings.base_ms, settings.increment_ms),
            sequence: 0,
            result: None,
            connections: HashMap::new(),
            reset_token: 0,
            settings,
            epoch_ms,
            started: Instant::now(),
            self_tx,
        }
    }

    /// Wall-clock milliseconds, advanced by the runtime's monotonic clock.
    fn now_ms(&self) -> u64 {
        self.epoch_ms + self.started.elapsed().as_millis() as u64
    }

    async fn run(mut self, mut rx: mpsc::Receiver<RoomCommand>) {
        tracing::info!(room = %self.room_id, game = %self.game.kind(), "Room opened");

        let mut watchdog = tokio::time::interval(self.settings.watchdog_interval);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let idle = tokio::time::sleep(self.settings.idle_timeout);
        tokio::pin!(idle);

        loop {
            tokio::select! {
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle(cmd);
                    idle.as_mut().reset(Instant::now() + self.settings.idle_timeout);
                },
                _ = watchdog.tick(), if self.clock.running => {
                    self.check_clock();
                },
                () = &mut idle, if self.connections.is_empty() => {
                    tracing::info!(room = %self.room_id, "Room idle, shutting down");
                    break;
                },
            }
        }

        tracing::info!(room = %self.room_id, "Room closed");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Connect { conn_id, sender } => self.connect(conn_id, sender),
            RoomCommand::Disconnect { conn_id } => self.disconnect(&conn_id),
            RoomCommand::Client { conn_id, text } => self.client_message(&conn_id, &text),
            RoomCommand::AutoReset {
                token,
                expected_sequence,
            } => self.auto_reset(token, expected_sequence),
            RoomCommand::Inspect { reply } => {
                let now = self.now_ms();
                match serde_json::to_value(self.snapshot(now)) {
                    Ok(value) => {
                        let _ = reply.send(value);
                    },
                    Err(e) => {
                        tracing::error!(room = %self.room_id, error = %e, "Failed to serialize snapshot");
                    },
                }
            },
        }
    }

    fn connect(&mut self, conn_id: String, sender: PlayerSender) {
        tracing::debug!(room = %self.room_id, conn = %conn_id, "Connection attached");
        let welcome: ServerMessage<'_, ()> = ServerMessage::Welcome {
            connection_id: &conn_id,
            room_id: &self.room_id,
            game: self.game.kind(),
        };
        if let Some(data) = self.encode(&welcome) {
            send_or_skip(&sender, data, &self.room_id, &conn_id);
        }
        if let Some(data) = self.encode_state() {
            send_or_skip(&sender, data, &self.room_id, &conn_id);
        }
        self.connections.insert(conn_id, sender);
    }

    fn disconnect(&mut self, conn_id: &str) {
        self.connections.remove(conn_id);
        if self.seats.release_connection(conn_id) {
            tracing::info!(room = %self.room_id, conn = %conn_id, "Seated player disconnected");
            self.bump();
            self.broadcast_seats();
        }
    }

    fn client_message(&mut self, conn_id: &str, text: &str) {
        let msg = match decode_client_message(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(room = %self.room_id, conn = %conn_id, error = %e, "Dropping client message");
                return;
            },
        };

        let now = self.now_ms();
        self.check_clock_at(now);

        match msg {
            ClientMessage::Join {
                seat,
                player_id,
                name,
            } => self.join(conn_id, &seat, player_id.as_deref(), name.as_deref()),
            ClientMessage::Leave { seat } => self.leave(conn_id, seat.as_deref()),
            ClientMessage::SetTime {
                base_seconds,
                increment_seconds,
            } => self.set_time(conn_id, base_seconds, increment_seconds.unwrap_or(0.0)),
            ClientMessage::Reset => self.reset(conn_id),
            other => {
                let Some(action) = other.into_game_action() else {
                    return;
                };
                let ctx = self.context(conn_id, now);
                let outcome = self.game.apply(&ctx, action);
                self.apply_outcome(conn_id, outcome, now);
            },
        }
    }

    fn context(&self, conn_id: &str, now_ms: u64) -> ActionContext<G::Seat> {
        ActionContext {
            seats: self.seats.seats_of(conn_id),
            game_over: self.result.is_some(),
            any_seat_empty: self.seats.any_empty(),
            now_ms,
        }
    }

    fn join(&mut self, conn_id: &str, label: &str, player_id: Option<&str>, name: Option<&str>) {
        let seat: G::Seat = match parse_seat(label) {
            Ok(seat) => seat,
            Err(e) => {
                tracing::debug!(room = %self.room_id, conn = %conn_id, error = %e, "Join rejected");
                return;
            },
        };
        let info = SeatInfo::from_join(conn_id, player_id, name, &seat.to_string());
        if self.seats.claim(seat, info) {
            tracing::info!(room = %self.room_id, conn = %conn_id, seat = %seat, "Seat claimed");
            self.bump();
            self.broadcast_seats();
        }
    }

    fn leave(&mut self, conn_id: &str, label: Option<&str>) {
        let changed = match label {
            Some(label) => match parse_seat::<G::Seat>(label) {
                Ok(seat) => self.seats.release(seat, conn_id),
                Err(e) => {
                    tracing::debug!(room = %self.room_id, conn = %conn_id, error = %e, "Leave rejected");
                    false
                },
            },
            None => self.seats.release_connection(conn_id),
        };
        if changed {
            self.bump();
            self.broadcast_seats();
        }
    }

    fn set_time(&mut self, conn_id: &str, base_seconds: f64, increment_seconds: f64) {
        let pre_game = !self.game.has_started() && !self.clock.running && self.result.is_none();
        let allowed = self.seats.is_seated(conn_id) || self.seats.any_empty();
        if !pre_game || !allowed {
            tracing::debug!(room = %self.room_id, conn = %conn_id, "setTime rejected");
            return;
        }
        let (Some(base_ms), Some(increment_ms)) = (
            seconds_to_ms(base_seconds, self.settings.max_base_ms),
            seconds_to_ms(increment_seconds, self.settings.max_increment_ms),
        ) else {
            tracing::debug!(room = %self.room_id, base_seconds, increment_seconds, "setTime out of range");
            return;
        };
        if self.clock.base_ms == base_ms && self.clock.increment_ms == increment_ms {
            tracing::debug!(room = %self.room_id, conn = %conn_id, "setTime unchanged");
            return;
        }
        self.clock.configure(base_ms, increment_ms);
        self.bump();
        self.broadcast_state();
    }

    fn reset(&mut self, conn_id: &str) {
        if !self.seats.is_seated(conn_id) && !self.seats.any_empty() {
            tracing::debug!(room = %self.room_id, conn = %conn_id, "Reset rejected");
            return;
        }
        let view_before = serde_json::to_value(self.game.view()).ok();
        let clock_before = self.clock.clone();
        let had_result = self.result.is_some();
        self.restart();
        if !had_result
            && clock_before == self.clock
            && view_before.is_some()
            && view_before == serde_json::to_value(self.game.view()).ok()
        {
            tracing::debug!(room = %self.room_id, conn = %conn_id, "Reset had no effect");
            return;
        }
        self.bump();
        self.broadcast_state();
    }

    /// Board, clock and result back to the start. Seats and time control survive.
    fn restart(&mut self) {
        self.game.reset();
        self.clock.reset();
        self.result = None;
    }

    fn apply_outcome(&mut self, conn_id: &str, outcome: Outcome<G::Seat, G::Winner>, now: u64) {
        match outcome {
            Outcome::Ignored => {
                tracing::debug!(room = %self.room_id, conn = %conn_id, "Action ignored");
            },
            Outcome::Changed => {
                self.bump();
                self.broadcast_state();
            },
            Outcome::Moved { mover, turn_passed } => {
                let next = self.game.side_to_move();
                if self.clock.is_timed() && !self.clock.running {
                    self.clock.start(next, now);
                } else {
                    self.clock.hand_off(mover, next, turn_passed, now);
                }
                if let Some(result) = self.game.evaluate_terminal() {
                    self.finish(result, now);
                }
                self.bump();
                self.broadcast_state();
            },
            Outcome::Finished(result) => {
                self.finish(result, now);
                self.bump();
                self.broadcast_state();
            },
            Outcome::Restart => {
                tracing::info!(room = %self.room_id, "Rematch agreed");
                self.restart();
                self.bump();
                self.broadcast_state();
            },
            Outcome::Arrows {
                audience,
                team,
                arrows,
            } => {
                let msg: ServerMessage<'_, ()> = ServerMessage::Arrows {
                    team,
                    arrows: &arrows,
                };
                let Some(data) = self.encode(&msg) else {
                    return;
                };
                for id in self.seats.connections_at(&audience) {
                    if let Some(sender) = self.connections.get(id) {
                        send_or_skip(sender, data.clone(), &self.room_id, id);
                    }
                }
            },
        }
    }

    fn finish(&mut self, result: GameResult<G::Winner>, now: u64) {
        tracing::info!(room = %self.room_id, result = ?result, "Game over");
        self.clock.stop(now);
        self.result = Some(result);
    }

    fn check_clock(&mut self) {
        let now = self.now_ms();
        self.check_clock_at(now);
    }

    /// Charge elapsed time and declare a timeout if the active seat flagged.
    fn check_clock_at(&mut self, now: u64) {
        self.clock.tick(now);
        let Some(flagged) = self.clock.flagged() else {
            return;
        };
        self.clock.expire(flagged);
        let winner = self.game.timeout_winner(flagged);
        tracing::info!(room = %self.room_id, seat = %flagged, "Clock flagged");
        self.result = Some(GameResult::Timeout { winner });
        self.bump();
        self.broadcast_state();
        self.schedule_auto_reset();
    }

    fn schedule_auto_reset(&mut self) {
        self.reset_token += 1;
        let token = self.reset_token;
        let expected_sequence = self.sequence;
        let delay = self.settings.auto_reset_delay;
        let weak = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = weak.upgrade() {
                let _ = tx
                    .send(RoomCommand::AutoReset {
                        token,
                        expected_sequence,
                    })
                    .await;
            }
        });
    }

    fn auto_reset(&mut self, token: u64, expected_sequence: u64) {
        let still_timed_out = self.result.as_ref().is_some_and(GameResult::is_timeout);
        if token != self.reset_token || expected_sequence != self.sequence || !still_timed_out {
            tracing::debug!(room = %self.room_id, token, expected_sequence, "Stale auto-reset skipped");
            return;
        }
        tracing::info!(room = %self.room_id, "Auto-reset after timeout");
        self.restart();
        self.bump();
        self.broadcast_state();
    }

    fn bump(&mut self) {
        self.sequence += 1;
    }

    fn snapshot(&self, now: u64) -> RoomSnapshot<'_, G::Seat, G::Winner, G::View> {
        RoomSnapshot {
            room_id: &self.room_id,
            game: self.game.kind(),
            sequence: self.sequence,
            seats: &self.seats,
            clock: &self.clock,
            server_now_ms: now,
            result: self.result.as_ref(),
            board: self.game.view(),
        }
    }

    fn encode<T: Serialize>(&self, msg: &ServerMessage<'_, T>) -> Option<Bytes> {
        match encode_server_message(msg) {
            Ok(text) => Some(Bytes::from(text)),
            Err(e) => {
                tracing::error!(room = %self.room_id, error = %e, "Failed to encode message");
                None
            },
        }
    }

    fn encode_state(&self) -> Option<Bytes> {
        let snapshot = self.snapshot(self.now_ms());
        self.encode(&ServerMessage::State { state: &snapshot })
    }

    fn broadcast_state(&self) {
        if let Some(data) = self.encode_state() {
            self.broadcast(&data);
        }
    }

    fn broadcast_seats(&self) {
        let msg = ServerMessage::Seats {
            seats: &self.seats,
            seq: self.sequence,
        };
        if let Some(data) = self.encode(&msg) {
            self.broadcast(&data);
        }
    }

    fn broadcast(&self, data: &Bytes) {
        for (conn_id, sender) in &self.connections {
            send_or_skip(sender, data.clone(), &self.room_id, conn_id);
        }
    }
}

fn send_or_skip(sender: &PlayerSender, data: Bytes, room: &str, conn: &str) {
    if let Err(e) = sender.try_send(data) {
        tracing::debug!(room, conn, error = %e, "Skipping send to slow client");
    }
}

/// Convert client-supplied seconds to milliseconds, rejecting negative,
/// non-finite and over-limit values.
fn seconds_to_ms(seconds: f64, max_ms: u64) -> Option<u64> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let ms = (seconds * 1000.0).round();
    if ms > max_ms as f64 {
        return None;
    }
    Some(ms as u64)
}

#[cfg(all(test, feature = "chess"))]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    use gambit_chess::ChessGame;
    use gambit_chess::standard::ShakmatyOracle;

    const WAIT: Duration = Duration::from_secs(600);

    struct Client {
        id: String,
        rx: mpsc::Receiver<Bytes>,
    }

    impl Client {
        async fn connect(room: &mpsc::Sender<RoomCommand>, id: &str) -> Self {
            let (tx, rx) = mpsc::channel(64);
            room.send(RoomCommand::Connect {
                conn_id: id.to_string(),
                sender: tx,
            })
            .await
            .unwrap();
            let mut client = Self {
                id: id.to_string(),
                rx,
            };
            assert_eq!(client.next().await["type"], "welcome");
            assert_eq!(client.next().await["type"], "state");
            client
        }

        async fn next(&mut self) -> Value {
            let data = tokio::time::timeout(WAIT, self.rx.recv())
                .await
                .expect("timed out waiting for room message")
                .expect("room dropped the connection");
            serde_json::from_slice(&data).unwrap()
        }

        async fn next_state(&mut self) -> Value {
            loop {
                let msg = self.next().await;
                if msg["type"] == "state" {
                    return msg["state"].clone();
                }
            }
        }

        async fn send(&self, room: &mpsc::Sender<RoomCommand>, msg: Value) {
            room.send(RoomCommand::Client {
                conn_id: self.id.clone(),
                text: msg.to_string(),
            })
            .await
            .unwrap();
        }

        fn try_next(&mut self) -> Option<Value> {
            self.rx
                .try_recv()
                .ok()
                .map(|data| serde_json::from_slice(&data).unwrap())
        }
    }

    fn chess_room() -> mpsc::Sender<RoomCommand> {
        let (tx, _handle) = spawn_room(
            "test-chess-1".to_string(),
            ChessGame::<ShakmatyOracle>::new(),
            RoomSettings::default(),
        );
        tx
    }

    async fn inspect(room: &mpsc::Sender<RoomCommand>) -> Value {
        let (reply, rx) = oneshot::channel();
        room.send(RoomCommand::Inspect { reply }).await.unwrap();
        rx.await.unwrap()
    }

    /// Two players seated as w and b, with both seat broadcasts drained.
    async fn seated_pair(room: &mpsc::Sender<RoomCommand>) -> (Client, Client) {
        let mut white = Client::connect(room, "white").await;
        let mut black = Client::connect(room, "black").await;
        white.send(room, json!({"type": "join", "side": "w", "name": "Ann"})).await;
        black.send(room, json!({"type": "join", "side": "b", "name": "Bo"})).await;
        for client in [&mut white, &mut black] {
            assert_eq!(client.next().await["type"], "seats");
            assert_eq!(client.next().await["type"], "seats");
        }
        (white, black)
    }

    #[tokio::test(start_paused = true)]
    async fn connect_sends_welcome_then_state_without_bump() {
        let room = chess_room();
        let (tx, mut rx) = mpsc::channel(8);
        room.send(RoomCommand::Connect {
            conn_id: "c1".into(),
            sender: tx,
        })
        .await
        .unwrap();
        let welcome: Value = serde_json::from_slice(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(welcome["connectionId"], "c1");
        assert_eq!(welcome["roomId"], "test-chess-1");
        assert_eq!(welcome["game"], "chess");
        let state: Value = serde_json::from_slice(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(state["state"]["sequence"], 0);
        assert_eq!(state["state"]["seats"], json!({"w": null, "b": null}));
        assert_eq!(state["state"]["clock"]["baseMs"], 300_000);
    }

    #[tokio::test(start_paused = true)]
    async fn join_and_leave_broadcast_seats_with_rising_seq() {
        let room = chess_room();
        let mut a = Client::connect(&room, "a").await;
        let mut b = Client::connect(&room, "b").await;

        a.send(&room, json!({"type": "join", "seat": "w", "playerId": "p1"})).await;
        let msg = b.next().await;
        assert_eq!(msg["type"], "seats");
        assert_eq!(msg["seq"], 1);
        assert_eq!(msg["seats"]["w"]["playerId"], "p1");
        assert_eq!(msg["seats"]["w"]["displayName"], "Player w");
        assert_eq!(a.next().await["seq"], 1);

        // Taken seat: no change, no broadcast.
        b.send(&room, json!({"type": "join", "seat": "w"})).await;
        // Unowned seat: ignored.
        b.send(&room, json!({"type": "leave", "seat": "w"})).await;
        a.send(&room, json!({"type": "leave", "seat": "w"})).await;
        let msg = b.next().await;
        assert_eq!(msg["seq"], 2);
        assert!(msg["seats"]["w"].is_null());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_releases_seats() {
        let room = chess_room();
        let (_white, mut black) = seated_pair(&room).await;
        room.send(RoomCommand::Disconnect {
            conn_id: "white".into(),
        })
        .await
        .unwrap();
        let msg = black.next().await;
        assert_eq!(msg["type"], "seats");
        assert!(msg["seats"]["w"].is_null());
        assert_eq!(msg["seats"]["b"]["connectionId"], "black");
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_and_illegal_messages_are_dropped() {
        let room = chess_room();
        let (white, mut black) = seated_pair(&room).await;
        room.send(RoomCommand::Client {
            conn_id: "white".into(),
            text: "{not json".into(),
        })
        .await
        .unwrap();
        white.send(&room, json!({"type": "teleport"})).await;
        // Black moving on white's turn.
        black.send(&room, json!({"type": "move", "from": "e7", "to": "e5"})).await;
        // Illegal white move.
        white.send(&room, json!({"type": "move", "from": "e2", "to": "e5"})).await;

        let snap = inspect(&room).await;
        assert_eq!(snap["sequence"], 2);
        assert!(black.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clock_starts_on_first_move() {
        let room = chess_room();
        let (mut white, _black) = seated_pair(&room).await;
        let snap = inspect(&room).await;
        assert_eq!(snap["clock"]["running"], false);
        assert!(snap["clock"]["lastTickAtMs"].is_null());

        white.send(&room, json!({"type": "move", "from": "e2", "to": "e4"})).await;
        let state = white.next_state().await;
        assert_eq!(state["sequence"], 3);
        assert_eq!(state["clock"]["running"], true);
        assert_eq!(state["clock"]["activeColor"], "b");
        assert_eq!(state["clock"]["remainingMs"]["w"], 300_000);
        assert_eq!(state["turn"], "b");
    }

    #[tokio::test(start_paused = true)]
    async fn increment_credited_after_move() {
        let room = chess_room();
        let (mut white, black) = seated_pair(&room).await;
        white
            .send(&room, json!({"type": "setTime", "baseSeconds": 60, "incrementSeconds": 2}))
            .await;
        white.next_state().await;
        white.send(&room, json!({"type": "move", "from": "e2", "to": "e4"})).await;
        white.next_state().await;

        tokio::time::sleep(Duration::from_secs(5)).await;
        black.send(&room, json!({"type": "move", "from": "e7", "to": "e5"})).await;
        let snap = inspect(&room).await;
        assert_eq!(snap["clock"]["remainingMs"]["b"], 57_000);
        assert_eq!(snap["clock"]["remainingMs"]["w"], 60_000);
        assert_eq!(snap["clock"]["activeColor"], "w");
    }

    #[tokio::test(start_paused = true)]
    async fn set_time_only_before_the_game() {
        let room = chess_room();
        let (mut white, black) = seated_pair(&room).await;
        let mut spectator = Client::connect(&room, "watcher").await;

        // Spectators cannot configure a full room.
        spectator
            .send(&room, json!({"type": "setTime", "baseSeconds": 10}))
            .await;
        // Out of range values are ignored.
        white
            .send(&room, json!({"type": "setTime", "baseSeconds": 999999}))
            .await;
        white
            .send(&room, json!({"type": "setTime", "baseSeconds": -3}))
            .await;
        black
            .send(&room, json!({"type": "setTime", "baseSeconds": 0}))
            .await;
        let state = white.next_state().await;
        assert_eq!(state["sequence"], 3);
        assert_eq!(state["clock"]["baseMs"], 0);

        white.send(&room, json!({"type": "move", "from": "d2", "to": "d4"})).await;
        let state = white.next_state().await;
        assert_eq!(state["clock"]["running"], false, "untimed rooms never start");

        white
            .send(&room, json!({"type": "setTime", "baseSeconds": 120}))
            .await;
        let snap = inspect(&room).await;
        assert_eq!(snap["clock"]["baseMs"], 0);
        assert_eq!(snap["sequence"], 4);
        assert!(spectator.try_next().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_configuration_bumps_once() {
        let room = chess_room();
        let (mut white, _black) = seated_pair(&room).await;

        let set = json!({"type": "setTime", "baseSeconds": 90, "incrementSeconds": 1});
        white.send(&room, set.clone()).await;
        assert_eq!(white.next_state().await["sequence"], 3);
        white.send(&room, set).await;
        white.send(&room, json!({"type": "reset"})).await;
        assert_eq!(inspect(&room).await["sequence"], 3);
        assert!(white.try_next().is_none());

        white.send(&room, json!({"type": "move", "from": "e2", "to": "e4"})).await;
        assert_eq!(white.next_state().await["sequence"], 4);
        white.send(&room, json!({"type": "reset"})).await;
        let state = white.next_state().await;
        assert_eq!(state["sequence"], 5);
        assert_eq!(state["clock"]["remainingMs"]["w"], 90_000);
        white.send(&room, json!({"type": "reset"})).await;
        assert_eq!(inspect(&room).await["sequence"], 5);
    }

    #[tokio::test(start_paused = true)]
    async fn watchdog_flags_idle_player_then_auto_resets() {
        let room = chess_room();
        let (mut white, _black) = seated_pair(&room).await;
        white
            .send(&room, json!({"type": "setTime", "baseSeconds": 1}))
            .await;
        white.next_state().await;
        white.send(&room, json!({"type": "move", "from": "e2", "to": "e4"})).await;
        let moved = white.next_state().await;
        let started = Instant::now();

        let state = white.next_state().await;
        assert!(started.elapsed() <= Duration::from_millis(1250));
        assert_eq!(state["result"], json!({"type": "timeout", "winner": "w"}));
        assert_eq!(state["clock"]["remainingMs"]["b"], 0);
        assert_eq!(state["clock"]["running"], false);
        assert!(state["clock"]["lastTickAtMs"].is_null());
        assert_eq!(state["sequence"], moved["sequence"].as_u64().unwrap() + 1);

        // Moves after the result are ignored.
        white.send(&room, json!({"type": "move", "from": "d2", "to": "d4"})).await;

        let reset = white.next_state().await;
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(60), "reset came after {waited:?}");
        assert!(reset["result"].is_null());
        assert_eq!(reset["clock"]["baseMs"], 1000);
        assert_eq!(reset["clock"]["remainingMs"]["b"], 1000);
        assert_eq!(reset["turn"], "w");
        assert_eq!(reset["sequence"], state["sequence"].as_u64().unwrap() + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_after_timeout_cancels_auto_reset() {
        let room = chess_room();
        let (mut white, _black) = seated_pair(&room).await;
        white
            .send(&room, json!({"type": "setTime", "baseSeconds": 1}))
            .await;
        white.next_state().await;
        white.send(&room, json!({"type": "move", "from": "e2", "to": "e4"})).await;
        white.next_state().await;
        let timeout = white.next_state().await;
        assert_eq!(timeout["result"]["type"], "timeout");

        let _late = Client::connect(&room, "late").await;
        white.send(&room, json!({"type": "leave", "seat": "w"})).await;
        assert_eq!(white.next().await["type"], "seats");

        tokio::time::sleep(Duration::from_secs(90)).await;
        let snap = inspect(&room).await;
        assert_eq!(snap["result"]["type"], "timeout");
        assert!(white.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn resignation_stops_the_clock_and_reset_restores_it() {
        let room = chess_room();
        let (mut white, mut black) = seated_pair(&room).await;
        white.send(&room, json!({"type": "move", "from": "e2", "to": "e4"})).await;
        white.next_state().await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        black.send(&room, json!({"type": "resign"})).await;
        let state = white.next_state().await;
        assert_eq!(state["result"], json!({"type": "resign", "winner": "w"}));
        assert_eq!(state["clock"]["running"], false);
        assert_eq!(state["clock"]["remainingMs"]["b"], 297_000);

        black.send(&room, json!({"type": "reset"})).await;
        let state = white.next_state().await;
        assert!(state["result"].is_null());
        assert_eq!(state["clock"]["remainingMs"]["b"], 300_000);
        assert_eq!(state["seats"]["b"]["connectionId"], "black");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_room_shuts_down() {
        let settings = RoomSettings {
            idle_timeout: Duration::from_secs(30),
            ..RoomSettings::default()
        };
        let (tx, handle) =
            spawn_room("idle-chess-1".into(), ChessGame::<ShakmatyOracle>::new(), settings);
        let client = Client::connect(&tx, "c").await;
        tx.send(RoomCommand::Disconnect {
            conn_id: client.id.clone(),
        })
        .await
        .unwrap();
        tokio::time::timeout(Duration::from_secs(31), handle)
            .await
            .expect("room should stop after the idle timeout")
            .unwrap();
        assert!(tx.is_closed());
    }

    #[cfg(feature = "quad")]
    #[tokio::test(start_paused = true)]
    async fn ffa_leader_claims_the_win() {
        use gambit_quad::QuadChess;
        use gambit_quad::board::{Board, Kind, Piece, Sq};
        use gambit_quad::color::{Color, Variant};

        let mut board = Board::empty();
        for (at, kind, color) in [
            ("h1", Kind::King, Color::Red),
            ("a8", Kind::King, Color::Blue),
            ("e5", Kind::Queen, Color::Red),
        ] {
            let sq: Sq = at.parse().unwrap();
            board.put(sq, Some(Piece::new(kind, color)));
        }
        let game = QuadChess::from_position(Variant::Ffa, board, Color::Blue)
            .with_scores([(Color::Red, 25), (Color::Blue, 0)]);
        let (room, _handle) = spawn_room("ffa-quad-1".to_string(), game, RoomSettings::default());

        let mut red = Client::connect(&room, "red").await;
        red.send(&room, json!({"type": "join", "seat": "red"})).await;
        assert_eq!(red.next().await["type"], "seats");

        red.send(&room, json!({"type": "claimWin"})).await;
        let state = red.next_state().await;
        assert_eq!(state["result"], json!({"type": "win", "winner": "red"}));
        assert_eq!(state["clock"]["running"], false);

        red.send(&room, json!({"type": "claimWin"})).await;
        assert_eq!(inspect(&room).await["sequence"], 2);
        assert!(red.try_next().is_none());
    }

    #[test]
    fn seconds_conversion_bounds() {
        assert_eq!(seconds_to_ms(1.5, 10_000), Some(1500));
        assert_eq!(seconds_to_ms(0.0, 10_000), Some(0));
        assert_eq!(seconds_to_ms(10.0, 10_000), Some(10_000));
        assert_eq!(seconds_to_ms(10.001, 10_000), None);
        assert_eq!(seconds_to_ms(-1.0, 10_000), None);
        assert_eq!(seconds_to_ms(f64::NAN, 10_000), None);
    }
}
