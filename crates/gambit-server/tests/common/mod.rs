use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use gambit_core::sequence::SnapshotGate;
use gambit_server::config::ServerConfig;
use gambit_server::{build_app, spawn_room_sweeper};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);
        spawn_room_sweeper(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, room_id: &str) -> String {
        format!("ws://{}/ws/{room_id}", self.addr)
    }
}

/// A connected client that has consumed its welcome and initial state.
pub struct Player {
    pub stream: WsStream,
    pub connection_id: String,
    pub gate: SnapshotGate,
}

impl Player {
    pub async fn connect(server: &TestServer, room_id: &str) -> Self {
        let mut stream = ws_connect(&server.ws_url(room_id)).await;
        let welcome = ws_read_json(&mut stream).await;
        assert_eq!(welcome["type"], "welcome", "unexpected first message: {welcome}");
        assert_eq!(welcome["roomId"], room_id);
        let mut player = Self {
            stream,
            connection_id: welcome["connectionId"].as_str().unwrap().to_string(),
            gate: SnapshotGate::new(),
        };
        player.next_state().await;
        player
    }

    pub async fn send(&mut self, msg: Value) {
        ws_send_json(&mut self.stream, &msg).await;
    }

    /// Next message of any type. Snapshot sequence numbers must only rise.
    pub async fn next(&mut self) -> Value {
        let msg = ws_read_json(&mut self.stream).await;
        let seq = match msg["type"].as_str() {
            Some("state") => msg["state"]["sequence"].as_u64(),
            Some("seats") => msg["seq"].as_u64(),
            _ => None,
        };
        if let Some(seq) = seq {
            assert!(self.gate.accept(seq), "stale snapshot {seq}: {msg}");
        }
        msg
    }

    /// Skip ahead to the next full snapshot and return its `state` payload.
    pub async fn next_state(&mut self) -> Value {
        loop {
            let msg = self.next().await;
            if msg["type"] == "state" {
                return msg["state"].clone();
            }
        }
    }

    /// Skip ahead to the next message of `kind`.
    pub async fn next_of(&mut self, kind: &str) -> Value {
        loop {
            let msg = self.next().await;
            if msg["type"] == kind {
                return msg;
            }
        }
    }

    pub async fn join(&mut self, seat: &str, name: &str) {
        self.send(serde_json::json!({ "type": "join", "seat": seat, "name": name }))
            .await;
        // Earlier joins by other players may still be queued ahead of ours.
        loop {
            let seats = self.next_of("seats").await;
            if seats["seats"][seat]["connectionId"] == self.connection_id.as_str() {
                return;
            }
        }
    }

    pub async fn play(&mut self, from: &str, to: &str) {
        self.send(serde_json::json!({ "type": "move", "from": from, "to": to }))
            .await;
    }

    /// Try to read one message, returning None if nothing arrives in time.
    pub async fn try_next(&mut self, timeout_ms: u64) -> Option<Value> {
        ws_try_read_json(&mut self.stream, timeout_ms).await
    }
}

/// Connect a WebSocket client to the given URL.
pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

pub async fn ws_send_json(stream: &mut WsStream, msg: &Value) {
    stream
        .send(Message::Text(msg.to_string().into()))
        .await
        .unwrap();
}

/// Read the next JSON text frame from a WebSocket stream (5s timeout).
pub async fn ws_read_json(stream: &mut WsStream) -> Value {
    let deadline = Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Close(_))) => panic!("WebSocket closed unexpectedly"),
                Some(Err(e)) => panic!("WebSocket error: {e}"),
                None => panic!("WebSocket stream ended"),
                _ => continue,
            }
        }
    })
    .await
    .expect("Timed out waiting for WebSocket message")
}

/// Try to read a JSON text frame, returning None on timeout.
pub async fn ws_try_read_json(stream: &mut WsStream, timeout_ms: u64) -> Option<Value> {
    let deadline = Duration::from_millis(timeout_ms);
    tokio::time::timeout(deadline, async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    panic!("WebSocket error or closed")
                },
                _ => continue,
            }
        }
    })
    .await
    .ok()
}
