#[allow(dead_code)]
mod common;

use common::{Player, TestServer};

#[tokio::test]
async fn health_reports_connections_and_rooms() {
    let server = TestServer::new().await;
    let _player = Player::connect(&server, "hp-chess-1").await;

    let body: serde_json::Value = reqwest::get(format!("{}/health", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"]["websocket"], 1);
    assert_eq!(body["rooms"]["active"], 1);
    assert_eq!(body["rooms"]["byGame"]["chess"], 1);
    assert_eq!(body["games"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn ready_when_games_are_compiled_in() {
    let server = TestServer::new().await;
    let text = reqwest::get(format!("{}/ready", server.base_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(text, "ready");
}

#[tokio::test]
async fn create_list_and_inspect_rooms() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/v1/rooms", server.base_url()))
        .json(&serde_json::json!({ "game": "quad", "board": "b2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    let room_id = body["roomId"].as_str().unwrap().to_string();
    assert!(room_id.ends_with("-quad-b2"));

    let rooms: serde_json::Value = client
        .get(format!("{}/api/v1/rooms", server.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms[0]["roomId"], room_id.as_str());
    assert_eq!(rooms[0]["game"], "quad");

    let snapshot: serde_json::Value = client
        .get(format!("{}/api/v1/rooms/{room_id}", server.base_url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot["roomId"], room_id.as_str());
    assert_eq!(snapshot["variant"], "2v2");
    assert_eq!(snapshot["sequence"], 0);
    assert!(snapshot["seats"]["green"].is_null());
}

#[tokio::test]
async fn room_lookup_errors() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/v1/rooms/nobody-chess-1", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .get(format!("{}/api/v1/rooms/not-a-room", server.base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("unknown game"));

    let resp = client
        .post(format!("{}/api/v1/rooms", server.base_url()))
        .json(&serde_json::json!({ "game": "poker" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn room_limit_returns_unavailable() {
    let mut config = gambit_server::config::ServerConfig::default();
    config.limits.max_rooms = 1;
    let server = TestServer::from_config(config).await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/rooms", server.base_url());

    let first = client
        .post(&url)
        .json(&serde_json::json!({ "game": "chess" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);
    let second = client
        .post(&url)
        .json(&serde_json::json!({ "game": "chess" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 503);
}
