pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod room_actor;
pub mod room_manager;
pub mod state;
pub mod ws;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let web_root = config.web_root.clone();
    let state = AppState::new(config);

    let api_routes = Router::new()
        .route("/rooms", get(api::list_rooms).post(api::create_room))
        .route("/rooms/{room_id}", get(api::get_room));

    let app = Router::new()
        .route("/ws/{room_id}", get(ws::ws_handler))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .fallback_service(ServeDir::new(&web_root))
        .with_state(state.clone());

    (app, state)
}

/// Background task that periodically forgets room actors that shut down.
pub fn spawn_room_sweeper(state: AppState) {
    let period = Duration::from_secs(state.config.rooms.cleanup_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = state.rooms.write().await.cleanup_finished();
            if removed > 0 {
                tracing::info!(removed, "Swept closed rooms");
            }
        }
    });
}
