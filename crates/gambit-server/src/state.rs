use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::room_manager::RoomManager;

pub type SharedRoomManager = Arc<RwLock<RoomManager>>;

#[derive(Clone)]
pub struct AppState {
    pub rooms: SharedRoomManager,
    pub config: Arc<ServerConfig>,
    pub ws_connection_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(RoomManager::new(&config))),
            config: Arc::new(config),
            ws_connection_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Counts one open connection for as long as it lives.
pub struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self { counter }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}
