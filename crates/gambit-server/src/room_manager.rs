use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use gambit_core::room::{GameKind, RoomId, RoomIdError, generate_room_code};

use crate::config::ServerConfig;
use crate::room_actor::{RoomCommand, RoomSettings, spawn_room};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// The registry already holds `max_rooms` live rooms.
    Full,
    /// The game's engine was not compiled into this server.
    Unsupported(GameKind),
    InvalidId(RoomIdError),
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "room limit reached"),
            Self::Unsupported(kind) => write!(f, "game {kind} is not enabled on this server"),
            Self::InvalidId(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RoomError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub game: GameKind,
}

struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
    game: GameKind,
    task: JoinHandle<()>,
}

impl RoomHandle {
    fn is_live(&self) -> bool {
        !self.task.is_finished() && !self.sender.is_closed()
    }
}

/// Registry of live room actors, keyed by the room id string.
pub struct RoomManager {
    rooms: HashMap<String, RoomHandle>,
    settings: RoomSettings,
    arrow_ttl_ms: u64,
    max_rooms: usize,
}

impl RoomManager {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            settings: RoomSettings::from_config(config),
            arrow_ttl_ms: config.quad.arrow_ttl_secs * 1000,
            max_rooms: config.limits.max_rooms,
        }
    }

    /// Command channel of the room, spawning its actor on first use.
    /// A room whose actor already stopped is replaced by a fresh one.
    pub fn get_or_create(&mut self, id: &RoomId) -> Result<mpsc::Sender<RoomCommand>, RoomError> {
        let key = id.to_string();
        if let Some(handle) = self.rooms.get(&key) {
            if handle.is_live() {
                return Ok(handle.sender.clone());
            }
            self.rooms.remove(&key);
        }
        if self.rooms.len() >= self.max_rooms {
            self.cleanup_finished();
            if self.rooms.len() >= self.max_rooms {
                tracing::warn!(room = %key, max = self.max_rooms, "Room limit reached");
                return Err(RoomError::Full);
            }
        }
        let (sender, task) = spawn_game(id, self.settings.clone(), self.arrow_ttl_ms)?;
        self.rooms.insert(
            key,
            RoomHandle {
                sender: sender.clone(),
                game: id.game(),
                task,
            },
        );
        Ok(sender)
    }

    /// Create a room under a freshly generated base code.
    pub fn create_room(&mut self, game: GameKind, board: &str) -> Result<RoomId, RoomError> {
        let id = loop {
            let id = RoomId::new(&generate_room_code(), game, board).map_err(RoomError::InvalidId)?;
            if !self.rooms.contains_key(&id.to_string()) {
                break id;
            }
        };
        self.get_or_create(&id)?;
        Ok(id)
    }

    /// Command channel of a live room, without creating one.
    pub fn get(&self, room_id: &str) -> Option<mpsc::Sender<RoomCommand>> {
        self.rooms
            .get(room_id)
            .filter(|h| h.is_live())
            .map(|h| h.sender.clone())
    }

    pub fn list(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .iter()
            .filter(|(_, h)| h.is_live())
            .map(|(id, h)| RoomSummary {
                room_id: id.clone(),
                game: h.game,
            })
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }

    pub fn active_count(&self) -> usize {
        self.rooms.values().filter(|h| h.is_live()).count()
    }

    /// Live rooms per game, omitting games with none.
    pub fn counts_by_game(&self) -> BTreeMap<GameKind, usize> {
        let mut counts = BTreeMap::new();
        for handle in self.rooms.values().filter(|h| h.is_live()) {
            *counts.entry(handle.game).or_insert(0) += 1;
        }
        counts
    }

    /// Forget rooms whose actor has stopped. Returns the number removed.
    pub fn cleanup_finished(&mut self) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|_, h| h.is_live());
        before - self.rooms.len()
    }
}

/// Whether this build can host `kind`.
pub fn is_supported(kind: GameKind) -> bool {
    match kind {
        GameKind::Chess => cfg!(feature = "chess"),
        GameKind::Checkers => cfg!(feature = "checkers"),
        GameKind::Goose => cfg!(feature = "goose"),
        GameKind::Quad => cfg!(feature = "quad"),
    }
}

/// Games compiled into this build.
pub fn available_games() -> Vec<GameKind> {
    GameKind::ALL.into_iter().filter(|&k| is_supported(k)).collect()
}

#[cfg_attr(
    not(all(
        feature = "chess",
        feature = "checkers",
        feature = "goose",
        feature = "quad"
    )),
    allow(unused_variables)
)]
fn spawn_game(
    id: &RoomId,
    settings: RoomSettings,
    arrow_ttl_ms: u64,
) -> Result<(mpsc::Sender<RoomCommand>, JoinHandle<()>), RoomError> {
    let room_id = id.to_string();
    match id.game() {
        #[cfg(feature = "chess")]
        GameKind::Chess => Ok(spawn_room(
            room_id,
            gambit_chess::ChessGame::<gambit_chess::standard::ShakmatyOracle>::new(),
            settings,
        )),
        #[cfg(feature = "checkers")]
        GameKind::Checkers => Ok(spawn_room(
            room_id,
            gambit_checkers::Checkers::new(),
            settings,
        )),
        #[cfg(feature = "goose")]
        GameKind::Goose => Ok(spawn_room(
            room_id,
            gambit_goose::GooseChess::new(),
            settings,
        )),
        #[cfg(feature = "quad")]
        GameKind::Quad => Ok(spawn_room(
            room_id,
            gambit_quad::QuadChess::default().with_arrow_ttl(arrow_ttl_ms),
            settings,
        )),
        #[allow(unreachable_patterns)]
        other => Err(RoomError::Unsupported(other)),
    }
}

#[cfg(all(
    test,
    feature = "chess",
    feature = "checkers",
    feature = "goose",
    feature = "quad"
))]
mod tests {
    use super::*;

    fn manager(max_rooms: usize) -> RoomManager {
        let mut config = ServerConfig::default();
        config.limits.max_rooms = max_rooms;
        RoomManager::new(&config)
    }

    #[tokio::test]
    async fn get_or_create_reuses_live_room() {
        let mut rooms = manager(10);
        let id: RoomId = "abc-chess-1".parse().unwrap();
        let a = rooms.get_or_create(&id).unwrap();
        let b = rooms.get_or_create(&id).unwrap();
        assert!(a.same_channel(&b));
        assert_eq!(rooms.active_count(), 1);
        assert!(rooms.get("abc-chess-1").is_some());
        assert!(rooms.get("abc-chess-2").is_none());
    }

    #[tokio::test]
    async fn boards_of_one_base_are_separate_rooms() {
        let mut rooms = manager(10);
        rooms.get_or_create(&"abc-goose-1".parse().unwrap()).unwrap();
        rooms.get_or_create(&"abc-goose-2".parse().unwrap()).unwrap();
        rooms.get_or_create(&"abc-quad-1".parse().unwrap()).unwrap();
        let listed = rooms.list();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].room_id, "abc-goose-1");
        assert_eq!(listed[2].game, GameKind::Quad);
        let counts = rooms.counts_by_game();
        assert_eq!(counts.get(&GameKind::Goose), Some(&2));
        assert_eq!(counts.get(&GameKind::Chess), None);
    }

    #[tokio::test]
    async fn room_limit_is_enforced() {
        let mut rooms = manager(2);
        rooms.create_room(GameKind::Chess, "1").unwrap();
        rooms.create_room(GameKind::Checkers, "1").unwrap();
        assert_eq!(
            rooms.create_room(GameKind::Chess, "1"),
            Err(RoomError::Full)
        );
    }

    #[tokio::test]
    async fn invalid_board_key_is_rejected() {
        let mut rooms = manager(10);
        assert!(matches!(
            rooms.create_room(GameKind::Goose, "no-dash"),
            Err(RoomError::InvalidId(RoomIdError::InvalidBoard(_)))
        ));
        assert_eq!(rooms.active_count(), 0);
    }

    #[tokio::test]
    async fn created_rooms_get_unique_codes() {
        let mut rooms = manager(100);
        let mut ids: Vec<String> = (0..20)
            .map(|_| rooms.create_room(GameKind::Checkers, "main").unwrap().to_string())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert!(ids.iter().all(|id| id.ends_with("-checkers-main")));
    }

    #[tokio::test]
    async fn stopped_rooms_are_swept_and_replaced() {
        let mut rooms = manager(10);
        let id: RoomId = "abc-chess-1".parse().unwrap();
        rooms.get_or_create(&id).unwrap();
        if let Some(handle) = rooms.rooms.get("abc-chess-1") {
            handle.task.abort();
        }
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(rooms.active_count(), 0);
        assert!(rooms.get("abc-chess-1").is_none());

        let fresh = rooms.get_or_create(&id).unwrap();
        assert!(!fresh.is_closed());
        assert_eq!(rooms.active_count(), 1);
        assert_eq!(rooms.cleanup_finished(), 0);
    }

    #[test]
    fn default_build_hosts_every_game() {
        assert_eq!(available_games(), GameKind::ALL.to_vec());
        assert!(is_supported(GameKind::Quad));
    }
}
