use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which rule engine a room runs. Chosen once, when the room is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Chess,
    Checkers,
    Goose,
    Quad,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [Self::Chess, Self::Checkers, Self::Goose, Self::Quad];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chess => "chess",
            Self::Checkers => "checkers",
            Self::Goose => "goose",
            Self::Quad => "quad",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = RoomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| RoomIdError::UnknownGame(s.to_string()))
    }
}

const MAX_BASE_LEN: usize = 32;
const MAX_BOARD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomIdError {
    Format(String),
    InvalidBase(String),
    InvalidBoard(String),
    UnknownGame(String),
}

impl fmt::Display for RoomIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(s) => write!(f, "room id must be base-game-board, got {s:?}"),
            Self::InvalidBase(s) => write!(f, "invalid room base {s:?}"),
            Self::InvalidBoard(s) => write!(f, "invalid board key {s:?}"),
            Self::UnknownGame(s) => write!(f, "unknown game {s:?}"),
        }
    }
}

impl std::error::Error for RoomIdError {}

/// Room identity: `{base}-{game}-{board}`.
///
/// `base` names the shared room (several boards can hang off one base),
/// `game` selects the engine and `board` distinguishes parallel boards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId {
    base: String,
    game: GameKind,
    board: String,
}

fn is_token(s: &str, max: usize) -> bool {
    !s.is_empty() && s.len() <= max && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl RoomId {
    pub fn new(base: &str, game: GameKind, board: &str) -> Result<Self, RoomIdError> {
        if !is_token(base, MAX_BASE_LEN) {
            return Err(RoomIdError::InvalidBase(base.to_string()));
        }
        if !is_token(board, MAX_BOARD_LEN) {
            return Err(RoomIdError::InvalidBoard(board.to_string()));
        }
        Ok(Self {
            base: base.to_string(),
            game,
            board: board.to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    pub fn board(&self) -> &str {
        &self.board
    }
}

impl FromStr for RoomId {
    type Err = RoomIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (Some(base), Some(game), Some(board), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(RoomIdError::Format(s.to_string()));
        };
        Self::new(base, game.parse()?, board)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.base, self.game, self.board)
    }
}

/// Generate a room base code in the format `ABCD1234`.
pub fn generate_room_code() -> String {
    const LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
    let mut rng = rand::rng();
    let mut code = String::with_capacity(8);
    for _ in 0..4 {
        code.push(LETTERS[rng.random_range(0..LETTERS.len())] as char);
    }
    for _ in 0..4 {
        code.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    code
}
