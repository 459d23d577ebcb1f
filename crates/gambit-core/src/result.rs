use serde::Serialize;

/// Why a game ended without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawReason {
    Agreement,
    Stalemate,
    Repetition,
    FiftyMove,
    InsufficientMaterial,
}

/// Terminal outcome of a game. Once set, no further moves are accepted
/// until the room is reset or a rematch is agreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameResult<W> {
    Timeout { winner: W },
    Checkmate { winner: W },
    Resign { winner: W },
    Win { winner: W },
    Draw { reason: DrawReason },
}

impl<W> GameResult<W> {
    pub fn winner(&self) -> Option<&W> {
        match self {
            Self::Timeout { winner }
            | Self::Checkmate { winner }
            | Self::Resign { winner }
            | Self::Win { winner } => Some(winner),
            Self::Draw { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
