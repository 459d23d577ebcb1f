use std::fmt;

use serde::{Deserialize, Serialize};

use crate::negotiation::{DrawAction, RematchAction};
use crate::room::GameKind;

/// Maximum accepted inbound frame size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 4096;

/// Messages sent from clients to a room, discriminated by `type`.
///
/// Unknown `type` values and malformed payloads fail to decode; the room
/// logs and drops them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join")]
    Join {
        #[serde(alias = "side", alias = "color", alias = "seatColor", alias = "seat-color")]
        seat: String,
        #[serde(default, rename = "playerId")]
        player_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    #[serde(rename = "leave")]
    Leave {
        #[serde(
            default,
            alias = "side",
            alias = "color",
            alias = "seatColor",
            alias = "seat-color"
        )]
        seat: Option<String>,
    },
    #[serde(rename = "move")]
    Move {
        from: String,
        to: String,
        #[serde(default)]
        promotion: Option<String>,
    },
    #[serde(rename = "setTime")]
    SetTime {
        #[serde(rename = "baseSeconds")]
        base_seconds: f64,
        #[serde(default, rename = "incrementSeconds")]
        increment_seconds: Option<f64>,
    },
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "resign")]
    Resign,
    #[serde(rename = "draw:offer")]
    DrawOffer,
    #[serde(rename = "draw:accept")]
    DrawAccept,
    #[serde(rename = "draw:decline")]
    DrawDecline,
    #[serde(rename = "draw:cancel")]
    DrawCancel,
    #[serde(rename = "rematch:request")]
    RematchRequest,
    #[serde(rename = "rematch:decline")]
    RematchDecline,
    #[serde(rename = "rematch:cancel")]
    RematchCancel,
    #[serde(rename = "goose")]
    Goose { square: String },
    #[serde(rename = "suggestArrow")]
    SuggestArrow { from: String, to: String },
    #[serde(rename = "clearArrows")]
    ClearArrows,
    #[serde(rename = "claimWin")]
    ClaimWin,
    #[serde(rename = "setVariant")]
    SetVariant { variant: String },
}

/// The part of a client message that is handed to the game engine.
/// Seat, time-control and reset handling stay in the room.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    Move {
        from: String,
        to: String,
        promotion: Option<String>,
    },
    Resign,
    Draw(DrawAction),
    Rematch(RematchAction),
    Goose {
        square: String,
    },
    SuggestArrow {
        from: String,
        to: String,
    },
    ClearArrows,
    ClaimWin,
    SetVariant {
        variant: String,
    },
}

impl ClientMessage {
    /// Split off engine-level actions. Returns `None` for room-level messages.
    pub fn into_game_action(self) -> Option<GameAction> {
        Some(match self {
            Self::Move {
                from,
                to,
                promotion,
            } => GameAction::Move {
                from,
                to,
                promotion,
            },
            Self::Resign => GameAction::Resign,
            Self::DrawOffer => GameAction::Draw(DrawAction::Offer),
            Self::DrawAccept => GameAction::Draw(DrawAction::Accept),
            Self::DrawDecline => GameAction::Draw(DrawAction::Decline),
            Self::DrawCancel => GameAction::Draw(DrawAction::Cancel),
            Self::RematchRequest => GameAction::Rematch(RematchAction::Request),
            Self::RematchDecline => GameAction::Rematch(RematchAction::Decline),
            Self::RematchCancel => GameAction::Rematch(RematchAction::Cancel),
            Self::Goose { square } => GameAction::Goose { square },
            Self::SuggestArrow { from, to } => GameAction::SuggestArrow { from, to },
            Self::ClearArrows => GameAction::ClearArrows,
            Self::ClaimWin => GameAction::ClaimWin,
            Self::SetVariant { variant } => GameAction::SetVariant { variant },
            Self::Join { .. } | Self::Leave { .. } | Self::SetTime { .. } | Self::Reset => {
                return None;
            },
        })
    }
}

/// A move suggestion shared between teammates. Never part of game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub from: String,
    pub to: String,
    pub by: String,
    pub expires_at_ms: u64,
}

/// Messages sent from a room to its clients, discriminated by `type`.
///
/// `T` is the snapshot payload type; it is unused by `Welcome` and `Arrows`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage<'a, T: Serialize> {
    Welcome {
        connection_id: &'a str,
        room_id: &'a str,
        game: GameKind,
    },
    State {
        state: &'a T,
    },
    Seats {
        seats: &'a T,
        seq: u64,
    },
    Arrows {
        team: &'a str,
        arrows: &'a [Arrow],
    },
}

#[derive(Debug)]
pub enum ProtocolError {
    Parse(String),
    UnknownSeat(String),
    Encode(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "malformed client message: {e}"),
            Self::UnknownSeat(s) => write!(f, "unknown seat {s:?}"),
            Self::Encode(e) => write!(f, "failed to encode server message: {e}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Parse(e.to_string()))
}

pub fn encode_server_message<T: Serialize>(
    msg: &ServerMessage<'_, T>,
) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Parse a seat label sent by a client into the game's seat type.
pub fn parse_seat<S: std::str::FromStr>(label: &str) -> Result<S, ProtocolError> {
    label
        .parse()
        .map_err(|_| ProtocolError::UnknownSeat(label.to_string()))
}
