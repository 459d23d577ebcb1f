use serde::Serialize;

use crate::clock::ClockState;
use crate::result::GameResult;
use crate::room::GameKind;
use crate::seat::{Seat, Seats};

/// Full authoritative room state as broadcast in a `state` message.
/// The engine's own view is flattened into the top level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot<'a, S: Seat, W: Serialize, V: Serialize> {
    pub room_id: &'a str,
    pub game: GameKind,
    pub sequence: u64,
    pub seats: &'a Seats<S>,
    pub clock: &'a ClockState<S>,
    pub server_now_ms: u64,
    pub result: Option<&'a GameResult<W>>,
    #[serde(flatten)]
    pub board: V,
}
