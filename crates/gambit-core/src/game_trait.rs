use std::fmt::Debug;

use serde::Serialize;

use crate::protocol::{Arrow, GameAction};
use crate::result::GameResult;
use crate::room::GameKind;
use crate::seat::Seat;

/// Core trait every rule engine implements.
///
/// The room actor owns seats, the clock, the sequence counter and the
/// result; the engine owns the board and decides what an action means.
/// Engines never see connections or time beyond [`ActionContext::now_ms`].
pub trait BoardGame: Send + 'static {
    type Seat: Seat;
    /// Who a [`GameResult`] names as winner (a side, a color, or a team).
    type Winner: Clone + Debug + PartialEq + Serialize + Send + 'static;
    /// Engine fields flattened into the room snapshot.
    type View: Serialize;

    fn kind(&self) -> GameKind;

    /// Reinitialize the board to the starting position. Room configuration
    /// owned by the engine (such as a victory mode) survives.
    fn reset(&mut self);

    /// Seat whose clock runs right now.
    fn side_to_move(&self) -> Self::Seat;

    /// Whether at least one move has been played since the last reset.
    fn has_started(&self) -> bool;

    /// Validate and apply a client action. Illegal actions return
    /// [`Outcome::Ignored`] and leave the engine untouched.
    fn apply(
        &mut self,
        ctx: &ActionContext<Self::Seat>,
        action: GameAction,
    ) -> Outcome<Self::Seat, Self::Winner>;

    /// Terminal state reached by the board itself (mate, stalemate, draw
    /// rules, last color standing). Called after every completed move.
    fn evaluate_terminal(&self) -> Option<GameResult<Self::Winner>>;

    /// Winner to record when `flagged` runs out of time.
    fn timeout_winner(&self, flagged: Self::Seat) -> Self::Winner;

    fn view(&self) -> Self::View;
}

/// What the room knows about the sender of an action.
#[derive(Debug, Clone)]
pub struct ActionContext<S> {
    /// Seats held by the sending connection, in turn order.
    pub seats: Vec<S>,
    pub game_over: bool,
    pub any_seat_empty: bool,
    pub now_ms: u64,
}

impl<S: Seat> ActionContext<S> {
    pub fn holds(&self, seat: S) -> bool {
        self.seats.contains(&seat)
    }

    /// Pre-game configuration is open to seated players, and to anyone
    /// while a seat is still empty.
    pub fn may_configure(&self) -> bool {
        !self.seats.is_empty() || self.any_seat_empty
    }
}

/// Effect of [`BoardGame::apply`] that the room must act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<S, W> {
    /// Illegal, unauthorized or not applicable; nothing changed.
    Ignored,
    /// Visible state changed without a move (offers, flags, configuration).
    Changed,
    /// A move completed. `turn_passed` is false when the same seat moves
    /// again (capture chains, the goose phase).
    Moved { mover: S, turn_passed: bool },
    /// The action itself ended the game (resignation, agreement, claim).
    Finished(GameResult<W>),
    /// Both sides agreed to a rematch.
    Restart,
    /// Ephemeral side-channel data for a subset of seats. No state change.
    Arrows {
        audience: Vec<S>,
        team: &'static str,
        arrows: Vec<Arrow>,
    },
}
