pub mod oracle;
pub mod standard;

use serde::Serialize;

use gambit_core::game_trait::{ActionContext, BoardGame, Outcome};
use gambit_core::negotiation::{Negotiation, Verdict};
use gambit_core::protocol::GameAction;
use gambit_core::result::{DrawReason, GameResult};
use gambit_core::room::GameKind;
use gambit_core::side::Side;

use oracle::{MoveLegalityOracle, Status, UciMove};
use standard::ShakmatyOracle;

/// Engine fields of a chess room snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessView {
    pub fen: String,
    pub turn: Side,
    pub in_check: bool,
    pub last_move: Option<UciMove>,
    pub move_count: u32,
    #[serde(flatten)]
    pub negotiation: Negotiation,
}

/// Standard chess. All rules come from the oracle; this layer adds seat
/// authorization, resignation and the draw/rematch protocols.
pub struct ChessGame<O: MoveLegalityOracle + Default = ShakmatyOracle> {
    oracle: O,
    negotiation: Negotiation,
    last_move: Option<UciMove>,
    move_count: u32,
}

impl<O: MoveLegalityOracle + Default> Default for ChessGame<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: MoveLegalityOracle + Default> ChessGame<O> {
    pub fn new() -> Self {
        Self::with_oracle(O::default())
    }

    pub fn with_oracle(oracle: O) -> Self {
        Self {
            oracle,
            negotiation: Negotiation::default(),
            last_move: None,
            move_count: 0,
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The side a multi-seat connection acts as: the side to move if held.
    fn acting_side(&self, ctx: &ActionContext<Side>) -> Option<Side> {
        let turn = self.oracle.turn();
        if ctx.holds(turn) {
            Some(turn)
        } else {
            ctx.seats.first().copied()
        }
    }
}

impl<O: MoveLegalityOracle + Default> BoardGame for ChessGame<O> {
    type Seat = Side;
    type Winner = Side;
    type View = ChessView;

    fn kind(&self) -> GameKind {
        GameKind::Chess
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn side_to_move(&self) -> Side {
        self.oracle.turn()
    }

    fn has_started(&self) -> bool {
        self.move_count > 0
    }

    fn apply(&mut self, ctx: &ActionContext<Side>, action: GameAction) -> Outcome<Side, Side> {
        match action {
            GameAction::Move {
                from,
                to,
                promotion,
            } => {
                let mover = self.oracle.turn();
                if ctx.game_over || !ctx.holds(mover) {
                    return Outcome::Ignored;
                }
                let requested = UciMove::new(&from, &to, promotion.as_deref());
                match self.oracle.play(&requested) {
                    Ok(played) => {
                        self.negotiation.on_move();
                        self.last_move = Some(played);
                        self.move_count += 1;
                        Outcome::Moved {
                            mover,
                            turn_passed: true,
                        }
                    },
                    Err(e) => {
                        tracing::debug!(error = %e, "Rejected chess move");
                        Outcome::Ignored
                    },
                }
            },
            GameAction::Resign => match self.acting_side(ctx) {
                Some(side) if !ctx.game_over => Outcome::Finished(GameResult::Resign {
                    winner: side.opponent(),
                }),
                _ => Outcome::Ignored,
            },
            GameAction::Draw(action) => {
                match self.negotiation.draw(&ctx.seats, action, ctx.game_over) {
                    Verdict::Agreed => Outcome::Finished(GameResult::Draw {
                        reason: DrawReason::Agreement,
                    }),
                    Verdict::Changed => Outcome::Changed,
                    Verdict::Ignored => Outcome::Ignored,
                }
            },
            GameAction::Rematch(action) => {
                match self.negotiation.rematch(&ctx.seats, action, ctx.game_over) {
                    Verdict::Agreed => Outcome::Restart,
                    Verdict::Changed => Outcome::Changed,
                    Verdict::Ignored => Outcome::Ignored,
                }
            },
            _ => Outcome::Ignored,
        }
    }

    fn evaluate_terminal(&self) -> Option<GameResult<Side>> {
        match self.oracle.status() {
            Status::Ongoing => None,
            Status::Checkmate => Some(GameResult::Checkmate {
                winner: self.oracle.turn().opponent(),
            }),
            Status::Stalemate => Some(GameResult::Draw {
                reason: DrawReason::Stalemate,
            }),
            Status::Draw(reason) => Some(GameResult::Draw { reason }),
        }
    }

    fn timeout_winner(&self, flagged: Side) -> Side {
        flagged.opponent()
    }

    fn view(&self) -> ChessView {
        ChessView {
            fen: self.oracle.fen(),
            turn: self.oracle.turn(),
            in_check: self.oracle.is_check(),
            last_move: self.last_move.clone(),
            move_count: self.move_count,
            negotiation: self.negotiation.clone(),
        }
    }
}
