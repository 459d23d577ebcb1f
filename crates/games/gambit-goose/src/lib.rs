pub mod position;

use serde::Serialize;

use gambit_chess::oracle::{MoveLegalityOracle, Status, UciMove};
use gambit_core::game_trait::{ActionContext, BoardGame, Outcome};
use gambit_core::negotiation::{Negotiation, Verdict};
use gambit_core::protocol::GameAction;
use gambit_core::result::{DrawReason, GameResult};
use gambit_core::room::GameKind;
use gambit_core::side::Side;

use position::{GoosePosition, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Piece,
    Goose,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GooseView {
    pub fen: String,
    pub goose_square: Option<String>,
    pub phase: Phase,
    pub turn: Side,
    pub in_check: bool,
    pub last_move: Option<UciMove>,
    pub move_count: u32,
    #[serde(flatten)]
    pub negotiation: Negotiation,
}

/// Chess with a goose. Each turn is a piece move followed by the same
/// player relocating the goose; the turn only passes after the goose lands.
pub struct GooseChess {
    position: GoosePosition,
    phase: Phase,
    negotiation: Negotiation,
    last_move: Option<UciMove>,
    move_count: u32,
}

impl Default for GooseChess {
    fn default() -> Self {
        Self::new()
    }
}

impl GooseChess {
    pub fn new() -> Self {
        Self::with_position(GoosePosition::default())
    }

    pub fn with_position(position: GoosePosition) -> Self {
        Self {
            position,
            phase: Phase::Piece,
            negotiation: Negotiation::default(),
            last_move: None,
            move_count: 0,
        }
    }

    pub fn position(&self) -> &GoosePosition {
        &self.position
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn acting_side(&self, ctx: &ActionContext<Side>) -> Option<Side> {
        let turn = self.side_to_move();
        if ctx.holds(turn) {
            Some(turn)
        } else {
            ctx.seats.first().copied()
        }
    }

    fn move_piece(&mut self, ctx: &ActionContext<Side>, requested: UciMove) -> Outcome<Side, Side> {
        let mover = self.position.turn();
        if self.phase != Phase::Piece || ctx.game_over || !ctx.holds(mover) {
            return Outcome::Ignored;
        }
        match self.position.play(&requested) {
            Ok(played) => {
                self.negotiation.on_move();
                self.last_move = Some(played);
                self.move_count += 1;
                self.phase = Phase::Goose;
                Outcome::Moved {
                    mover,
                    turn_passed: false,
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "Rejected goose-chess move");
                Outcome::Ignored
            },
        }
    }

    fn place_goose(&mut self, ctx: &ActionContext<Side>, square: &str) -> Outcome<Side, Side> {
        let mover = self.side_to_move();
        if self.phase != Phase::Goose || ctx.game_over || !ctx.holds(mover) {
            return Outcome::Ignored;
        }
        let placed = square
            .trim()
            .to_ascii_lowercase()
            .parse::<Square>()
            .and_then(|sq| self.position.place_goose(sq));
        match placed {
            Ok(()) => {
                self.phase = Phase::Piece;
                Outcome::Moved {
                    mover,
                    turn_passed: true,
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "Rejected goose placement");
                Outcome::Ignored
            },
        }
    }
}

impl BoardGame for GooseChess {
    type Seat = Side;
    type Winner = Side;
    type View = GooseView;

    fn kind(&self) -> GameKind {
        GameKind::Goose
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// During the goose phase the player who just moved still has the move.
    fn side_to_move(&self) -> Side {
        match self.phase {
            Phase::Piece => self.position.turn(),
            Phase::Goose => self.position.turn().opponent(),
        }
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
            } => self.move_piece(ctx, UciMove::new(&from, &to, promotion.as_deref())),
            GameAction::Goose { square } => self.place_goose(ctx, &square),
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
        if self.phase == Phase::Goose {
            return None;
        }
        if self.position.king_exposed() {
            return Some(GameResult::Win {
                winner: self.position.turn(),
            });
        }
        match self.position.status() {
            Status::Ongoing => None,
            Status::Checkmate => Some(GameResult::Checkmate {
                winner: self.position.turn().opponent(),
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

    fn view(&self) -> GooseView {
        GooseView {
            fen: self.position.fen(),
            goose_square: self.position.goose().map(|sq| sq.to_string()),
            phase: self.phase,
            turn: self.side_to_move(),
            in_check: self.position.is_check(),
            last_move: self.last_move.clone(),
            move_count: self.move_count,
            negotiation: self.negotiation.clone(),
        }
    }
}
