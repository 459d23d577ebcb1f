pub mod board;

use std::collections::BTreeMap;

use serde::Serialize;

use gambit_core::game_trait::{ActionContext, BoardGame, Outcome};
use gambit_core::protocol::GameAction;
use gambit_core::result::GameResult;
use gambit_core::room::GameKind;
use gambit_core::side::Side;

use board::{Board, Piece, PieceView, Sq};

/// A single step or jump. Chains are played one jump at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: Sq,
    pub to: Sq,
    pub captured: Option<Sq>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastMove {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckersView {
    pub board: BTreeMap<String, PieceView>,
    pub turn: Side,
    pub forced_from: Option<String>,
    pub last_move: Option<LastMove>,
    pub move_count: u32,
}

/// 8x8 checkers: forced captures, multi-jump chains and kinging.
#[derive(Debug, Clone)]
pub struct Checkers {
    board: Board,
    turn: Side,
    /// Square the chain-capturing piece must continue from.
    forced_from: Option<Sq>,
    last_move: Option<LastMove>,
    move_count: u32,
}

impl Default for Checkers {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkers {
    /// Dark (`b`) moves first.
    pub fn new() -> Self {
        Self::from_board(Board::initial(), Side::B)
    }

    pub fn from_board(board: Board, turn: Side) -> Self {
        Self {
            board,
            turn,
            forced_from: None,
            last_move: None,
            move_count: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn forced_from(&self) -> Option<Sq> {
        self.forced_from
    }

    fn captures_from(&self, from: Sq) -> Vec<Step> {
        let Some(piece) = self.board.get(from) else {
            return Vec::new();
        };
        piece
            .directions()
            .into_iter()
            .filter_map(|(df, dr)| {
                let over = from.offset(df, dr)?;
                let to = over.offset(df, dr)?;
                let victim = self.board.get(over)?;
                (victim.color != piece.color && self.board.get(to).is_none()).then_some(Step {
                    from,
                    to,
                    captured: Some(over),
                })
            })
            .collect()
    }

    fn steps_from(&self, from: Sq) -> Vec<Step> {
        let Some(piece) = self.board.get(from) else {
            return Vec::new();
        };
        piece
            .directions()
            .into_iter()
            .filter_map(|(df, dr)| {
                let to = from.offset(df, dr)?;
                self.board.get(to).is_none().then_some(Step {
                    from,
                    to,
                    captured: None,
                })
            })
            .collect()
    }

    /// Legal moves for the side to move. Captures are mandatory: if any
    /// piece can capture, only captures are returned.
    pub fn legal_moves(&self) -> Vec<Step> {
        if let Some(from) = self.forced_from {
            return self.captures_from(from);
        }
        let own: Vec<Sq> = self
            .board
            .pieces()
            .filter(|(_, p)| p.color == self.turn)
            .map(|(sq, _)| sq)
            .collect();
        let captures: Vec<Step> = own.iter().flat_map(|&sq| self.captures_from(sq)).collect();
        if !captures.is_empty() {
            return captures;
        }
        own.iter().flat_map(|&sq| self.steps_from(sq)).collect()
    }

    /// Apply a legal step. Returns whether the turn passed to the opponent.
    fn play(&mut self, step: Step) -> bool {
        let Some(mut piece) = self.board.get(step.from) else {
            return false;
        };
        self.board.put(step.from, None);
        if let Some(victim) = step.captured {
            self.board.put(victim, None);
        }
        let crowned = !piece.king && step.to.rank == Piece::crown_rank(piece.color);
        if crowned {
            piece.king = true;
        }
        self.board.put(step.to, Some(piece));
        self.last_move = Some(LastMove {
            from: step.from.to_string(),
            to: step.to.to_string(),
            captured: step.captured.map(|sq| sq.to_string()),
        });
        self.move_count += 1;

        let chain_continues =
            step.captured.is_some() && !crowned && !self.captures_from(step.to).is_empty();
        if chain_continues {
            self.forced_from = Some(step.to);
            false
        } else {
            self.forced_from = None;
            self.turn = self.turn.opponent();
            true
        }
    }
}

impl BoardGame for Checkers {
    type Seat = Side;
    type Winner = Side;
    type View = CheckersView;

    fn kind(&self) -> GameKind {
        GameKind::Checkers
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn side_to_move(&self) -> Side {
        self.turn
    }

    fn has_started(&self) -> bool {
        self.move_count > 0
    }

    fn apply(&mut self, ctx: &ActionContext<Side>, action: GameAction) -> Outcome<Side, Side> {
        let GameAction::Move { from, to, .. } = action else {
            return Outcome::Ignored;
        };
        let mover = self.turn;
        if ctx.game_over || !ctx.holds(mover) {
            return Outcome::Ignored;
        }
        let (Ok(from), Ok(to)) = (from.parse::<Sq>(), to.parse::<Sq>()) else {
            return Outcome::Ignored;
        };
        let Some(step) = self
            .legal_moves()
            .into_iter()
            .find(|s| s.from == from && s.to == to)
        else {
            tracing::debug!(%from, %to, "Rejected checkers move");
            return Outcome::Ignored;
        };
        let turn_passed = self.play(step);
        Outcome::Moved { mover, turn_passed }
    }

    fn evaluate_terminal(&self) -> Option<GameResult<Side>> {
        self.legal_moves().is_empty().then(|| GameResult::Win {
            winner: self.turn.opponent(),
        })
    }

    fn timeout_winner(&self, flagged: Side) -> Side {
        flagged.opponent()
    }

    fn view(&self) -> CheckersView {
        CheckersView {
            board: self
                .board
                .pieces()
                .map(|(sq, p)| (sq.to_string(), PieceView::from(p)))
                .collect(),
            turn: self.turn,
            forced_from: self.forced_from.map(|sq| sq.to_string()),
            last_move: self.last_move.clone(),
            move_count: self.move_count,
        }
    }
}
