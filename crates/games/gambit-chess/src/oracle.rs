use std::fmt;

use serde::Serialize;

use gambit_core::result::DrawReason;
use gambit_core::side::Side;

/// A move in coordinate notation (`e2` → `e4`, optional promotion letter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UciMove {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
}

impl UciMove {
    pub fn new(from: &str, to: &str, promotion: Option<&str>) -> Self {
        Self {
            from: from.trim().to_ascii_lowercase(),
            to: to.trim().to_ascii_lowercase(),
            promotion: promotion
                .and_then(|p| p.trim().chars().next())
                .map(|c| c.to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalMove(pub UciMove);

impl fmt::Display for IllegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal move {}", self.0)
    }
}

impl std::error::Error for IllegalMove {}

/// Board status as seen by the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

/// Chess rules the room layer delegates to: move generation, check
/// detection and the terminal/draw rules.
pub trait MoveLegalityOracle: Send + 'static {
    fn turn(&self) -> Side;

    fn legal_moves(&self) -> Vec<UciMove>;

    /// Play `mv` if legal. A missing promotion piece defaults to a queen.
    /// Returns the move in normalized form (castling as king-to-destination).
    fn play(&mut self, mv: &UciMove) -> Result<UciMove, IllegalMove>;

    fn is_check(&self) -> bool;

    /// Draw by repetition, the fifty-move rule or insufficient material.
    fn draw_by_rule(&self) -> Option<DrawReason>;

    fn fen(&self) -> String;

    fn fullmoves(&self) -> u32;

    fn status(&self) -> Status {
        if self.legal_moves().is_empty() {
            if self.is_check() {
                Status::Checkmate
            } else {
                Status::Stalemate
            }
        } else {
            match self.draw_by_rule() {
                Some(reason) => Status::Draw(reason),
                None => Status::Ongoing,
            }
        }
    }
}

/// Repetition key: placement, side to move, castling rights and en passant
/// square. Move counters are dropped.
pub fn repetition_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}
