use shakmaty as sm;

use gambit_core::result::DrawReason;
use gambit_core::side::Side;

use crate::oracle::{IllegalMove, MoveLegalityOracle, UciMove, repetition_key};

/// Standard chess rules delegated to shakmaty, plus the position history
/// shakmaty does not keep (needed for threefold repetition).
#[derive(Debug, Clone)]
pub struct ShakmatyOracle {
    chess: sm::Chess,
    history: Vec<String>,
}

impl Default for ShakmatyOracle {
    fn default() -> Self {
        Self::from_chess(sm::Chess::default())
    }
}

impl ShakmatyOracle {
    fn from_chess(chess: sm::Chess) -> Self {
        let mut oracle = Self {
            chess,
            history: Vec::new(),
        };
        oracle.history.push(repetition_key(&oracle.fen()));
        oracle
    }

    /// Start from an arbitrary position. Used for puzzles and tests.
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let parsed: sm::fen::Fen = fen.parse().map_err(|e: sm::fen::ParseFenError| e.to_string())?;
        let chess: sm::Chess = parsed
            .0
            .position(sm::CastlingMode::Standard)
            .map_err(|_| format!("illegal position: {fen}"))?;
        Ok(Self::from_chess(chess))
    }

    fn repetitions(&self) -> usize {
        match self.history.last() {
            Some(current) => self.history.iter().filter(|k| *k == current).count(),
            None => 0,
        }
    }
}

fn to_uci_move(m: &sm::Move) -> UciMove {
    let text = sm::uci::Uci::from_standard(m).to_string();
    UciMove {
        from: text.get(0..2).unwrap_or_default().to_string(),
        to: text.get(2..4).unwrap_or_default().to_string(),
        promotion: text.chars().nth(4),
    }
}

/// Whether `m` is what a client meant by `from`-`to`. Castling matches both
/// king-to-destination and king-onto-rook notation; a missing promotion
/// piece matches the queen promotion only.
fn matches_request(m: &sm::Move, from: sm::Square, to: sm::Square, wanted: Option<sm::Role>) -> bool {
    [sm::uci::Uci::from_standard(m), sm::uci::Uci::from_chess960(m)]
        .into_iter()
        .any(|uci| match uci {
            sm::uci::Uci::Normal {
                from: f,
                to: t,
                promotion,
            } => {
                f == from
                    && t == to
                    && match wanted {
                        Some(role) => promotion == Some(role),
                        None => promotion.is_none() || promotion == Some(sm::Role::Queen),
                    }
            },
            _ => false,
        })
}

impl MoveLegalityOracle for ShakmatyOracle {
    fn turn(&self) -> Side {
        match sm::Position::turn(&self.chess) {
            sm::Color::White => Side::W,
            sm::Color::Black => Side::B,
        }
    }

    fn legal_moves(&self) -> Vec<UciMove> {
        sm::Position::legal_moves(&self.chess)
            .iter()
            .map(to_uci_move)
            .collect()
    }

    fn play(&mut self, mv: &UciMove) -> Result<UciMove, IllegalMove> {
        let illegal = || IllegalMove(mv.clone());
        let from: sm::Square = mv.from.parse().map_err(|_| illegal())?;
        let to: sm::Square = mv.to.parse().map_err(|_| illegal())?;
        let wanted = match mv.promotion {
            Some(c) => Some(sm::Role::from_char(c).ok_or_else(illegal)?),
            None => None,
        };
        let legal = sm::Position::legal_moves(&self.chess);
        let found = legal
            .iter()
            .find(|m| matches_request(m, from, to, wanted))
            .cloned()
            .ok_or_else(illegal)?;
        let played = to_uci_move(&found);
        sm::Position::play_unchecked(&mut self.chess, &found);
        self.history.push(repetition_key(&self.fen()));
        Ok(played)
    }

    fn is_check(&self) -> bool {
        sm::Position::is_check(&self.chess)
    }

    fn draw_by_rule(&self) -> Option<DrawReason> {
        if sm::Position::is_insufficient_material(&self.chess) {
            Some(DrawReason::InsufficientMaterial)
        } else if sm::Position::halfmoves(&self.chess) >= 100 {
            Some(DrawReason::FiftyMove)
        } else if self.repetitions() >= 3 {
            Some(DrawReason::Repetition)
        } else {
            None
        }
    }

    fn fen(&self) -> String {
        sm::fen::Fen(sm::Position::into_setup(
            self.chess.clone(),
            sm::EnPassantMode::Legal,
        ))
        .to_string()
    }

    fn fullmoves(&self) -> u32 {
        sm::Position::fullmoves(&self.chess).get()
    }
}
