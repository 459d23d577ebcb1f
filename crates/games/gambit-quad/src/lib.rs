pub mod board;
pub mod color;

use std::collections::BTreeMap;

use serde::Serialize;

use gambit_core::game_trait::{ActionContext, BoardGame, Outcome};
use gambit_core::protocol::{Arrow, GameAction};
use gambit_core::result::{DrawReason, GameResult};
use gambit_core::room::GameKind;
use gambit_core::seat::Seat;

use board::{Board, Kind, Piece, PieceView, QuadMove, Sq};
use color::{Color, QuadWinner, Team, Variant};

/// Bonus for checkmating or capturing a king in free-for-all.
pub const KING_POINTS: u32 = 20;
/// A two-color endgame may be claimed by a leader ahead by more than this.
pub const CLAIM_MARGIN: u32 = 20;
pub const DEFAULT_ARROW_TTL_MS: u64 = 10_000;
const MAX_ARROWS_PER_TEAM: usize = 16;

/// Why a color left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elimination {
    /// No king on the starting board.
    NoKing,
    Checkmated,
    KingCaptured,
    /// Free-for-all only: no legal move while not mated.
    NoMoves,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastMove {
    pub from: String,
    pub to: String,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuadView {
    pub board: BTreeMap<String, PieceView>,
    pub turn: Color,
    pub variant: Variant,
    pub defeated: Vec<Color>,
    pub scores: BTreeMap<Color, u32>,
    pub claimable: Option<Color>,
    pub in_check: Vec<Color>,
    pub last_move: Option<LastMove>,
    pub move_count: u32,
}

/// Four-player chess on the 14x14 cross board.
///
/// In 2v2 a team loses as soon as one member is mated or loses its king.
/// In free-for-all every move is followed by a sweep that eliminates any
/// mated color; the last color standing wins, and a two-color endgame with
/// a lead above [`CLAIM_MARGIN`] may be claimed.
pub struct QuadChess {
    board: Board,
    variant: Variant,
    turn: Color,
    defeated: BTreeMap<Color, Elimination>,
    scores: BTreeMap<Color, u32>,
    outcome: Option<GameResult<QuadWinner>>,
    last_move: Option<LastMove>,
    move_count: u32,
    arrows: BTreeMap<Team, Vec<Arrow>>,
    arrow_ttl_ms: u64,
}

impl Default for QuadChess {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl QuadChess {
    pub fn new(variant: Variant) -> Self {
        Self::from_position(variant, Board::initial(), Color::Red)
    }

    /// Start from an arbitrary board. Colors without a king count as defeated.
    pub fn from_position(variant: Variant, board: Board, turn: Color) -> Self {
        let defeated = Color::ALL
            .iter()
            .copied()
            .filter(|&c| board.king(c).is_none())
            .map(|c| (c, Elimination::NoKing))
            .collect();
        Self {
            board,
            variant,
            turn,
            defeated,
            scores: Color::ALL.iter().map(|&c| (c, 0)).collect(),
            outcome: None,
            last_move: None,
            move_count: 0,
            arrows: BTreeMap::new(),
            arrow_ttl_ms: DEFAULT_ARROW_TTL_MS,
        }
    }

    pub fn with_arrow_ttl(mut self, ttl_ms: u64) -> Self {
        self.arrow_ttl_ms = ttl_ms;
        self
    }

    pub fn with_scores(mut self, scores: impl IntoIterator<Item = (Color, u32)>) -> Self {
        self.scores.extend(scores);
        self
    }

    pub fn legal_moves(&self, color: Color) -> Vec<QuadMove> {
        self.board.legal_moves(color, self.variant)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn score(&self, color: Color) -> u32 {
        self.scores.get(&color).copied().unwrap_or(0)
    }

    pub fn is_defeated(&self, color: Color) -> bool {
        self.defeated.contains_key(&color)
    }

    pub fn elimination(&self, color: Color) -> Option<Elimination> {
        self.defeated.get(&color).copied()
    }

    /// Colors still playing, in turn order.
    pub fn active(&self) -> Vec<Color> {
        Color::ALL
            .iter()
            .copied()
            .filter(|c| !self.defeated.contains_key(c))
            .collect()
    }

    /// The color entitled to claim victory, if any.
    pub fn claimable(&self) -> Option<Color> {
        if self.variant != Variant::Ffa || self.outcome.is_some() {
            return None;
        }
        let &[a, b] = self.active().as_slice() else {
            return None;
        };
        let (sa, sb) = (self.score(a), self.score(b));
        if sa > sb + CLAIM_MARGIN {
            Some(a)
        } else if sb > sa + CLAIM_MARGIN {
            Some(b)
        } else {
            None
        }
    }

    fn award(&mut self, color: Color, points: u32) {
        if self.variant == Variant::Ffa {
            *self.scores.entry(color).or_insert(0) += points;
        }
    }

    fn team_loses(&mut self, loser: Color) {
        self.outcome = Some(GameResult::Win {
            winner: QuadWinner::Team(loser.team().opponent()),
        });
    }

    fn eliminate(&mut self, color: Color, cause: Elimination) {
        tracing::debug!(color = %color, ?cause, "Color eliminated");
        self.defeated.insert(color, cause);
        self.board.remove_color(color);
        if let [last] = self.active().as_slice() {
            self.outcome = Some(GameResult::Win {
                winner: QuadWinner::Color(*last),
            });
        }
    }

    /// Eliminate every opponent left mated by `mover`'s move. Removing a mated
    /// army can open lines onto another king, so sweep until stable. A
    /// teammate exposed in 2v2 is judged on its own turn.
    fn sweep_checkmates(&mut self, mover: Color) {
        while self.outcome.is_none() {
            let mated = self.active().into_iter().find(|&c| {
                c != mover
                    && (self.variant == Variant::Ffa || c.team() != mover.team())
                    && self.board.in_check(c, self.variant)
                    && !self.board.has_legal_move(c, self.variant)
            });
            let Some(mated) = mated else {
                return;
            };
            match self.variant {
                Variant::TwoVsTwo => self.team_loses(mated),
                Variant::Ffa => {
                    self.award(mover, KING_POINTS);
                    self.eliminate(mated, Elimination::Checkmated);
                },
            }
        }
    }

    /// Hand the move to the next active color. A color with no legal move
    /// is eliminated in free-for-all and stalemates the game in 2v2.
    fn advance_turn(&mut self) {
        while self.outcome.is_none() {
            let Some(next) = self.next_active(self.turn) else {
                return;
            };
            self.turn = next;
            if self.board.has_legal_move(next, self.variant) {
                return;
            }
            match self.variant {
                Variant::Ffa => self.eliminate(next, Elimination::NoMoves),
                Variant::TwoVsTwo if self.board.in_check(next, self.variant) => {
                    self.team_loses(next)
                },
                Variant::TwoVsTwo => {
                    self.outcome = Some(GameResult::Draw {
                        reason: DrawReason::Stalemate,
                    })
                },
            }
        }
    }

    fn next_active(&self, after: Color) -> Option<Color> {
        let mut c = after.next();
        for _ in 0..Color::ALL.len() {
            if !self.defeated.contains_key(&c) {
                return Some(c);
            }
            c = c.next();
        }
        None
    }

    fn move_piece(
        &mut self,
        ctx: &ActionContext<Color>,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Outcome<Color, QuadWinner> {
        let mover = self.turn;
        if ctx.game_over || self.outcome.is_some() || !ctx.holds(mover) {
            return Outcome::Ignored;
        }
        let (Ok(from), Ok(to)) = (from.parse::<Sq>(), to.parse::<Sq>()) else {
            return Outcome::Ignored;
        };
        let wanted = match promotion.and_then(|p| p.trim().chars().next()) {
            Some(c) => match Kind::promotion(c) {
                Some(kind) => kind,
                None => return Outcome::Ignored,
            },
            None => Kind::Queen,
        };
        let found = self
            .board
            .legal_moves(mover, self.variant)
            .into_iter()
            .find(|m| m.from == from && m.to == to && m.promotion.is_none_or(|k| k == wanted));
        let Some(found) = found else {
            tracing::debug!(%from, %to, color = %mover, "Rejected four-player move");
            return Outcome::Ignored;
        };

        if let Some(captured) = self.board.make(found) {
            self.award(mover, captured.points());
            if captured.kind == Kind::King {
                match self.variant {
                    Variant::TwoVsTwo => self.team_loses(captured.color),
                    Variant::Ffa => self.eliminate(captured.color, Elimination::KingCaptured),
                }
            }
        }
        self.last_move = Some(LastMove {
            from: found.from.to_string(),
            to: found.to.to_string(),
            color: mover,
        });
        self.move_count += 1;
        self.sweep_checkmates(mover);
        self.advance_turn();
        Outcome::Moved {
            mover,
            turn_passed: true,
        }
    }

    fn suggest_arrow(
        &mut self,
        ctx: &ActionContext<Color>,
        from: &str,
        to: &str,
    ) -> Outcome<Color, QuadWinner> {
        if self.variant != Variant::TwoVsTwo {
            return Outcome::Ignored;
        }
        let Some(&by) = ctx.seats.first() else {
            return Outcome::Ignored;
        };
        let (Ok(from), Ok(to)) = (from.parse::<Sq>(), to.parse::<Sq>()) else {
            return Outcome::Ignored;
        };
        if from == to {
            return Outcome::Ignored;
        }
        let team = by.team();
        let arrows = self.arrows.entry(team).or_default();
        arrows.retain(|a| a.expires_at_ms > ctx.now_ms);
        if arrows.len() >= MAX_ARROWS_PER_TEAM {
            arrows.remove(0);
        }
        arrows.push(Arrow {
            from: from.to_string(),
            to: to.to_string(),
            by: by.to_string(),
            expires_at_ms: ctx.now_ms + self.arrow_ttl_ms,
        });
        Outcome::Arrows {
            audience: team.members().to_vec(),
            team: team.as_str(),
            arrows: arrows.clone(),
        }
    }

    fn clear_arrows(&mut self, ctx: &ActionContext<Color>) -> Outcome<Color, QuadWinner> {
        if self.variant != Variant::TwoVsTwo {
            return Outcome::Ignored;
        }
        let Some(&by) = ctx.seats.first() else {
            return Outcome::Ignored;
        };
        let team = by.team();
        self.arrows.remove(&team);
        Outcome::Arrows {
            audience: team.members().to_vec(),
            team: team.as_str(),
            arrows: Vec::new(),
        }
    }
}

impl BoardGame for QuadChess {
    type Seat = Color;
    type Winner = QuadWinner;
    type View = QuadView;

    fn kind(&self) -> GameKind {
        GameKind::Quad
    }

    /// The victory mode and arrow lifetime survive a reset.
    fn reset(&mut self) {
        *self = Self::new(self.variant).with_arrow_ttl(self.arrow_ttl_ms);
    }

    fn side_to_move(&self) -> Color {
        self.turn
    }

    fn has_started(&self) -> bool {
        self.move_count > 0
    }

    fn apply(
        &mut self,
        ctx: &ActionContext<Color>,
        action: GameAction,
    ) -> Outcome<Color, QuadWinner> {
        match action {
            GameAction::Move {
                from,
                to,
                promotion,
            } => self.move_piece(ctx, &from, &to, promotion.as_deref()),
            GameAction::ClaimWin => match self.claimable() {
                Some(leader) if !ctx.game_over && ctx.holds(leader) => {
                    let result = GameResult::Win {
                        winner: QuadWinner::Color(leader),
                    };
                    self.outcome = Some(result.clone());
                    Outcome::Finished(result)
                },
                _ => Outcome::Ignored,
            },
            GameAction::SuggestArrow { from, to } => self.suggest_arrow(ctx, &from, &to),
            GameAction::ClearArrows => self.clear_arrows(ctx),
            GameAction::SetVariant { variant } => {
                let Ok(variant) = variant.parse::<Variant>() else {
                    return Outcome::Ignored;
                };
                if variant == self.variant
                    || self.has_started()
                    || ctx.game_over
                    || !ctx.may_configure()
                {
                    return Outcome::Ignored;
                }
                *self = Self::new(variant).with_arrow_ttl(self.arrow_ttl_ms);
                Outcome::Changed
            },
            _ => Outcome::Ignored,
        }
    }

    fn evaluate_terminal(&self) -> Option<GameResult<QuadWinner>> {
        self.outcome.clone()
    }

    /// 2v2 awards the flagged color's opponents. Free-for-all awards the
    /// best-scoring remaining color, earlier in turn order on ties.
    fn timeout_winner(&self, flagged: Color) -> QuadWinner {
        match self.variant {
            Variant::TwoVsTwo => QuadWinner::Team(flagged.team().opponent()),
            Variant::Ffa => {
                let mut best: Option<Color> = None;
                for c in self.active().into_iter().filter(|&c| c != flagged) {
                    if best.is_none_or(|b| self.score(c) > self.score(b)) {
                        best = Some(c);
                    }
                }
                QuadWinner::Color(best.unwrap_or(flagged.next()))
            },
        }
    }

    fn view(&self) -> QuadView {
        QuadView {
            board: self
                .board
                .pieces()
                .map(|(sq, p): (Sq, Piece)| (sq.to_string(), PieceView::from(p)))
                .collect(),
            turn: self.turn,
            variant: self.variant,
            defeated: self.defeated.keys().copied().collect(),
            scores: self.scores.clone(),
            claimable: self.claimable(),
            in_check: self
                .active()
                .into_iter()
                .filter(|&c| self.board.in_check(c, self.variant))
                .collect(),
            last_move: self.last_move.clone(),
            move_count: self.move_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::test_helpers::{ctx, mv, play, view_json};

    fn sq(s: &str) -> Sq {
        s.parse().unwrap()
    }

    fn board_with(pieces: &[(&str, Kind, Color)]) -> Board {
        let mut board = Board::empty();
        for &(at, kind, color) in pieces {
            board.put(sq(at), Some(Piece::new(kind, color)));
        }
        board
    }

    const KINGS: [(&str, Kind, Color); 4] = [
        ("h1", Kind::King, Color::Red),
        ("n7", Kind::King, Color::Green),
        ("g14", Kind::King, Color::Yellow),
        ("a8", Kind::King, Color::Blue),
    ];

    /// Red to move e11-a11, mating the lone blue king on a8.
    fn blue_mate_setup(extra_kings: bool) -> Board {
        let mut pieces = vec![
            ("h1", Kind::King, Color::Red),
            ("a8", Kind::King, Color::Blue),
            ("b4", Kind::Rook, Color::Red),
            ("e11", Kind::Rook, Color::Red),
        ];
        if extra_kings {
            pieces.push(("n7", Kind::King, Color::Green));
            pieces.push(("g14", Kind::King, Color::Yellow));
        }
        board_with(&pieces)
    }

    #[test]
    fn turn_order_is_red_green_yellow_blue() {
        let mut game = QuadChess::new(Variant::Ffa);
        let moves = [("h2", "h4"), ("m7", "k7"), ("g13", "g11"), ("b8", "d8")];
        let mut order = Vec::new();
        for (from, to) in moves {
            order.push(game.side_to_move());
            assert!(matches!(play(&mut game, from, to), Outcome::Moved { turn_passed: true, .. }));
        }
        assert_eq!(order, Color::ALL);
        assert_eq!(game.side_to_move(), Color::Red);
    }

    #[test]
    fn moves_require_the_color_to_move() {
        let mut game = QuadChess::new(Variant::Ffa);
        assert_eq!(game.apply(&ctx(&[Color::Green]), mv("m7", "l7")), Outcome::Ignored);
        assert_eq!(game.apply(&ctx(&[Color::Red]), mv("h2", "h5")), Outcome::Ignored);
        assert_eq!(game.apply(&ctx(&[Color::Red]), mv("a1", "a2")), Outcome::Ignored);
        assert!(!game.has_started());
    }

    #[test]
    fn teammates_cannot_capture_each_other() {
        let mut pieces = KINGS.to_vec();
        pieces.push(("e5", Kind::Rook, Color::Red));
        pieces.push(("e9", Kind::Pawn, Color::Yellow));
        let board = board_with(&pieces);

        let mut teams = QuadChess::from_position(Variant::TwoVsTwo, board.clone(), Color::Red);
        assert_eq!(play(&mut teams, "e5", "e9"), Outcome::Ignored);

        let mut ffa = QuadChess::from_position(Variant::Ffa, board, Color::Red);
        assert!(matches!(play(&mut ffa, "e5", "e9"), Outcome::Moved { .. }));
        assert_eq!(ffa.score(Color::Red), 1);
    }

    #[test]
    fn teammates_do_not_check_each_other() {
        let mut pieces = KINGS.to_vec();
        pieces.push(("h10", Kind::Rook, Color::Yellow));
        let board = board_with(&pieces);
        let teams = QuadChess::from_position(Variant::TwoVsTwo, board.clone(), Color::Red);
        assert!(view_json(&teams)["inCheck"].as_array().unwrap().is_empty());
        let ffa = QuadChess::from_position(Variant::Ffa, board, Color::Red);
        assert_eq!(view_json(&ffa)["inCheck"], serde_json::json!(["red"]));
    }

    #[test]
    fn ffa_checkmate_eliminates_immediately_and_scores() {
        let mut game = QuadChess::from_position(Variant::Ffa, blue_mate_setup(true), Color::Red);
        assert!(matches!(play(&mut game, "e11", "a11"), Outcome::Moved { .. }));
        assert!(game.is_defeated(Color::Blue));
        assert_eq!(game.score(Color::Red), KING_POINTS);
        assert!(game.board().king(Color::Blue).is_none());
        assert_eq!(game.side_to_move(), Color::Green);
        assert_eq!(game.evaluate_terminal(), None);
    }

    #[test]
    fn one_move_can_mate_two_colors() {
        // e11-a11 mates blue on the a-file and uncovers the d12 bishop onto l4.
        let board = board_with(&[
            ("h1", Kind::King, Color::Red),
            ("a8", Kind::King, Color::Blue),
            ("l4", Kind::King, Color::Green),
            ("e11", Kind::Rook, Color::Red),
            ("b5", Kind::Rook, Color::Red),
            ("k1", Kind::Rook, Color::Red),
            ("m11", Kind::Rook, Color::Red),
            ("d12", Kind::Bishop, Color::Red),
        ]);
        let mut game = QuadChess::from_position(Variant::Ffa, board, Color::Red);
        assert_eq!(game.active(), vec![Color::Red, Color::Green, Color::Blue]);
        assert!(view_json(&game)["inCheck"].as_array().unwrap().is_empty());

        assert!(matches!(play(&mut game, "e11", "a11"), Outcome::Moved { .. }));
        assert_eq!(game.elimination(Color::Blue), Some(Elimination::Checkmated));
        assert_eq!(game.elimination(Color::Green), Some(Elimination::Checkmated));
        assert_eq!(game.elimination(Color::Yellow), Some(Elimination::NoKing));
        assert_eq!(game.score(Color::Red), 2 * KING_POINTS);
        assert_eq!(
            game.evaluate_terminal(),
            Some(GameResult::Win {
                winner: QuadWinner::Color(Color::Red),
            })
        );
    }

    #[test]
    fn exposing_a_teammate_is_judged_on_its_turn() {
        // Red lifts the g10 rook and uncovers blue's g5 rook onto the boxed-in yellow king.
        let mut pieces = KINGS.to_vec();
        pieces.extend([
            ("f13", Kind::Pawn, Color::Yellow),
            ("h13", Kind::Pawn, Color::Yellow),
            ("f14", Kind::Rook, Color::Yellow),
            ("h14", Kind::Rook, Color::Yellow),
            ("g10", Kind::Rook, Color::Red),
            ("g5", Kind::Rook, Color::Blue),
        ]);
        let board = board_with(&pieces);
        let mut game = QuadChess::from_position(Variant::TwoVsTwo, board, Color::Red);

        assert!(matches!(play(&mut game, "g10", "e10"), Outcome::Moved { .. }));
        assert_eq!(game.evaluate_terminal(), None);
        assert_eq!(game.side_to_move(), Color::Green);

        assert!(matches!(play(&mut game, "n7", "m7"), Outcome::Moved { .. }));
        assert_eq!(
            game.evaluate_terminal(),
            Some(GameResult::Win {
                winner: QuadWinner::Team(Team::BlueGreen),
            })
        );
    }

    #[test]
    fn last_color_standing_wins() {
        let mut game = QuadChess::from_position(Variant::Ffa, blue_mate_setup(false), Color::Red);
        assert_eq!(game.active(), vec![Color::Red, Color::Blue]);
        play(&mut game, "e11", "a11");
        assert_eq!(
            game.evaluate_terminal(),
            Some(GameResult::Win {
                winner: QuadWinner::Color(Color::Red),
            })
        );
    }

    #[test]
    fn teams_lose_when_a_member_is_mated() {
        let mut game = QuadChess::from_position(Variant::TwoVsTwo, blue_mate_setup(true), Color::Red);
        play(&mut game, "e11", "a11");
        assert_eq!(
            game.evaluate_terminal(),
            Some(GameResult::Win {
                winner: QuadWinner::Team(Team::RedYellow),
            })
        );
        assert_eq!(play(&mut game, "g14", "g13"), Outcome::Ignored);
    }

    /// Red plays e9-e8, leaving the green king on n7 with no move.
    fn green_stalemate_setup() -> Board {
        board_with(&[
            ("h1", Kind::King, Color::Red),
            ("n7", Kind::King, Color::Green),
            ("g14", Kind::King, Color::Yellow),
            ("a5", Kind::King, Color::Blue),
            ("m4", Kind::Rook, Color::Red),
            ("e6", Kind::Rook, Color::Red),
            ("e9", Kind::Rook, Color::Red),
        ])
    }

    #[test]
    fn ffa_stalemate_eliminates_without_score() {
        let mut game = QuadChess::from_position(Variant::Ffa, green_stalemate_setup(), Color::Red);
        play(&mut game, "e9", "e8");
        assert!(game.is_defeated(Color::Green));
        assert_eq!(game.score(Color::Red), 0);
        assert_eq!(game.side_to_move(), Color::Yellow);
    }

    #[test]
    fn teams_stalemate_is_a_draw() {
        let mut game = QuadChess::from_position(Variant::TwoVsTwo, green_stalemate_setup(), Color::Red);
        play(&mut game, "e9", "e8");
        assert_eq!(
            game.evaluate_terminal(),
            Some(GameResult::Draw {
                reason: DrawReason::Stalemate,
            })
        );
    }

    #[test]
    fn king_capture_scores_and_eliminates() {
        let mut pieces = KINGS.to_vec();
        pieces.push(("e7", Kind::Rook, Color::Red));
        let board = board_with(&pieces);
        // Green is in check but it is red's turn.
        let mut game = QuadChess::from_position(Variant::Ffa, board, Color::Red);
        play(&mut game, "e7", "n7");
        assert!(game.is_defeated(Color::Green));
        assert_eq!(game.score(Color::Red), KING_POINTS);
        assert_eq!(game.side_to_move(), Color::Yellow);
    }

    #[test]
    fn claim_win_needs_two_colors_and_a_big_lead() {
        let board = board_with(&[
            ("h1", Kind::King, Color::Red),
            ("a8", Kind::King, Color::Blue),
            ("e5", Kind::Queen, Color::Red),
        ]);
        let close = QuadChess::from_position(Variant::Ffa, board.clone(), Color::Red)
            .with_scores([(Color::Red, 20), (Color::Blue, 0)]);
        assert_eq!(close.claimable(), None);

        let mut game = QuadChess::from_position(Variant::Ffa, board, Color::Blue)
            .with_scores([(Color::Red, 25), (Color::Blue, 0)]);
        assert_eq!(game.claimable(), Some(Color::Red));
        assert_eq!(view_json(&game)["claimable"], "red");
        assert_eq!(game.apply(&ctx(&[Color::Blue]), GameAction::ClaimWin), Outcome::Ignored);
        assert_eq!(
            game.apply(&ctx(&[Color::Red]), GameAction::ClaimWin),
            Outcome::Finished(GameResult::Win {
                winner: QuadWinner::Color(Color::Red),
            })
        );
        assert_eq!(game.claimable(), None);
    }

    #[test]
    fn claim_is_unavailable_in_teams() {
        let mut game = QuadChess::new(Variant::TwoVsTwo)
            .with_scores([(Color::Red, 100)]);
        assert_eq!(game.claimable(), None);
        assert_eq!(game.apply(&ctx(&[Color::Red]), GameAction::ClaimWin), Outcome::Ignored);
    }

    #[test]
    fn promotion_band_depends_on_variant() {
        let mut pieces = KINGS.to_vec();
        pieces.push(("e7", Kind::Pawn, Color::Red));
        let board = board_with(&pieces);

        let mut ffa = QuadChess::from_position(Variant::Ffa, board.clone(), Color::Red);
        play(&mut ffa, "e7", "e8");
        let piece = ffa.board().get(sq("e8")).unwrap();
        assert_eq!(piece.kind, Kind::Queen);
        assert!(piece.promoted);
        assert_eq!(view_json(&ffa)["board"]["e8"]["promotedPawn"], true);

        let mut teams = QuadChess::from_position(Variant::TwoVsTwo, board, Color::Red);
        play(&mut teams, "e7", "e8");
        assert_eq!(teams.board().get(sq("e8")).unwrap().kind, Kind::Pawn);
    }

    #[test]
    fn underpromotion_is_honoured() {
        let mut pieces = KINGS.to_vec();
        pieces.push(("e7", Kind::Pawn, Color::Red));
        let mut game = QuadChess::from_position(Variant::Ffa, board_with(&pieces), Color::Red);
        let action = GameAction::Move {
            from: "e7".into(),
            to: "e8".into(),
            promotion: Some("n".into()),
        };
        assert!(matches!(game.apply(&ctx(&[Color::Red]), action), Outcome::Moved { .. }));
        assert_eq!(game.board().get(sq("e8")).unwrap().kind, Kind::Knight);
    }

    #[test]
    fn arrows_go_to_teammates_and_expire() {
        let mut game = QuadChess::new(Variant::TwoVsTwo).with_arrow_ttl(10_000);
        let suggest = |from: &str, to: &str| GameAction::SuggestArrow {
            from: from.into(),
            to: to.into(),
        };
        let outcome = game.apply(&ctx(&[Color::Red]), suggest("h2", "h4"));
        let Outcome::Arrows {
            audience,
            team,
            arrows,
        } = outcome
        else {
            panic!("expected arrows");
        };
        assert_eq!(audience, vec![Color::Red, Color::Yellow]);
        assert_eq!(team, "redYellow");
        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].expires_at_ms, 10_000);
        assert_eq!(arrows[0].by, "red");

        let mut later = ctx(&[Color::Yellow]);
        later.now_ms = 10_500;
        let Outcome::Arrows { arrows, .. } = game.apply(&later, suggest("g13", "g11")) else {
            panic!("expected arrows");
        };
        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].from, "g13");

        let Outcome::Arrows { arrows, .. } = game.apply(&later, GameAction::ClearArrows) else {
            panic!("expected arrows");
        };
        assert!(arrows.is_empty());
        assert!(!game.has_started());
    }

    #[test]
    fn arrows_need_a_seat_and_teams() {
        let mut game = QuadChess::new(Variant::TwoVsTwo);
        let action = GameAction::SuggestArrow {
            from: "h2".into(),
            to: "h4".into(),
        };
        assert_eq!(game.apply(&ctx(&[]), action.clone()), Outcome::Ignored);
        let mut ffa = QuadChess::new(Variant::Ffa);
        assert_eq!(ffa.apply(&ctx(&[Color::Red]), action), Outcome::Ignored);
    }

    #[test]
    fn variant_is_pre_game_configuration() {
        let mut game = QuadChess::new(Variant::TwoVsTwo);
        let set = |v: &str| GameAction::SetVariant { variant: v.into() };
        assert_eq!(game.apply(&ctx(&[]), set("ffa")), Outcome::Ignored);
        let mut open = ctx::<Color>(&[]);
        open.any_seat_empty = true;
        assert_eq!(game.apply(&open, set("ffa")), Outcome::Changed);
        assert_eq!(game.variant(), Variant::Ffa);
        assert_eq!(game.apply(&open, set("ffa")), Outcome::Ignored);
        assert_eq!(game.apply(&open, set("chaos")), Outcome::Ignored);

        play(&mut game, "h2", "h4");
        assert_eq!(game.apply(&ctx(&[Color::Red]), set("2v2")), Outcome::Ignored);

        game.reset();
        assert_eq!(game.variant(), Variant::Ffa);
        assert!(!game.has_started());
    }

    #[test]
    fn timeout_winners() {
        let teams = QuadChess::new(Variant::TwoVsTwo);
        assert_eq!(teams.timeout_winner(Color::Red), QuadWinner::Team(Team::BlueGreen));

        let ffa = QuadChess::new(Variant::Ffa).with_scores([(Color::Yellow, 6), (Color::Blue, 6)]);
        assert_eq!(ffa.timeout_winner(Color::Red), QuadWinner::Color(Color::Yellow));
        let ffa = QuadChess::new(Variant::Ffa);
        assert_eq!(ffa.timeout_winner(Color::Red), QuadWinner::Color(Color::Green));
    }
}
