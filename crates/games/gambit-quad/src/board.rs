use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::color::{Color, Variant};

pub const SIZE: i8 = 14;
/// Width of the removed 3x3 corners.
const CORNER: i8 = 3;
const CELLS: usize = (SIZE as usize) * (SIZE as usize);

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A square on the cross-shaped board. Files `a`-`n`, ranks `1`-`14`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sq {
    pub file: i8,
    pub rank: i8,
}

impl Sq {
    pub fn new(file: i8, rank: i8) -> Option<Self> {
        let in_range = (0..SIZE).contains(&file) && (0..SIZE).contains(&rank);
        let edge = |v: i8| !(CORNER..SIZE - CORNER).contains(&v);
        (in_range && !(edge(file) && edge(rank))).then_some(Self { file, rank })
    }

    pub fn offset(self, (df, dr): (i8, i8)) -> Option<Self> {
        Self::new(self.file + df, self.rank + dr)
    }

    fn index(self) -> usize {
        (self.rank as usize) * (SIZE as usize) + self.file as usize
    }

    pub fn all() -> impl Iterator<Item = Sq> {
        (0..SIZE).flat_map(|rank| (0..SIZE).filter_map(move |file| Sq::new(file, rank)))
    }

    /// Distance from `color`'s home edge.
    pub fn depth(self, color: Color) -> i8 {
        match color {
            Color::Red => self.rank,
            Color::Yellow => SIZE - 1 - self.rank,
            Color::Blue => self.file,
            Color::Green => SIZE - 1 - self.file,
        }
    }
}

impl fmt::Display for Sq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file as u8) as char, self.rank + 1)
    }
}

impl FromStr for Sq {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let file = match chars.next() {
            Some(c @ 'a'..='n') => (c as u8 - b'a') as i8,
            _ => return Err(format!("bad square {s:?}")),
        };
        let rank: i8 = chars
            .as_str()
            .parse()
            .map_err(|_| format!("bad square {s:?}"))?;
        Sq::new(file, rank - 1).ok_or_else(|| format!("square {s:?} is off the board"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Kind {
    /// Promotion choices by letter.
    pub fn promotion(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            _ => None,
        }
    }

    fn slides(self) -> &'static [(i8, i8)] {
        match self {
            Self::Bishop => &BISHOP_DIRS,
            Self::Rook => &ROOK_DIRS,
            Self::Queen => &KING_STEPS,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: Kind,
    pub color: Color,
    /// Promoted from a pawn; captures of it score as a pawn.
    pub promoted: bool,
}

impl Piece {
    pub fn new(kind: Kind, color: Color) -> Self {
        Self {
            kind,
            color,
            promoted: false,
        }
    }

    /// Points awarded for capturing this piece.
    pub fn points(self) -> u32 {
        if self.promoted {
            return 1;
        }
        match self.kind {
            Kind::Pawn => 1,
            Kind::Knight => 3,
            Kind::Bishop | Kind::Rook => 5,
            Kind::Queen => 9,
            Kind::King => 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceView {
    #[serde(rename = "type")]
    pub kind: Kind,
    pub color: Color,
    pub promoted_pawn: bool,
}

impl From<Piece> for PieceView {
    fn from(p: Piece) -> Self {
        Self {
            kind: p.kind,
            color: p.color,
            promoted_pawn: p.promoted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadMove {
    pub from: Sq,
    pub to: Sq,
    pub promotion: Option<Kind>,
}

impl QuadMove {
    fn plain(from: Sq, to: Sq) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; CELLS],
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [None; CELLS],
        }
    }

    /// Standard four-army setup. Kings on h1, g14, a8 and n7.
    pub fn initial() -> Self {
        use Kind::*;
        const KING_RIGHT: [Kind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        const KING_LEFT: [Kind; 8] = [Rook, Knight, Bishop, King, Queen, Bishop, Knight, Rook];

        let mut board = Self::empty();
        for &color in &[Color::Red, Color::Green, Color::Yellow, Color::Blue] {
            let back = match color {
                Color::Red | Color::Blue => KING_RIGHT,
                Color::Yellow | Color::Green => KING_LEFT,
            };
            for (i, kind) in back.into_iter().enumerate() {
                let lane = CORNER + i as i8;
                board.put(home_square(color, 0, lane), Some(Piece::new(kind, color)));
                board.put(home_square(color, 1, lane), Some(Piece::new(Pawn, color)));
            }
        }
        board
    }

    pub fn get(&self, sq: Sq) -> Option<Piece> {
        self.cells[sq.index()]
    }

    pub fn put(&mut self, sq: Sq, piece: Option<Piece>) {
        self.cells[sq.index()] = piece;
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Sq, Piece)> + '_ {
        Sq::all().filter_map(|sq| self.get(sq).map(|p| (sq, p)))
    }

    pub fn king(&self, color: Color) -> Option<Sq> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.kind == Kind::King)
            .map(|(sq, _)| sq)
    }

    pub fn remove_color(&mut self, color: Color) {
        for cell in self.cells.iter_mut() {
            if cell.is_some_and(|p| p.color == color) {
                *cell = None;
            }
        }
    }

    fn attacks(&self, from: Sq, piece: Piece, target: Sq) -> bool {
        match piece.kind {
            Kind::Pawn => pawn_captures(from, piece.color).contains(&Some(target)),
            Kind::Knight => KNIGHT_STEPS.iter().any(|&d| from.offset(d) == Some(target)),
            Kind::King => KING_STEPS.iter().any(|&d| from.offset(d) == Some(target)),
            kind => kind.slides().iter().any(|&d| {
                let mut cur = from;
                while let Some(next) = cur.offset(d) {
                    if next == target {
                        return true;
                    }
                    if self.get(next).is_some() {
                        return false;
                    }
                    cur = next;
                }
                false
            }),
        }
    }

    /// Whether any piece hostile to `victim` attacks `target`.
    pub fn is_attacked(&self, target: Sq, victim: Color, variant: Variant) -> bool {
        self.pieces()
            .any(|(sq, p)| variant.hostile(p.color, victim) && self.attacks(sq, p, target))
    }

    pub fn in_check(&self, color: Color, variant: Variant) -> bool {
        self.king(color)
            .is_some_and(|k| self.is_attacked(k, color, variant))
    }

    fn can_take(&self, to: Sq, color: Color, variant: Variant) -> bool {
        match self.get(to) {
            None => true,
            Some(p) => variant.hostile(color, p.color),
        }
    }

    fn pseudo_moves(&self, color: Color, variant: Variant) -> Vec<QuadMove> {
        let mut moves = Vec::new();
        for (from, piece) in self.pieces().filter(|(_, p)| p.color == color) {
            match piece.kind {
                Kind::Pawn => {
                    let promo = variant.promotion_depth();
                    let mut targets = Vec::with_capacity(4);
                    if let Some(one) = from.offset(color.forward())
                        && self.get(one).is_none()
                    {
                        targets.push(one);
                        let (fx, fy) = color.forward();
                        if from.depth(color) == 1
                            && let Some(two) = from.offset((2 * fx, 2 * fy))
                            && self.get(two).is_none()
                        {
                            targets.push(two);
                        }
                    }
                    for to in pawn_captures(from, color).into_iter().flatten() {
                        if self.get(to).is_some_and(|p| variant.hostile(color, p.color)) {
                            targets.push(to);
                        }
                    }
                    for to in targets {
                        if to.depth(color) >= promo {
                            for kind in [Kind::Queen, Kind::Rook, Kind::Bishop, Kind::Knight] {
                                moves.push(QuadMove {
                                    from,
                                    to,
                                    promotion: Some(kind),
                                });
                            }
                        } else {
                            moves.push(QuadMove::plain(from, to));
                        }
                    }
                },
                Kind::Knight | Kind::King => {
                    let steps = if piece.kind == Kind::Knight {
                        &KNIGHT_STEPS
                    } else {
                        &KING_STEPS
                    };
                    for &d in steps {
                        if let Some(to) = from.offset(d)
                            && self.can_take(to, color, variant)
                        {
                            moves.push(QuadMove::plain(from, to));
                        }
                    }
                },
                kind => {
                    for &d in kind.slides() {
                        let mut cur = from;
                        while let Some(next) = cur.offset(d) {
                            match self.get(next) {
                                None => moves.push(QuadMove::plain(from, next)),
                                Some(p) => {
                                    if variant.hostile(color, p.color) {
                                        moves.push(QuadMove::plain(from, next));
                                    }
                                    break;
                                },
                            }
                            cur = next;
                        }
                    }
                },
            }
        }
        moves
    }

    /// Moves that do not leave `color`'s own king attacked.
    pub fn legal_moves(&self, color: Color, variant: Variant) -> Vec<QuadMove> {
        self.pseudo_moves(color, variant)
            .into_iter()
            .filter(|m| {
                let mut next = self.clone();
                next.make(*m);
                !next.in_check(color, variant)
            })
            .collect()
    }

    pub fn has_legal_move(&self, color: Color, variant: Variant) -> bool {
        self.pseudo_moves(color, variant).into_iter().any(|m| {
            let mut next = self.clone();
            next.make(m);
            !next.in_check(color, variant)
        })
    }

    /// Apply a move without validation. Returns the captured piece.
    pub fn make(&mut self, m: QuadMove) -> Option<Piece> {
        let mut piece = self.get(m.from)?;
        if let Some(kind) = m.promotion {
            piece.kind = kind;
            piece.promoted = true;
        }
        let captured = self.get(m.to);
        self.put(m.from, None);
        self.put(m.to, Some(piece));
        captured
    }
}

/// The square `depth` steps in from `color`'s home edge, `lane` along it.
fn home_square(color: Color, depth: i8, lane: i8) -> Sq {
    let (file, rank) = match color {
        Color::Red => (lane, depth),
        Color::Yellow => (lane, SIZE - 1 - depth),
        Color::Blue => (depth, lane),
        Color::Green => (SIZE - 1 - depth, lane),
    };
    Sq { file, rank }
}

fn pawn_captures(from: Sq, color: Color) -> [Option<Sq>; 2] {
    let (fx, fy) = color.forward();
    let (lx, ly) = color.lateral();
    [
        from.offset((fx + lx, fy + ly)),
        from.offset((fx - lx, fy - ly)),
    ]
}
