use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use gambit_core::side::Side;

pub const SIZE: i8 = 8;

/// A board square, `a1` at file 0 rank 0. Only dark squares
/// (`file + rank` even) are playable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sq {
    pub file: i8,
    pub rank: i8,
}

impl Sq {
    pub fn new(file: i8, rank: i8) -> Option<Self> {
        let sq = Self { file, rank };
        sq.is_playable().then_some(sq)
    }

    fn is_playable(self) -> bool {
        (0..SIZE).contains(&self.file)
            && (0..SIZE).contains(&self.rank)
            && (self.file + self.rank) % 2 == 0
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        Self::new(self.file + df, self.rank + dr)
    }

    fn index(self) -> usize {
        (self.rank * SIZE + self.file) as usize
    }

    /// Every playable square, rank by rank.
    pub fn all() -> impl Iterator<Item = Sq> {
        (0..SIZE).flat_map(|rank| (0..SIZE).filter_map(move |file| Sq::new(file, rank)))
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
        let bytes = s.trim().as_bytes();
        let [file @ b'a'..=b'h', rank @ b'1'..=b'8'] = bytes else {
            return Err(format!("bad square {s:?}"));
        };
        Sq::new((file - b'a') as i8, (rank - b'1') as i8)
            .ok_or_else(|| format!("light square {s:?} is not playable"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub color: Side,
    pub king: bool,
}

impl Piece {
    pub fn man(color: Side) -> Self {
        Self { color, king: false }
    }

    /// Rank direction a man of `color` moves in. Dark (`b`) moves down.
    pub fn forward(color: Side) -> i8 {
        match color {
            Side::W => 1,
            Side::B => -1,
        }
    }

    /// Diagonal directions this piece may move and capture in.
    pub fn directions(self) -> Vec<(i8, i8)> {
        let f = Self::forward(self.color);
        if self.king {
            vec![(-1, f), (1, f), (-1, -f), (1, -f)]
        } else {
            vec![(-1, f), (1, f)]
        }
    }

    pub fn crown_rank(color: Side) -> i8 {
        match color {
            Side::W => SIZE - 1,
            Side::B => 0,
        }
    }
}

/// Wire form of a piece: `{type, color, king}`.
#[derive(Debug, Clone, Serialize)]
pub struct PieceView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub color: Side,
    pub king: bool,
}

impl From<Piece> for PieceView {
    fn from(p: Piece) -> Self {
        Self {
            kind: if p.king { "king" } else { "man" },
            color: p.color,
            king: p.king,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    pub fn empty() -> Self {
        Self { cells: [None; 64] }
    }

    /// `w` on ranks 1-3, `b` on ranks 6-8.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for sq in Sq::all() {
            match sq.rank {
                0..=2 => board.put(sq, Some(Piece::man(Side::W))),
                5..=7 => board.put(sq, Some(Piece::man(Side::B))),
                _ => {},
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

    pub fn count(&self, color: Side) -> usize {
        self.pieces().filter(|(_, p)| p.color == color).count()
    }
}
