use std::fmt;
use std::str::FromStr;

use gambit_chess::oracle::{IllegalMove, MoveLegalityOracle, UciMove, repetition_key};
use gambit_core::result::DrawReason;
use gambit_core::side::Side;

/// Squares the goose may not land on once the game is past move 20.
const CENTER: [&str; 4] = ["d4", "e4", "d5", "e5"];
/// Fullmove number after which [`CENTER`] is off-limits.
pub const CENTER_CLOSES_AFTER: u32 = 20;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub fn new(file: i8, rank: i8) -> Option<Self> {
        ((0..8).contains(&file) && (0..8).contains(&rank)).then(|| Self((rank * 8 + file) as u8))
    }

    pub fn file(self) -> i8 {
        (self.0 % 8) as i8
    }

    pub fn rank(self) -> i8 {
        (self.0 / 8) as i8
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        Self::new(self.file() + df, self.rank() + dr)
    }

    /// King-step neighbours. A square is not adjacent to itself.
    pub fn is_adjacent(self, other: Self) -> bool {
        self != other
            && (self.file() - other.file()).abs() <= 1
            && (self.rank() - other.rank()).abs() <= 1
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file() as u8) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [file @ b'a'..=b'h', rank @ b'1'..=b'8'] = s.trim().as_bytes() else {
            return Err(format!("bad square {s:?}"));
        };
        Square::new((file - b'a') as i8, (rank - b'1') as i8).ok_or_else(|| format!("bad square {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }

    pub fn char(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
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
    pub role: Role,
    pub color: Side,
}

impl Piece {
    fn fen_char(self) -> char {
        match self.color {
            Side::W => self.role.char().to_ascii_uppercase(),
            Side::B => self.role.char(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Castling {
    wk: bool,
    wq: bool,
    bk: bool,
    bq: bool,
}

impl Castling {
    fn get(&self, color: Side, kingside: bool) -> bool {
        match (color, kingside) {
            (Side::W, true) => self.wk,
            (Side::W, false) => self.wq,
            (Side::B, true) => self.bk,
            (Side::B, false) => self.bq,
        }
    }

    /// Drop the right tied to a rook's home corner, if `sq` is one.
    fn clear_corner(&mut self, sq: Square) {
        match (sq.file(), sq.rank()) {
            (0, 0) => self.wq = false,
            (7, 0) => self.wk = false,
            (0, 7) => self.bq = false,
            (7, 7) => self.bk = false,
            _ => {},
        }
    }

    fn clear_color(&mut self, color: Side) {
        match color {
            Side::W => (self.wk, self.wq) = (false, false),
            Side::B => (self.bk, self.bq) = (false, false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Special {
    Plain,
    DoublePush,
    EnPassant,
    Castle { rook_from: Square, rook_to: Square },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    special: Special,
}

impl Move {
    fn plain(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
            special: Special::Plain,
        }
    }

    pub fn uci(&self) -> UciMove {
        UciMove {
            from: self.from.to_string(),
            to: self.to.to_string(),
            promotion: self.promotion.map(Role::char),
        }
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.special, Special::Castle { .. })
    }

    /// Whether a client's `from`-`to` names this move. Castling may also be
    /// written as the king moving onto its own rook.
    fn matches(&self, from: Square, to: Square, promotion: Option<Role>) -> bool {
        let to_matches = self.to == to
            || matches!(self.special, Special::Castle { rook_from, .. } if rook_from == to);
        let promotion_matches = match promotion {
            Some(role) => self.promotion == Some(role),
            None => self.promotion.is_none() || self.promotion == Some(Role::Queen),
        };
        self.from == from && to_matches && promotion_matches
    }
}

/// Board state without history. Cheap to copy for move probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Setup {
    board: [Option<Piece>; 64],
    turn: Side,
    castling: Castling,
    ep: Option<Square>,
    halfmoves: u32,
    fullmoves: u32,
    goose: Option<Square>,
}

fn pawn_dir(color: Side) -> i8 {
    match color {
        Side::W => 1,
        Side::B => -1,
    }
}

fn home_rank(color: Side) -> i8 {
    match color {
        Side::W => 0,
        Side::B => 7,
    }
}

impl Setup {
    fn initial() -> Self {
        const BACK: [Role; 8] = [
            Role::Rook,
            Role::Knight,
            Role::Bishop,
            Role::Queen,
            Role::King,
            Role::Bishop,
            Role::Knight,
            Role::Rook,
        ];
        let mut board = [None; 64];
        for (file, &role) in BACK.iter().enumerate() {
            let f = file as i8;
            for (color, back, pawns) in [(Side::W, 0, 1), (Side::B, 7, 6)] {
                if let Some(sq) = Square::new(f, back) {
                    board[sq.index()] = Some(Piece { role, color });
                }
                if let Some(sq) = Square::new(f, pawns) {
                    board[sq.index()] = Some(Piece {
                        role: Role::Pawn,
                        color,
                    });
                }
            }
        }
        Self {
            board,
            turn: Side::W,
            castling: Castling {
                wk: true,
                wq: true,
                bk: true,
                bq: true,
            },
            ep: None,
            halfmoves: 0,
            fullmoves: 1,
            goose: None,
        }
    }

    fn at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    /// Occupied by a piece or by the goose.
    fn blocked(&self, sq: Square) -> bool {
        self.at(sq).is_some() || self.goose == Some(sq)
    }

    /// Pieces next to the goose cannot capture.
    fn is_startled(&self, sq: Square) -> bool {
        self.goose.is_some_and(|g| g.is_adjacent(sq))
    }

    fn king_square(&self, color: Side) -> Option<Square> {
        Square::all().find(|&sq| {
            self.at(sq) == Some(Piece {
                role: Role::King,
                color,
            })
        })
    }

    /// Whether `by` attacks `target`, honouring goose line-of-sight and
    /// startled pieces.
    fn is_attacked(&self, target: Square, by: Side) -> bool {
        Square::all().any(|sq| {
            let Some(piece) = self.at(sq).filter(|p| p.color == by) else {
                return false;
            };
            if self.is_startled(sq) {
                return false;
            }
            match piece.role {
                Role::Pawn => {
                    let dir = pawn_dir(by);
                    sq.offset(-1, dir) == Some(target) || sq.offset(1, dir) == Some(target)
                },
                Role::Knight => KNIGHT_STEPS
                    .iter()
                    .any(|&(df, dr)| sq.offset(df, dr) == Some(target)),
                Role::King => sq.is_adjacent(target),
                role => role.slides().iter().any(|&(df, dr)| {
                    let mut cur = sq;
                    while let Some(next) = cur.offset(df, dr) {
                        if next == target {
                            return true;
                        }
                        if self.blocked(next) {
                            return false;
                        }
                        cur = next;
                    }
                    false
                }),
            }
        })
    }

    fn in_check(&self, color: Side) -> bool {
        self.king_square(color)
            .is_some_and(|k| self.is_attacked(k, color.opponent()))
    }

    fn pseudo_moves(&self) -> Vec<Move> {
        let us = self.turn;
        let mut moves = Vec::with_capacity(48);
        for from in Square::all() {
            let Some(piece) = self.at(from).filter(|p| p.color == us) else {
                continue;
            };
            let startled = self.is_startled(from);
            match piece.role {
                Role::Pawn => self.pawn_moves(from, startled, &mut moves),
                Role::Knight => self.step_moves(from, &KNIGHT_STEPS, startled, &mut moves),
                Role::King => {
                    self.step_moves(from, &KING_STEPS, startled, &mut moves);
                    self.castle_moves(from, &mut moves);
                },
                role => self.slide_moves(from, role.slides(), startled, &mut moves),
            }
        }
        moves
    }

    fn can_land(&self, to: Square, capture_allowed: bool) -> bool {
        if self.goose == Some(to) {
            return false;
        }
        match self.at(to) {
            None => true,
            Some(p) => capture_allowed && p.color != self.turn,
        }
    }

    fn step_moves(&self, from: Square, steps: &[(i8, i8)], startled: bool, out: &mut Vec<Move>) {
        for &(df, dr) in steps {
            if let Some(to) = from.offset(df, dr)
                && self.can_land(to, !startled)
            {
                out.push(Move::plain(from, to));
            }
        }
    }

    fn slide_moves(&self, from: Square, dirs: &[(i8, i8)], startled: bool, out: &mut Vec<Move>) {
        for &(df, dr) in dirs {
            let mut cur = from;
            while let Some(next) = cur.offset(df, dr) {
                if self.goose == Some(next) {
                    break;
                }
                match self.at(next) {
                    None => out.push(Move::plain(from, next)),
                    Some(p) => {
                        if p.color != self.turn && !startled {
                            out.push(Move::plain(from, next));
                        }
                        break;
                    },
                }
                cur = next;
            }
        }
    }

    fn pawn_moves(&self, from: Square, startled: bool, out: &mut Vec<Move>) {
        let us = self.turn;
        let dir = pawn_dir(us);
        let last_rank = home_rank(us.opponent());
        let push = |to: Square, special: Special, out: &mut Vec<Move>| {
            if to.rank() == last_rank {
                for role in [Role::Queen, Role::Rook, Role::Bishop, Role::Knight] {
                    out.push(Move {
                        from,
                        to,
                        promotion: Some(role),
                        special,
                    });
                }
            } else {
                out.push(Move {
                    from,
                    to,
                    promotion: None,
                    special,
                });
            }
        };

        if let Some(one) = from.offset(0, dir)
            && !self.blocked(one)
        {
            push(one, Special::Plain, out);
            let start_rank = home_rank(us) + dir;
            if from.rank() == start_rank
                && let Some(two) = from.offset(0, 2 * dir)
                && !self.blocked(two)
            {
                push(two, Special::DoublePush, out);
            }
        }

        if startled {
            return;
        }
        for df in [-1, 1] {
            let Some(to) = from.offset(df, dir) else {
                continue;
            };
            match self.at(to) {
                Some(p) if p.color != us => push(to, Special::Plain, out),
                None if self.ep == Some(to) && self.goose != Some(to) => {
                    let victim = Square::new(to.file(), from.rank());
                    let is_enemy_pawn = victim.and_then(|v| self.at(v))
                        == Some(Piece {
                            role: Role::Pawn,
                            color: us.opponent(),
                        });
                    if is_enemy_pawn {
                        push(to, Special::EnPassant, out);
                    }
                },
                _ => {},
            }
        }
    }

    fn castle_moves(&self, king_from: Square, out: &mut Vec<Move>) {
        let us = self.turn;
        let them = us.opponent();
        let rank = home_rank(us);
        if king_from.file() != 4 || king_from.rank() != rank || self.is_attacked(king_from, them) {
            return;
        }
        // (kingside, rook file, king to, rook to, must be empty, must be safe)
        let options: [(bool, i8, i8, i8, &[i8], &[i8]); 2] = [
            (true, 7, 6, 5, &[5, 6], &[5, 6]),
            (false, 0, 2, 3, &[1, 2, 3], &[3, 2]),
        ];
        for (kingside, rook_file, king_to, rook_to, empty, safe) in options {
            if !self.castling.get(us, kingside) {
                continue;
            }
            let (Some(rook_from), Some(king_dest), Some(rook_dest)) = (
                Square::new(rook_file, rank),
                Square::new(king_to, rank),
                Square::new(rook_to, rank),
            ) else {
                continue;
            };
            if self.at(rook_from)
                != Some(Piece {
                    role: Role::Rook,
                    color: us,
                })
            {
                continue;
            }
            let path_clear = empty
                .iter()
                .filter_map(|&f| Square::new(f, rank))
                .all(|sq| !self.blocked(sq));
            let path_safe = safe
                .iter()
                .filter_map(|&f| Square::new(f, rank))
                .all(|sq| !self.is_attacked(sq, them));
            if path_clear && path_safe {
                out.push(Move {
                    from: king_from,
                    to: king_dest,
                    promotion: None,
                    special: Special::Castle {
                        rook_from,
                        rook_to: rook_dest,
                    },
                });
            }
        }
    }

    fn legal_moves(&self) -> Vec<Move> {
        let us = self.turn;
        self.pseudo_moves()
            .into_iter()
            .filter(|&m| {
                let mut next = *self;
                next.make(m);
                !next.in_check(us)
            })
            .collect()
    }

    fn make(&mut self, m: Move) {
        let Some(mut piece) = self.at(m.from) else {
            return;
        };
        let us = piece.color;
        let was_pawn = piece.role == Role::Pawn;
        let captured = self.at(m.to).is_some() || m.special == Special::EnPassant;

        self.board[m.from.index()] = None;
        match m.special {
            Special::EnPassant => {
                if let Some(victim) = Square::new(m.to.file(), m.from.rank()) {
                    self.board[victim.index()] = None;
                }
            },
            Special::Castle { rook_from, rook_to } => {
                let rook = self.board[rook_from.index()].take();
                self.board[rook_to.index()] = rook;
            },
            Special::Plain | Special::DoublePush => {},
        }
        if let Some(role) = m.promotion {
            piece.role = role;
        }
        self.board[m.to.index()] = Some(piece);

        if piece.role == Role::King {
            self.castling.clear_color(us);
        }
        self.castling.clear_corner(m.from);
        self.castling.clear_corner(m.to);

        self.ep = match m.special {
            Special::DoublePush => m.from.offset(0, pawn_dir(us)),
            _ => None,
        };
        self.halfmoves = if was_pawn || captured {
            0
        } else {
            self.halfmoves + 1
        };
        if us == Side::B {
            self.fullmoves += 1;
        }
        self.turn = us.opponent();
    }

    fn is_insufficient_material(&self) -> bool {
        let others: Vec<Role> = self
            .board
            .iter()
            .flatten()
            .map(|p| p.role)
            .filter(|&r| r != Role::King)
            .collect();
        match others.as_slice() {
            [] => true,
            [Role::Knight] | [Role::Bishop] => true,
            _ => false,
        }
    }

    fn fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match Square::new(file, rank).and_then(|sq| self.at(sq)) {
                    Some(p) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(p.fen_char());
                    },
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        let mut castling = String::new();
        for (flag, c) in [
            (self.castling.wk, 'K'),
            (self.castling.wq, 'Q'),
            (self.castling.bk, 'k'),
            (self.castling.bq, 'q'),
        ] {
            if flag {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self.ep.map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{out} {} {castling} {ep} {} {}",
            self.turn, self.halfmoves, self.fullmoves
        )
    }

    fn from_fen(fen: &str) -> Result<Self, String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, turn, castling, ep, rest @ ..] = fields.as_slice() else {
            return Err(format!("incomplete FEN {fen:?}"));
        };
        let mut board = [None; 64];
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(format!("FEN needs 8 ranks: {fen:?}"));
        }
        for (i, row) in rows.iter().enumerate() {
            let rank = 7 - i as i8;
            let mut file = 0i8;
            for c in row.chars() {
                if let Some(n) = c.to_digit(10) {
                    file += n as i8;
                    continue;
                }
                let role = Role::from_char(c).ok_or_else(|| format!("bad piece {c:?}"))?;
                let color = if c.is_ascii_uppercase() { Side::W } else { Side::B };
                let sq = Square::new(file, rank).ok_or_else(|| format!("rank overflow in {row:?}"))?;
                board[sq.index()] = Some(Piece { role, color });
                file += 1;
            }
        }
        let turn: Side = turn.parse()?;
        let castling = Castling {
            wk: castling.contains('K'),
            wq: castling.contains('Q'),
            bk: castling.contains('k'),
            bq: castling.contains('q'),
        };
        let ep = match *ep {
            "-" => None,
            sq => Some(sq.parse()?),
        };
        let halfmoves = rest.first().and_then(|h| h.parse().ok()).unwrap_or(0);
        let fullmoves = rest.get(1).and_then(|f| f.parse().ok()).unwrap_or(1);
        Ok(Self {
            board,
            turn,
            castling,
            ep,
            halfmoves,
            fullmoves,
            goose: None,
        })
    }
}

/// An 8x8 chess position with a goose on (at most) one square.
///
/// * The goose square blocks sliders, pawn pushes and castling paths, and
///   nothing can move onto or capture it.
/// * Pieces on squares adjacent to the goose are startled: they cannot
///   capture (en passant included) and so give no check.
/// * The goose starts off the board.
#[derive(Debug, Clone)]
pub struct GoosePosition {
    setup: Setup,
    /// Repetition keys, one per completed turn (piece and goose).
    history: Vec<String>,
}

impl Default for GoosePosition {
    fn default() -> Self {
        Self::from_setup(Setup::initial())
    }
}

impl GoosePosition {
    fn from_setup(setup: Setup) -> Self {
        let mut pos = Self {
            setup,
            history: Vec::new(),
        };
        pos.record();
        pos
    }

    pub fn from_fen(fen: &str, goose: Option<Square>) -> Result<Self, String> {
        let mut setup = Setup::from_fen(fen)?;
        if let Some(g) = goose
            && setup.at(g).is_some()
        {
            return Err(format!("goose square {g} is occupied"));
        }
        setup.goose = goose;
        Ok(Self::from_setup(setup))
    }

    fn record(&mut self) {
        let goose = self.setup.goose.map_or_else(|| "-".to_string(), |g| g.to_string());
        let key = format!("{} {goose}", repetition_key(&self.setup.fen()));
        self.history.push(key);
    }

    pub fn goose(&self) -> Option<Square> {
        self.setup.goose
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.setup.at(sq)
    }

    pub fn is_startled(&self, sq: Square) -> bool {
        self.setup.is_startled(sq)
    }

    pub fn moves(&self) -> Vec<Move> {
        self.setup.legal_moves()
    }

    /// Legal goose placements for the player who just moved a piece.
    ///
    /// The square must be empty and differ from the goose's current square;
    /// the center is closed from each side's 21st move. Placements that
    /// expose the mover's own king are excluded unless nothing else is
    /// available.
    pub fn goose_targets(&self) -> Vec<Square> {
        let mover = self.setup.turn.opponent();
        // Black's move already advanced the counter.
        let mover_move = match mover {
            Side::W => self.setup.fullmoves,
            Side::B => self.setup.fullmoves.saturating_sub(1),
        };
        let center_closed = mover_move > CENTER_CLOSES_AFTER;
        let candidates: Vec<Square> = Square::all()
            .filter(|&sq| self.setup.at(sq).is_none() && self.setup.goose != Some(sq))
            .filter(|sq| !(center_closed && CENTER.contains(&sq.to_string().as_str())))
            .collect();
        let safe: Vec<Square> = candidates
            .iter()
            .copied()
            .filter(|&sq| {
                let mut probe = self.setup;
                probe.goose = Some(sq);
                !probe.in_check(mover)
            })
            .collect();
        if safe.is_empty() { candidates } else { safe }
    }

    /// The side that just finished its turn left its king en prise, which
    /// only happens when every goose placement exposed it.
    pub fn king_exposed(&self) -> bool {
        self.setup.in_check(self.setup.turn.opponent())
    }

    pub fn place_goose(&mut self, sq: Square) -> Result<(), String> {
        if !self.goose_targets().contains(&sq) {
            return Err(format!("goose cannot land on {sq}"));
        }
        self.setup.goose = Some(sq);
        self.record();
        Ok(())
    }

    fn repetitions(&self) -> usize {
        match self.history.last() {
            Some(current) => self.history.iter().filter(|k| *k == current).count(),
            None => 0,
        }
    }
}

impl MoveLegalityOracle for GoosePosition {
    fn turn(&self) -> Side {
        self.setup.turn
    }

    fn legal_moves(&self) -> Vec<UciMove> {
        self.setup.legal_moves().iter().map(Move::uci).collect()
    }

    fn play(&mut self, mv: &UciMove) -> Result<UciMove, IllegalMove> {
        let illegal = || IllegalMove(mv.clone());
        let from: Square = mv.from.parse().map_err(|_| illegal())?;
        let to: Square = mv.to.parse().map_err(|_| illegal())?;
        let promotion = match mv.promotion {
            Some(c) => Some(Role::from_char(c).ok_or_else(illegal)?),
            None => None,
        };
        let found = self
            .setup
            .legal_moves()
            .into_iter()
            .find(|m| m.matches(from, to, promotion))
            .ok_or_else(illegal)?;
        self.setup.make(found);
        Ok(found.uci())
    }

    fn is_check(&self) -> bool {
        self.setup.in_check(self.setup.turn)
    }

    fn draw_by_rule(&self) -> Option<DrawReason> {
        if self.setup.is_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if self.setup.halfmoves >= 100 {
            Some(DrawReason::FiftyMove)
        } else if self.repetitions() >= 3 {
            Some(DrawReason::Repetition)
        } else {
            None
        }
    }

    fn fen(&self) -> String {
        self.setup.fen()
    }

    fn fullmoves(&self) -> u32 {
        self.setup.fullmoves
    }
}
