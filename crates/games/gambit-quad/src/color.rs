use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use gambit_core::seat::Seat;

/// Seat colors, declared in turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
        }
    }

    /// Unit step toward the far side of the board.
    pub fn forward(self) -> (i8, i8) {
        match self {
            Self::Red => (0, 1),
            Self::Yellow => (0, -1),
            Self::Blue => (1, 0),
            Self::Green => (-1, 0),
        }
    }

    /// Unit step along this color's home edge.
    pub fn lateral(self) -> (i8, i8) {
        match self {
            Self::Red | Self::Yellow => (1, 0),
            Self::Blue | Self::Green => (0, 1),
        }
    }

    pub fn team(self) -> Team {
        match self {
            Self::Red | Self::Yellow => Team::RedYellow,
            Self::Blue | Self::Green => Team::BlueGreen,
        }
    }

    /// The next color in turn order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Yellow,
            Self::Yellow => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Self::Red),
            "green" | "g" => Ok(Self::Green),
            "yellow" | "y" => Ok(Self::Yellow),
            "blue" | "b" => Ok(Self::Blue),
            other => Err(format!("unknown color: {other}")),
        }
    }
}

impl Seat for Color {
    const ALL: &'static [Self] = &[Self::Red, Self::Green, Self::Yellow, Self::Blue];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Team {
    RedYellow,
    BlueGreen,
}

impl Team {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RedYellow => "redYellow",
            Self::BlueGreen => "blueGreen",
        }
    }

    pub fn members(self) -> [Color; 2] {
        match self {
            Self::RedYellow => [Color::Red, Color::Yellow],
            Self::BlueGreen => [Color::Blue, Color::Green],
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Self::RedYellow => Self::BlueGreen,
            Self::BlueGreen => Self::RedYellow,
        }
    }
}

/// Victory mode, fixed before the first move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Variant {
    #[default]
    #[serde(rename = "2v2")]
    TwoVsTwo,
    #[serde(rename = "ffa")]
    Ffa,
}

impl Variant {
    /// Distance from the home edge at which a pawn promotes.
    pub fn promotion_depth(self) -> i8 {
        match self {
            Self::Ffa => 7,
            Self::TwoVsTwo => 10,
        }
    }

    /// Whether pieces of `a` may capture or check pieces of `b`.
    pub fn hostile(self, a: Color, b: Color) -> bool {
        match self {
            Self::Ffa => a != b,
            Self::TwoVsTwo => a.team() != b.team(),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2v2" | "teams" => Ok(Self::TwoVsTwo),
            "ffa" => Ok(Self::Ffa),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// Winner of a four-player game: a color in free-for-all, a team in 2v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QuadWinner {
    Color(Color),
    Team(Team),
}
