use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::seat::Seat;

/// One of the two sides in a two-player game.
///
/// Serialized as the single letters `"w"` and `"b"` so it can be used
/// directly as a JSON map key in seat and clock snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "w")]
    W,
    #[serde(rename = "b")]
    B,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::W => Self::B,
            Self::B => Self::W,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::W => "w",
            Self::B => "b",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" | "light" => Ok(Self::W),
            "b" | "black" | "dark" => Ok(Self::B),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

impl Seat for Side {
    const ALL: &'static [Self] = &[Self::W, Self::B];
}
