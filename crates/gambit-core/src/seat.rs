use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum display name length accepted on `join`.
pub const MAX_NAME_LEN: usize = 32;

/// A named slot (color or side) a connection can occupy to become a player.
pub trait Seat:
    Copy + Eq + Ord + Hash + Debug + Display + FromStr + Serialize + Send + Sync + 'static
{
    /// Every seat of the game, in turn order.
    const ALL: &'static [Self];
}

/// Identity of the connection occupying a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatInfo {
    pub connection_id: String,
    pub player_id: String,
    pub display_name: String,
}

impl SeatInfo {
    /// Build seat info from an untrusted `join` payload. The player id falls
    /// back to the connection id and invalid names fall back to the seat label.
    pub fn from_join(
        connection_id: &str,
        player_id: Option<&str>,
        name: Option<&str>,
        seat_label: &str,
    ) -> Self {
        let player_id = player_id
            .map(str::trim)
            .filter(|p| !p.is_empty() && p.len() <= 64)
            .unwrap_or(connection_id);
        let display_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty() && n.len() <= MAX_NAME_LEN)
            .filter(|n| !n.chars().any(char::is_control))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Player {seat_label}"));
        Self {
            connection_id: connection_id.to_string(),
            player_id: player_id.to_string(),
            display_name,
        }
    }
}

/// Seat occupancy for one room. Every seat of `S` is always present as a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Seats<S: Seat> {
    slots: BTreeMap<S, Option<SeatInfo>>,
}

impl<S: Seat> Default for Seats<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Seat> Seats<S> {
    pub fn new() -> Self {
        Self {
            slots: S::ALL.iter().map(|&s| (s, None)).collect(),
        }
    }

    pub fn get(&self, seat: S) -> Option<&SeatInfo> {
        self.slots.get(&seat).and_then(Option::as_ref)
    }

    /// Occupy `seat` if it is empty or already held by the same connection.
    /// Returns `true` if occupancy changed.
    pub fn claim(&mut self, seat: S, info: SeatInfo) -> bool {
        let Some(slot) = self.slots.get_mut(&seat) else {
            return false;
        };
        match slot {
            None => {
                *slot = Some(info);
                true
            },
            Some(current) if current.connection_id == info.connection_id => {
                if *current == info {
                    false
                } else {
                    *current = info;
                    true
                }
            },
            Some(_) => false,
        }
    }

    /// Vacate `seat` if `connection_id` holds it. Returns `true` on change.
    pub fn release(&mut self, seat: S, connection_id: &str) -> bool {
        match self.slots.get_mut(&seat) {
            Some(slot) if slot.as_ref().is_some_and(|i| i.connection_id == connection_id) => {
                *slot = None;
                true
            },
            _ => false,
        }
    }

    /// Vacate every seat held by `connection_id`. Returns `true` on change.
    pub fn release_connection(&mut self, connection_id: &str) -> bool {
        let mut changed = false;
        for slot in self.slots.values_mut() {
            if slot.as_ref().is_some_and(|i| i.connection_id == connection_id) {
                *slot = None;
                changed = true;
            }
        }
        changed
    }

    pub fn any_empty(&self) -> bool {
        self.slots.values().any(Option::is_none)
    }

    /// Seats held by `connection_id`, in turn order.
    pub fn seats_of(&self, connection_id: &str) -> Vec<S> {
        self.slots
            .iter()
            .filter(|(_, info)| info.as_ref().is_some_and(|i| i.connection_id == connection_id))
            .map(|(&s, _)| s)
            .collect()
    }

    pub fn is_seated(&self, connection_id: &str) -> bool {
        !self.seats_of(connection_id).is_empty()
    }

    /// Connection ids seated at any of `seats`.
    pub fn connections_at(&self, seats: &[S]) -> Vec<&str> {
        let mut ids: Vec<&str> = seats
            .iter()
            .filter_map(|s| self.get(*s))
            .map(|i| i.connection_id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
