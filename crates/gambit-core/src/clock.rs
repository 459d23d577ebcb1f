use std::collections::BTreeMap;

use serde::Serialize;

use crate::seat::Seat;

/// Lazily evaluated chess clock.
///
/// Nothing ticks in the background: the active seat's remaining time is
/// recomputed from the wall-clock delta since `last_tick_at_ms` whenever
/// [`ClockState::tick`] is called. The room calls it before every mutating
/// action and from its watchdog.
///
/// Invariants: remaining time never underflows, and `running == false`
/// implies `last_tick_at_ms == None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState<S: Seat> {
    pub base_ms: u64,
    pub increment_ms: u64,
    pub remaining_ms: BTreeMap<S, u64>,
    pub running: bool,
    pub active_color: Option<S>,
    pub last_tick_at_ms: Option<u64>,
}

impl<S: Seat> ClockState<S> {
    pub fn new(base_ms: u64, increment_ms: u64) -> Self {
        Self {
            base_ms,
            increment_ms,
            remaining_ms: S::ALL.iter().map(|&s| (s, base_ms)).collect(),
            running: false,
            active_color: None,
            last_tick_at_ms: None,
        }
    }

    /// A base time of zero means the room is untimed.
    pub fn is_timed(&self) -> bool {
        self.base_ms > 0
    }

    /// Change the time control and reset every seat to the new base.
    pub fn configure(&mut self, base_ms: u64, increment_ms: u64) {
        *self = Self::new(base_ms, increment_ms);
    }

    /// Restore every seat to the configured base and stop the clock.
    pub fn reset(&mut self) {
        self.configure(self.base_ms, self.increment_ms);
    }

    pub fn remaining(&self, seat: S) -> u64 {
        self.remaining_ms.get(&seat).copied().unwrap_or(0)
    }

    /// Charge the active seat for the time elapsed since the last tick.
    pub fn tick(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        let (Some(active), Some(last)) = (self.active_color, self.last_tick_at_ms) else {
            return;
        };
        let elapsed = now_ms.saturating_sub(last);
        if let Some(rem) = self.remaining_ms.get_mut(&active) {
            *rem = rem.saturating_sub(elapsed);
        }
        self.last_tick_at_ms = Some(now_ms);
    }

    /// The seat whose time has run out while the clock is running.
    pub fn flagged(&self) -> Option<S> {
        if !self.running {
            return None;
        }
        self.active_color.filter(|&s| self.remaining(s) == 0)
    }

    /// Start the clock with `active` to move. No-op for untimed rooms.
    pub fn start(&mut self, active: S, now_ms: u64) {
        if !self.is_timed() {
            return;
        }
        self.running = true;
        self.active_color = Some(active);
        self.last_tick_at_ms = Some(now_ms);
    }

    /// Account for a completed move by `mover` and hand the clock to `next`.
    ///
    /// The increment is credited only when the turn actually passes, so a
    /// checkers capture chain or the first half of a goose turn earns nothing.
    pub fn hand_off(&mut self, mover: S, next: S, turn_passed: bool, now_ms: u64) {
        if !self.running {
            return;
        }
        self.tick(now_ms);
        if turn_passed && let Some(rem) = self.remaining_ms.get_mut(&mover) {
            *rem = rem.saturating_add(self.increment_ms);
        }
        self.active_color = Some(next);
        self.last_tick_at_ms = Some(now_ms);
    }

    /// Charge elapsed time and stop the clock.
    pub fn stop(&mut self, now_ms: u64) {
        self.tick(now_ms);
        self.running = false;
        self.last_tick_at_ms = None;
    }

    /// Freeze the flagged seat at zero and stop the clock.
    pub fn expire(&mut self, seat: S) {
        if let Some(rem) = self.remaining_ms.get_mut(&seat) {
            *rem = 0;
        }
        self.running = false;
        self.last_tick_at_ms = None;
    }
}
