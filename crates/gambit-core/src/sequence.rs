/// Client-side staleness filter for `state` and `seats` snapshots.
///
/// Broadcasts are at-least-once and may arrive out of order across
/// reconnects, so a client keeps the highest sequence it has applied and
/// drops anything older. An equal sequence is only accepted while both are
/// zero, which lets the initial bootstrap snapshot be applied twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotGate {
    last: Option<u64>,
}

impl SnapshotGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a snapshot stamped `seq` should be applied.
    pub fn accept(&mut self, seq: u64) -> bool {
        let fresh = match self.last {
            None => true,
            Some(0) if seq == 0 => true,
            Some(last) => seq > last,
        };
        if fresh {
            self.last = Some(seq);
        }
        fresh
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last
    }
}
