use std::time::Instant;

use super::state::Snapshot;

#[derive(Debug, Clone)]
pub struct TimedSnapshot {
    pub snapshot: Snapshot,
    pub arrival: Instant,
}

/// Keeps the two most recent snapshots. The older one is replaced the moment a new one arrives.
#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    previous: Option<TimedSnapshot>,
    current: Option<TimedSnapshot>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, snapshot: Snapshot, arrival: Instant) {
        let incoming = TimedSnapshot { snapshot, arrival };
        self.previous = self.current.replace(incoming);
    }

    pub fn latest(&self) -> Option<&TimedSnapshot> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&TimedSnapshot> {
        self.previous.as_ref()
    }

    pub fn len(&self) -> usize {
        self.previous.is_some() as usize + self.current.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ingest_rotates_current_into_previous() {
        let mut buffer = SnapshotBuffer::new();
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(50);

        assert!(buffer.is_empty());
        buffer.ingest(Snapshot::new(1), t0);
        assert_eq!(buffer.latest().unwrap().snapshot.tick, 1);
        assert!(buffer.previous().is_none());

        buffer.ingest(Snapshot::new(2), t1);
        let latest = buffer.latest().unwrap();
        let previous = buffer.previous().unwrap();
        assert_eq!(latest.snapshot.tick, 2);
        assert_eq!(latest.arrival, t1);
        assert_eq!(previous.snapshot.tick, 1);
        assert_eq!(previous.arrival, t0);
    }

    #[test]
    fn retains_at_most_two() {
        let mut buffer = SnapshotBuffer::new();
        let now = Instant::now();

        for tick in 0..10 {
            buffer.ingest(Snapshot::new(tick), now);
        }

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.previous().unwrap().snapshot.tick, 8);
        assert_eq!(buffer.latest().unwrap().snapshot.tick, 9);
    }

    #[test]
    fn arrival_order_is_kept_even_when_ticks_go_backwards() {
        let mut buffer = SnapshotBuffer::new();
        let now = Instant::now();

        buffer.ingest(Snapshot::new(5), now);
        buffer.ingest(Snapshot::new(3), now);

        assert_eq!(buffer.latest().unwrap().snapshot.tick, 3);
        assert_eq!(buffer.previous().unwrap().snapshot.tick, 5);
    }
}
