use std::collections::VecDeque;
use std::time::Instant;

use super::protocol::sequence_greater_than;

const ACK_WINDOW: u32 = 32;
const RECENT_CAPACITY: usize = 128;

#[derive(Debug, Clone)]
pub struct PendingPacket {
    pub sequence: u32,
    pub send_time: Instant,
    pub acked: bool,
}

/// Sent sequences waiting for an ack. Feeds the smoothed RTT and loss figures.
#[derive(Debug)]
pub struct AckTracker {
    pending: VecDeque<PendingPacket>,
    max_pending: usize,
    srtt: f32,
    rtt_var: f32,
    tracked: u64,
    acked: u64,
}

impl AckTracker {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(max_pending),
            max_pending,
            srtt: 100.0,
            rtt_var: 50.0,
            tracked: 0,
            acked: 0,
        }
    }

    pub fn track_packet(&mut self, sequence: u32, now: Instant) {
        while self.pending.len() >= self.max_pending.max(1) {
            self.pending.pop_front();
        }

        self.tracked += 1;
        self.pending.push_back(PendingPacket {
            sequence,
            send_time: now,
            acked: false,
        });
    }

    /// Marks everything covered by `ack` + `ack_bitfield`. Returns the newly acked sequences.
    pub fn process_ack(&mut self, ack: u32, ack_bitfield: u32, now: Instant) -> Vec<u32> {
        let mut acked_sequences = Vec::new();
        let mut rtt_samples = Vec::new();

        for pending in self.pending.iter_mut().filter(|p| !p.acked) {
            if covers(ack, ack_bitfield, pending.sequence) {
                pending.acked = true;
                acked_sequences.push(pending.sequence);
                rtt_samples
                    .push(now.saturating_duration_since(pending.send_time).as_secs_f32() * 1000.0);
            }
        }

        for rtt in rtt_samples {
            self.update_rtt(rtt);
        }
        self.acked += acked_sequences.len() as u64;

        while self.pending.front().is_some_and(|p| p.acked) {
            self.pending.pop_front();
        }

        acked_sequences
    }

    fn update_rtt(&mut self, rtt: f32) {
        const ALPHA: f32 = 0.125;
        const BETA: f32 = 0.25;

        let diff = (rtt - self.srtt).abs();
        self.rtt_var = (1.0 - BETA) * self.rtt_var + BETA * diff;
        self.srtt = (1.0 - ALPHA) * self.srtt + ALPHA * rtt;
    }

    pub fn srtt(&self) -> f32 {
        self.srtt
    }

    pub fn rtt_var(&self) -> f32 {
        self.rtt_var
    }

    pub fn unacked_count(&self) -> usize {
        self.pending.iter().filter(|p| !p.acked).count()
    }

    /// Share of tracked packets never acked, in percent.
    pub fn loss_percent(&self) -> f32 {
        if self.tracked == 0 {
            return 0.0;
        }
        let lost = self.tracked.saturating_sub(self.acked) as f32;
        lost / self.tracked as f32 * 100.0
    }
}

fn covers(ack: u32, ack_bitfield: u32, sequence: u32) -> bool {
    if sequence == ack {
        return true;
    }
    if !sequence_greater_than(ack, sequence) {
        return false;
    }
    let diff = ack.wrapping_sub(sequence);
    diff <= ACK_WINDOW && (ack_bitfield & (1 << (diff - 1))) != 0
}

/// Remote sequences seen so far, folded into the ack fields of outgoing headers.
#[derive(Debug)]
pub struct ReceiveTracker {
    last_received: Option<u32>,
    received_bitfield: u32,
    recent_sequences: VecDeque<u32>,
}

impl Default for ReceiveTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiveTracker {
    pub fn new() -> Self {
        Self {
            last_received: None,
            received_bitfield: 0,
            recent_sequences: VecDeque::with_capacity(RECENT_CAPACITY),
        }
    }

    /// Returns false for duplicates.
    pub fn record_received(&mut self, sequence: u32) -> bool {
        if self.recent_sequences.contains(&sequence) {
            return false;
        }

        if self.recent_sequences.len() >= RECENT_CAPACITY {
            self.recent_sequences.pop_front();
        }
        self.recent_sequences.push_back(sequence);

        let Some(last) = self.last_received else {
            self.last_received = Some(sequence);
            self.received_bitfield = 0;
            return true;
        };

        if sequence_greater_than(sequence, last) {
            let diff = sequence.wrapping_sub(last);
            self.received_bitfield = if diff <= ACK_WINDOW {
                // the old `last` becomes bit diff-1
                (self.received_bitfield.checked_shl(diff).unwrap_or(0)) | (1 << (diff - 1))
            } else {
                0
            };
            self.last_received = Some(sequence);
        } else {
            let diff = last.wrapping_sub(sequence);
            if diff > 0 && diff <= ACK_WINDOW {
                self.received_bitfield |= 1 << (diff - 1);
            }
        }

        true
    }

    pub fn last_received(&self) -> Option<u32> {
        self.last_received
    }

    pub fn ack_data(&self) -> (u32, u32) {
        (self.last_received.unwrap_or(0), self.received_bitfield)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_receive_tracker_bitfield() {
        let mut tracker = ReceiveTracker::new();

        tracker.record_received(1);
        tracker.record_received(2);
        tracker.record_received(3);

        let (ack, bitfield) = tracker.ack_data();
        assert_eq!(ack, 3);
        assert_eq!(bitfield & 0b11, 0b11);
    }

    #[test]
    fn test_receive_tracker_out_of_order() {
        let mut tracker = ReceiveTracker::new();

        tracker.record_received(3);
        tracker.record_received(1);
        tracker.record_received(2);

        let (ack, bitfield) = tracker.ack_data();
        assert_eq!(ack, 3);
        assert_eq!(bitfield & 0b11, 0b11);
    }

    #[test]
    fn test_first_sequence_zero() {
        let mut tracker = ReceiveTracker::new();
        assert!(tracker.record_received(0));
        assert_eq!(tracker.last_received(), Some(0));
        assert_eq!(tracker.ack_data(), (0, 0));

        tracker.record_received(1);
        assert_eq!(tracker.ack_data(), (1, 0b1));
    }

    #[test]
    fn test_duplicate_detection() {
        let mut tracker = ReceiveTracker::new();

        assert!(tracker.record_received(1));
        assert!(!tracker.record_received(1));
        assert!(tracker.record_received(2));
    }

    #[test]
    fn test_ack_tracker_rtt() {
        let mut tracker = AckTracker::new(32);
        let sent = Instant::now();

        tracker.track_packet(1, sent);
        let acked = tracker.process_ack(1, 0, sent + Duration::from_millis(10));

        assert_eq!(acked, vec![1]);
        assert!(tracker.srtt() > 0.0);
        assert_eq!(tracker.unacked_count(), 0);
    }

    #[test]
    fn test_ack_bitfield_and_loss() {
        let mut tracker = AckTracker::new(32);
        let now = Instant::now();
        for seq in 0..4 {
            tracker.track_packet(seq, now);
        }

        // ack 3, bit 1 covers 1; 0 and 2 never arrive
        let acked = tracker.process_ack(3, 0b10, now);
        assert_eq!(acked, vec![1, 3]);
        assert_eq!(tracker.unacked_count(), 2);
        assert_eq!(tracker.loss_percent(), 50.0);
    }
}
