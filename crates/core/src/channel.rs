//! Lossy, reordering delivery channel.
//!
//! This module models the radio link between transmitters (sender and
//! attacker) and the receiver. All randomness comes from an injected seeded
//! ChaCha8 RNG, so a channel's behavior is reproducible given its seed.
//!
//! # Simulated Effects
//!
//! - **Loss**: each frame is dropped with probability `loss_rate` (Bernoulli)
//! - **Reordering**: a surviving frame is held back with probability
//!   `reorder_rate`. Held frames queue up in insertion order and are released
//!   in front of the next frame that is not held.
//!
//! There is no clock: "reordering" means later frames overtake held ones, not
//! that delays are modeled. [`Channel::flush`] releases anything still held
//! at phase boundaries so no frame is stranded.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Configuration for channel impairments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Frame loss probability [0.0, 1.0]
    pub loss_rate: f64,

    /// Probability a surviving frame is held for reordering [0.0, 1.0]
    pub reorder_rate: f64,
}

impl ChannelConfig {
    /// A channel that delivers every frame in order.
    pub fn perfect() -> Self {
        Self {
            loss_rate: 0.0,
            reorder_rate: 0.0,
        }
    }
}

/// Simulated link carrying values of type `T`.
///
/// Generic so the runner can move cheap `Arc<Frame>` handles while tests push
/// plain integers.
///
/// # Thread Safety
/// Not thread-safe; each simulation instance owns its own channel.
pub struct Channel<T> {
    config: ChannelConfig,
    rng: ChaCha8Rng,
    held: VecDeque<T>,
    stats: ChannelStats,
}

impl<T> Channel<T> {
    /// Create a channel drawing from `rng`.
    pub fn new(config: ChannelConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            held: VecDeque::new(),
            stats: ChannelStats::default(),
        }
    }

    /// Offer one frame to the channel.
    ///
    /// # Returns
    /// Frames delivered by this call, in delivery order:
    /// - empty if the frame was lost or held
    /// - otherwise every held frame (oldest first) followed by this one
    pub fn send(&mut self, frame: T) -> Vec<T> {
        self.stats.sent += 1;

        if self.roll(self.config.loss_rate) {
            self.stats.dropped += 1;
            return Vec::new();
        }

        if self.roll(self.config.reorder_rate) {
            self.stats.held += 1;
            self.held.push_back(frame);
            return Vec::new();
        }

        let mut out: Vec<T> = self.held.drain(..).collect();
        out.push(frame);
        self.stats.delivered += out.len() as u64;
        out
    }

    /// Release every held frame, oldest first.
    pub fn flush(&mut self) -> Vec<T> {
        let out: Vec<T> = self.held.drain(..).collect();
        self.stats.delivered += out.len() as u64;
        out
    }

    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    /// Bernoulli draw; 0.0 and 1.0 never consult the RNG.
    fn roll(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            self.rng.gen::<f64>() < probability
        }
    }
}

/// Statistics about channel behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Frames offered to the channel
    pub sent: u64,

    /// Frames discarded by loss
    pub dropped: u64,

    /// Frames that were held back for reordering
    pub held: u64,

    /// Frames handed to the receiver
    pub delivered: u64,
}

impl ChannelStats {
    /// Compute loss rate (dropped / sent).
    pub fn loss_rate(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            self.dropped as f64 / self.sent as f64
        }
    }

    /// Compute hold rate (held / sent).
    pub fn reorder_rate(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            self.held as f64 / self.sent as f64
        }
    }

    /// Accumulate another instance's counters.
    pub fn merge(&mut self, other: &ChannelStats) {
        self.sent += other.sent;
        self.dropped += other.dropped;
        self.held += other.held;
        self.delivered += other.delivered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn channel(loss_rate: f64, reorder_rate: f64, seed: u64) -> Channel<u32> {
        Channel::new(
            ChannelConfig {
                loss_rate,
                reorder_rate,
            },
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_perfect_channel() {
        let mut ch = Channel::new(ChannelConfig::perfect(), ChaCha8Rng::seed_from_u64(42));

        for i in 0..10u32 {
            assert_eq!(ch.send(i), vec![i]);
        }
        assert!(ch.flush().is_empty());

        let stats = ch.stats();
        assert_eq!(stats.sent, 10);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.delivered, 10);
    }

    #[test]
    fn test_total_loss() {
        let mut ch = channel(1.0, 0.0, 42);
        for i in 0..100 {
            assert!(ch.send(i).is_empty());
        }
        assert!(ch.flush().is_empty());
        assert_eq!(ch.stats().dropped, 100);
        assert_eq!(ch.stats().loss_rate(), 1.0);
    }

    #[test]
    fn test_packet_loss() {
        let mut ch = channel(0.5, 0.0, 42);
        for i in 0..100 {
            ch.send(i);
        }

        let stats = ch.stats();
        assert_eq!(stats.sent, 100);

        // Allow 30-70% range due to randomness
        assert!(stats.dropped >= 30 && stats.dropped <= 70);
    }

    #[test]
    fn test_held_frames_released_before_next() {
        let mut ch = channel(0.0, 1.0, 1);
        assert!(ch.send(1).is_empty());
        assert!(ch.send(2).is_empty());
        assert_eq!(ch.held.len(), 2);

        ch.config.reorder_rate = 0.0;
        assert_eq!(ch.send(3), vec![1, 2, 3]);
        assert_eq!(ch.held.len(), 0);
    }

    #[test]
    fn test_flush_releases_in_insertion_order() {
        let mut ch = channel(0.0, 1.0, 1);
        for i in 0..5 {
            ch.send(i);
        }
        assert_eq!(ch.flush(), vec![0, 1, 2, 3, 4]);
        assert!(ch.flush().is_empty());
        assert_eq!(ch.stats().delivered, 5);
    }

    #[test]
    fn test_no_loss_conserves_frames() {
        let mut ch = channel(0.0, 0.4, 99);
        let mut received = Vec::new();
        for i in 0..200 {
            received.extend(ch.send(i));
        }
        received.extend(ch.flush());

        // Held frames are released ahead of the frame that frees them, so a
        // single stream keeps its order; only timing relative to other events
        // shifts.
        assert_eq!(received, (0..200).collect::<Vec<_>>());
        assert!(ch.stats().held > 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = channel(0.3, 0.3, 12345);
        let mut b = channel(0.3, 0.3, 12345);

        let out_a: Vec<Vec<u32>> = (0..50).map(|i| a.send(i)).collect();
        let out_b: Vec<Vec<u32>> = (0..50).map(|i| b.send(i)).collect();

        assert_eq!(out_a, out_b);
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_stats_merge() {
        let mut total = ChannelStats::default();
        total.merge(&ChannelStats {
            sent: 4,
            dropped: 1,
            held: 2,
            delivered: 3,
        });
        total.merge(&ChannelStats {
            sent: 6,
            dropped: 0,
            held: 0,
            delivered: 6,
        });
        assert_eq!(total.sent, 10);
        assert_eq!(total.delivered, 9);
        assert_eq!(total.loss_rate(), 0.1);
    }
}
