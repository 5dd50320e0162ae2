//! Passive record-and-replay adversary.
//!
//! The attacker never alters frames. It keeps a log of shared handles to the
//! immutable frames it overheard, and later picks one uniformly at random
//! (with replacement) to replay.

use crate::frame::Frame;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Eavesdropper that records legitimate frames and replays them on demand.
///
/// Owns its RNG so that capture misses and replay picks are reproducible
/// independently of the channel.
pub struct Attacker {
    record_loss: f64,
    rng: ChaCha8Rng,
    recorded: Vec<Arc<Frame>>,
}

impl Attacker {
    /// Create an attacker that misses each observation with probability
    /// `record_loss`.
    pub fn new(record_loss: f64, rng: ChaCha8Rng) -> Self {
        Self {
            record_loss,
            rng,
            recorded: Vec::new(),
        }
    }

    /// Overhear a frame. Returns whether it was captured.
    pub fn observe(&mut self, frame: &Arc<Frame>) -> bool {
        let missed = if self.record_loss <= 0.0 {
            false
        } else if self.record_loss >= 1.0 {
            true
        } else {
            self.rng.gen::<f64>() < self.record_loss
        };

        if missed {
            return false;
        }

        self.recorded.push(Arc::clone(frame));
        true
    }

    /// Pick a captured frame uniformly at random.
    ///
    /// Repeated picks of the same frame are possible. Returns `None` if
    /// nothing has been captured yet.
    pub fn pick_frame(&mut self) -> Option<Arc<Frame>> {
        self.recorded.choose(&mut self.rng).cloned()
    }

    /// Number of captured frames.
    pub fn captured(&self) -> usize {
        self.recorded.len()
    }
}
