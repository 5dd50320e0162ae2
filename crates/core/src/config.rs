//! Simulation parameters.
//!
//! [`SimulationConfig`] is the engine's whole calling contract. Every field
//! has a default, so a partial TOML or JSON document deserializes into a
//! usable config; [`SimulationConfig::validate`] is the single gate the
//! runner passes it through before any trial starts.

use crate::channel::ChannelConfig;
use crate::commands::CommandTrace;
use crate::error::ConfigError;
use crate::mode::{AttackMode, Mode};
use crate::receiver::MAX_WINDOW_SIZE;
use serde::{Deserialize, Serialize};

/// Shared key used by simulated senders and receivers.
///
/// A fixed string is fine for an idealized-MAC simulation; it is not a model
/// of key management.
pub const DEFAULT_SHARED_KEY: &str = "secret";

/// Complete configuration for a parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === Sweep ===
    /// Modes to evaluate, reported in this order
    pub modes: Vec<Mode>,

    /// Independent trials per mode
    pub runs: u32,

    // === Channel ===
    /// Frame loss probability
    pub p_loss: f64,

    /// Probability a frame is held for reordering
    pub p_reorder: f64,

    // === Receiver ===
    /// Window width for window mode
    pub window_size: u32,

    // === Traffic ===
    /// Legitimate frames per trial
    pub num_legit: u32,

    /// Replay attempts per trial
    pub num_replay: u32,

    /// Commands cycled by the legitimate sender
    pub commands: CommandTrace,

    // === Attacker ===
    /// When replays happen relative to legitimate traffic
    pub attack_mode: AttackMode,

    /// Probability the attacker misses an observation
    pub attacker_record_loss: f64,

    /// Inline mode: chance of a replay burst after each legitimate frame
    pub inline_attack_probability: f64,

    /// Inline mode: maximum replays per burst
    pub inline_attack_burst: u32,

    // === Reproducibility ===
    /// Base seed; `None` draws one from OS entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            modes: Mode::ALL.to_vec(),
            runs: 200,
            p_loss: 0.0,
            p_reorder: 0.0,
            window_size: 5,
            num_legit: 20,
            num_replay: 100,
            commands: CommandTrace::default(),
            attack_mode: AttackMode::Post,
            attacker_record_loss: 0.0,
            inline_attack_probability: 0.3,
            inline_attack_burst: 1,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Check every parameter the engine relies on.
    ///
    /// `num_legit` and `num_replay` may be zero; the matching rate is then
    /// reported as 0.0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modes.is_empty() {
            return Err(ConfigError::NoModes);
        }
        if self.runs == 0 {
            return Err(ConfigError::ZeroRuns);
        }

        check_probability("p_loss", self.p_loss)?;
        check_probability("p_reorder", self.p_reorder)?;
        check_probability("attacker_record_loss", self.attacker_record_loss)?;

        let window_ok = (1..=MAX_WINDOW_SIZE).contains(&self.window_size);
        if self.modes.contains(&Mode::Window) && !window_ok {
            return Err(ConfigError::InvalidWindowSize {
                size: self.window_size,
                max: MAX_WINDOW_SIZE,
            });
        }

        if self.attack_mode == AttackMode::Inline {
            check_probability("inline_attack_probability", self.inline_attack_probability)?;
            if self.inline_attack_burst == 0 {
                return Err(ConfigError::ZeroInlineBurst);
            }
        }

        Ok(())
    }

    /// Channel impairments for one trial.
    pub fn channel(&self) -> ChannelConfig {
        ChannelConfig {
            loss_rate: self.p_loss,
            reorder_rate: self.p_reorder,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}
