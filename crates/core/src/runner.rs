//! Monte Carlo driver.
//!
//! For each requested mode the runner plays `runs` independent trials, each
//! with a fresh sender, receiver, attacker and channel, and reduces them to a
//! [`SimulationResult`].
//!
//! # Trial Phases
//!
//! 1. **Legitimate**: for each of `num_legit` frames, issue a nonce
//!    (challenge mode), build the frame, let the attacker overhear it, push it
//!    through the channel, and validate whatever the channel delivers
//! 2. **Drain**: flush frames still held by the channel
//! 3. **Replay**: the attacker replays `num_replay` randomly picked captures
//!    through the same channel
//! 4. **Drain**: final flush
//!
//! With [`AttackMode::Inline`] part of the replay budget is spent during
//! phase 1: after each legitimate frame, with probability
//! `inline_attack_probability`, a burst of up to `inline_attack_burst`
//! replays goes out. Whatever budget is left is spent in phase 3.
//!
//! # Determinism
//!
//! Every trial derives its RNGs from `(seed, mode, run index, component)`.
//! A mode's statistics therefore do not depend on which other modes share
//! the sweep or on evaluation order, and a sweep is fully reproducible from
//! its seed.

use crate::attacker::Attacker;
use crate::channel::{Channel, ChannelStats};
use crate::config::{SimulationConfig, DEFAULT_SHARED_KEY};
use crate::error::{ProtocolError, Result};
use crate::frame::Frame;
use crate::metrics::{rate, RateSummary, ReasonCounts};
use crate::mode::{AttackMode, Mode};
use crate::receiver::Receiver;
use crate::sender::Sender;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Counters for a single trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Legitimate frames handed to the channel
    pub legit_sent: u64,

    /// Legitimate frames the receiver accepted
    pub legit_accepted: u64,

    /// Frames the attacker managed to capture
    pub captured: u64,

    /// Replays actually transmitted (0 if nothing was captured)
    pub attack_attempts: u64,

    /// Replays the receiver accepted
    pub attack_accepted: u64,

    /// Verdicts for every delivered frame
    pub reasons: ReasonCounts,

    /// Channel counters for the trial
    pub channel: ChannelStats,
}

impl RunOutcome {
    /// Accepted legitimate frames over `num_legit` (0.0 when none were due).
    pub fn legit_rate(&self, num_legit: u32) -> f64 {
        rate(self.legit_accepted, u64::from(num_legit))
    }

    /// Accepted replays over `num_replay` (0.0 when none were due).
    pub fn attack_rate(&self, num_replay: u32) -> f64 {
        rate(self.attack_accepted, u64::from(num_replay))
    }
}

/// Per-mode summary across all trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub mode: Mode,
    pub runs: u32,
    pub avg_legit_rate: f64,
    pub std_legit_rate: f64,
    pub avg_attack_rate: f64,
    pub std_attack_rate: f64,

    /// Mean replays actually transmitted per trial
    pub avg_attack_attempts: f64,

    /// Verdict totals across all trials
    pub reasons: ReasonCounts,

    /// Channel totals across all trials
    pub channel: ChannelStats,
}

impl SimulationResult {
    pub fn legit(&self) -> RateSummary {
        RateSummary {
            mean: self.avg_legit_rate,
            std_dev: self.std_legit_rate,
        }
    }

    pub fn attack(&self) -> RateSummary {
        RateSummary {
            mean: self.avg_attack_rate,
            std_dev: self.std_attack_rate,
        }
    }
}

/// Independent RNG streams within one trial.
#[derive(Debug, Clone, Copy)]
enum Stream {
    Channel = 1,
    Attacker = 2,
    Nonce = 3,
    Schedule = 4,
}

/// A validated configuration bound to a concrete seed.
pub struct Simulator {
    config: SimulationConfig,
    seed: u64,
}

impl Simulator {
    /// Validate `config` and fix the sweep's seed.
    ///
    /// Without an explicit seed one is drawn from OS entropy and logged so
    /// the sweep can be rerun.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::random();
                info!(seed, "no seed configured, drew one from entropy");
                seed
            }
        };

        Ok(Self { config, seed })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Evaluate every configured mode, in request order.
    pub fn run(&self) -> Result<Vec<SimulationResult>> {
        self.config
            .modes
            .iter()
            .map(|&mode| self.evaluate_mode(mode))
            .collect()
    }

    /// Run all trials for one mode and reduce them.
    pub fn evaluate_mode(&self, mode: Mode) -> Result<SimulationResult> {
        let runs = self.config.runs;
        let mut legit_rates = Vec::with_capacity(runs as usize);
        let mut attack_rates = Vec::with_capacity(runs as usize);
        let mut attempts = Vec::with_capacity(runs as usize);
        let mut reasons = ReasonCounts::new();
        let mut channel = ChannelStats::default();

        for run_index in 0..runs {
            let outcome = self.simulate_one_run(mode, run_index)?;

            legit_rates.push(outcome.legit_rate(self.config.num_legit));
            attack_rates.push(outcome.attack_rate(self.config.num_replay));
            attempts.push(outcome.attack_attempts as f64);
            reasons.merge(&outcome.reasons);
            channel.merge(&outcome.channel);
        }

        let legit = RateSummary::from_samples(&legit_rates);
        let attack = RateSummary::from_samples(&attack_rates);

        info!(
            %mode,
            runs,
            legit_mean = legit.mean,
            legit_std = legit.std_dev,
            attack_mean = attack.mean,
            attack_std = attack.std_dev,
            "mode evaluated"
        );

        Ok(SimulationResult {
            mode,
            runs,
            avg_legit_rate: legit.mean,
            std_legit_rate: legit.std_dev,
            avg_attack_rate: attack.mean,
            std_attack_rate: attack.std_dev,
            avg_attack_attempts: crate::metrics::mean(&attempts),
            reasons,
            channel,
        })
    }

    /// Play a single trial.
    ///
    /// # Errors
    /// Propagates receiver wiring errors; with a validated config and the
    /// built-in sender these do not occur.
    pub fn simulate_one_run(&self, mode: Mode, run_index: u32) -> Result<RunOutcome> {
        let config = &self.config;
        let mut nonce_rng = self.stream(mode, run_index, Stream::Nonce);
        let mut schedule_rng = self.stream(mode, run_index, Stream::Schedule);

        let mut trial = Trial {
            sender: Sender::new(mode, DEFAULT_SHARED_KEY),
            receiver: Receiver::new(mode, DEFAULT_SHARED_KEY, config.window_size)?,
            attacker: Attacker::new(
                config.attacker_record_loss,
                self.stream(mode, run_index, Stream::Attacker),
            ),
            channel: Channel::new(config.channel(), self.stream(mode, run_index, Stream::Channel)),
            outcome: RunOutcome::default(),
        };

        let mut replay_budget = config.num_replay;

        // Phase 1: legitimate traffic (with inline bursts if enabled)
        for index in 0..config.num_legit {
            let nonce = match mode {
                Mode::Challenge => Some(trial.receiver.issue_nonce(&mut nonce_rng)?),
                _ => None,
            };

            let command = config.commands.command_at(index as usize);
            let frame = Arc::new(trial.sender.next_frame(command, nonce));
            trial.transmit_legit(frame)?;

            if config.attack_mode == AttackMode::Inline
                && replay_budget > 0
                && schedule_rng.gen_bool(config.inline_attack_probability)
            {
                let burst = config.inline_attack_burst.min(replay_budget);
                for _ in 0..burst {
                    trial.replay()?;
                }
                replay_budget -= burst;
            }
        }

        // Phase 2
        trial.drain()?;

        // Phase 3: post-hoc replays
        for _ in 0..replay_budget {
            trial.replay()?;
        }

        // Phase 4
        trial.drain()?;

        let mut outcome = trial.outcome;
        outcome.channel = trial.channel.stats();

        debug!(
            %mode,
            run_index,
            legit_accepted = outcome.legit_accepted,
            attack_accepted = outcome.attack_accepted,
            attack_attempts = outcome.attack_attempts,
            dropped = outcome.channel.dropped,
            "trial complete"
        );

        Ok(outcome)
    }

    fn stream(&self, mode: Mode, run_index: u32, stream: Stream) -> ChaCha8Rng {
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&self.seed.to_le_bytes());
        seed[8..16].copy_from_slice(&mode.stream_id().to_le_bytes());
        seed[16..24].copy_from_slice(&u64::from(run_index).to_le_bytes());
        seed[24..].copy_from_slice(&(stream as u64).to_le_bytes());
        ChaCha8Rng::from_seed(seed)
    }
}

/// Evaluate `config` and return one result per requested mode.
pub fn run_simulation(config: &SimulationConfig) -> Result<Vec<SimulationResult>> {
    Simulator::new(config.clone())?.run()
}

/// Fresh per-trial components.
struct Trial {
    sender: Sender,
    receiver: Receiver,
    attacker: Attacker,
    channel: Channel<Arc<Frame>>,
    outcome: RunOutcome,
}

impl Trial {
    fn transmit_legit(&mut self, frame: Arc<Frame>) -> std::result::Result<(), ProtocolError> {
        self.outcome.legit_sent += 1;
        if self.attacker.observe(&frame) {
            self.outcome.captured += 1;
        }

        let delivered = self.channel.send(frame);
        self.validate(delivered)
    }

    /// Replay one captured frame; a no-op if nothing was captured.
    fn replay(&mut self) -> std::result::Result<(), ProtocolError> {
        let Some(captured) = self.attacker.pick_frame() else {
            return Ok(());
        };

        self.outcome.attack_attempts += 1;
        let delivered = self.channel.send(Arc::new(captured.replayed()));
        self.validate(delivered)
    }

    fn drain(&mut self) -> std::result::Result<(), ProtocolError> {
        let delivered = self.channel.flush();
        self.validate(delivered)
    }

    fn validate(&mut self, delivered: Vec<Arc<Frame>>) -> std::result::Result<(), ProtocolError> {
        for frame in delivered {
            let verdict = self.receiver.process(&frame)?;
            trace!(
                seq = frame.seq,
                attack = frame.is_attack,
                reason = %verdict.reason,
                "frame validated"
            );

            self.outcome.reasons.record(verdict.reason);
            if verdict.accepted {
                if frame.is_attack {
                    self.outcome.attack_accepted += 1;
                } else {
                    self.outcome.legit_accepted += 1;
                }
            }
        }
        Ok(())
    }
}
