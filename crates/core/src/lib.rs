//! replay-sim-core: Monte Carlo comparison of anti-replay defenses
//!
//! This library evaluates how four defenses for wireless command frames
//! trade usability (accepting legitimate frames) against security (rejecting
//! replayed ones) over a channel that loses and reorders frames:
//! - no defense (baseline)
//! - strictly increasing rolling counter
//! - sliding replay window over the counter
//! - receiver-issued challenge nonce
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `frame`: Immutable command frames and freshness tokens
//! - `signature`: Idealized, collision-free MAC
//! - `sender`: Legitimate frame source
//! - `receiver`: Per-mode validation state machines
//! - `channel`: Loss and reordering with seeded randomness
//! - `attacker`: Passive record-and-replay adversary
//! - `runner`: Trial orchestration and per-mode reduction
//! - `metrics`: Rates, mean / sample std, verdict histograms
//! - `config`, `mode`, `commands`: The calling contract
//!
//! # Design Principles
//!
//! - **No panics**: Misconfiguration surfaces as structured errors
//! - **Rejections are data**: Replays and stale frames are verdicts, not errors
//! - **Deterministic**: A seed reproduces an entire sweep
//! - **Independent trials**: No state crosses trial or mode boundaries

pub mod attacker;
pub mod channel;
pub mod commands;
pub mod config;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod mode;
pub mod receiver;
pub mod runner;
pub mod sender;
pub mod signature;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use mode::{AttackMode, Mode};
pub use runner::{run_simulation, RunOutcome, SimulationResult, Simulator};
