//! Error types for the replay simulator.
//!
//! Per-frame rejections (replays, MAC mismatches, stale counters) are NOT
//! errors: they are the quantity being measured and travel as
//! [`crate::receiver::Verdict`] reasons. The variants here cover the cases
//! where the caller wired something up wrong.

use crate::mode::Mode;
use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Config: invalid simulation parameters or identifiers
/// - Protocol: a receiver was handed a frame its mode cannot interpret
/// - Trace: command trace parsing
/// - I/O: reading trace or configuration files
#[derive(Debug, Error)]
pub enum Error {
    /// Simulation configuration rejected by validation
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Receiver wiring violated (defended mode without auth fields)
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Command trace could not be used
    #[error("command trace error: {0}")]
    Trace(#[from] TraceError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Mode identifier is not one of the four defenses
    #[error("unknown mode: {0:?}")]
    UnknownMode(String),

    /// Attack timing identifier is not recognised
    #[error("unknown attack mode: {0:?} (expected \"post\" or \"inline\")")]
    UnknownAttackMode(String),

    /// No modes requested
    #[error("at least one mode must be evaluated")]
    NoModes,

    /// Zero runs per mode
    #[error("runs must be at least 1")]
    ZeroRuns,

    /// A probability outside [0.0, 1.0] (or NaN)
    #[error("{name} must be within [0.0, 1.0], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    /// Window size unusable for the fixed-width bitmask
    #[error("window_size must be within 1..={max} for window mode, got {size}")]
    InvalidWindowSize { size: u32, max: u32 },

    /// Inline attack bursts must replay at least one frame
    #[error("inline_attack_burst must be at least 1")]
    ZeroInlineBurst,
}

/// Receiver wiring errors.
///
/// These indicate that a frame built for one mode reached a receiver running
/// another, or that a sender skipped the challenge handshake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame lacks a field the receiver's mode requires
    #[error("{mode} receiver got frame seq {seq} without {field}")]
    MissingFields {
        mode: Mode,
        seq: u64,
        field: &'static str,
    },

    /// Nonces are only issued by challenge-mode receivers
    #[error("{mode} receiver does not issue nonces")]
    NonceUnsupported { mode: Mode },
}

/// Command trace errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    /// Trace contained no usable commands
    #[error("command trace is empty")]
    Empty,

    /// Trace file does not exist
    #[error("command trace not found: {0}")]
    NotFound(String),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
