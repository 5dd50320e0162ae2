//! Command frames exchanged between sender and receiver.
//!
//! A frame is built once by the [`crate::sender::Sender`] and never mutated
//! afterwards. The attacker and the channel hold `Arc<Frame>` handles to the
//! same value; a replay is a *new* frame carrying the attack flag, produced by
//! [`Frame::replayed`].
//!
//! # Frame Layout
//!
//! ```text
//! +-------------------+
//! | seq               |  u64 sender-local sequence number (1-based)
//! +-------------------+
//! | command           |  command identifier, e.g. "FWD"
//! +-------------------+
//! | token             |  Counter(seq) | Nonce(n) | absent
//! +-------------------+
//! | signature         |  Sig(token, command, key) | absent (no-defense)
//! +-------------------+
//! | is_attack         |  set only on replays
//! +-------------------+
//! ```

use crate::signature::Signature;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-use challenge value issued by a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nonce(u64);

impl Nonce {
    /// Draw a fresh nonce from `rng`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen())
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Freshness token bound into the signature.
///
/// A frame carries at most one token, so "counter and nonce together" cannot
/// be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthToken {
    /// Rolling / window counter (equal to the sequence number)
    Counter(u64),

    /// Challenge nonce echoed back to the receiver
    Nonce(Nonce),
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthToken::Counter(c) => write!(f, "ctr:{c}"),
            AuthToken::Nonce(n) => write!(f, "nonce:{n}"),
        }
    }
}

/// A command frame as seen on the air.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Sender-local sequence number (starts at 1)
    pub seq: u64,

    /// Command identifier
    pub command: String,

    /// Freshness token, if the mode uses one
    pub token: Option<AuthToken>,

    /// Authentication tag (absent in no-defense mode)
    pub signature: Option<Signature>,

    /// Set by the attacker on replay, never by the sender
    pub is_attack: bool,
}

impl Frame {
    /// Create a new legitimate frame.
    pub fn new(
        seq: u64,
        command: impl Into<String>,
        token: Option<AuthToken>,
        signature: Option<Signature>,
    ) -> Self {
        Self {
            seq,
            command: command.into(),
            token,
            signature,
            is_attack: false,
        }
    }

    /// Counter carried by this frame, if any.
    pub fn counter(&self) -> Option<u64> {
        match self.token {
            Some(AuthToken::Counter(c)) => Some(c),
            _ => None,
        }
    }

    /// Nonce carried by this frame, if any.
    pub fn nonce(&self) -> Option<Nonce> {
        match self.token {
            Some(AuthToken::Nonce(n)) => Some(n),
            _ => None,
        }
    }

    /// Copy of this frame flagged as an attacker replay.
    ///
    /// Every authenticated field is carried over bit-for-bit; only the
    /// bookkeeping flag differs.
    pub fn replayed(&self) -> Self {
        Self {
            is_attack: true,
            ..self.clone()
        }
    }
}
