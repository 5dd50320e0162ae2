//! Receiver-side validation for each defense mode.
//!
//! The receiver is a tagged state machine: one [`DefenseState`] variant per
//! mode, each holding only the state that mode needs. Every defended mode runs
//! the same template first:
//!
//! 1. the frame must carry the mode's token (counter or nonce) and a signature,
//!    otherwise the receiver was wired wrong and [`ProtocolError`] is returned
//! 2. the signature must verify, otherwise the frame is rejected as
//!    [`Reason::MacMismatch`]
//! 3. only then does the mode-specific transition run
//!
//! No state changes before step 3.
//!
//! # Sliding Window
//!
//! Window mode tracks the highest accepted counter `last` and a bitmask where
//! bit `k` means "counter `last - k` has been accepted". The mask is truncated
//! to `window_size` bits after every advance:
//!
//! ```text
//!   bit:    W-1 ...  3   2   1   0
//!   ctr:  last-W+1 ...         last
//! ```
//!
//! A counter more than `window_size` ahead of `last` is refused rather than
//! advancing blindly, which would discard the replay history of the skipped
//! range.

use crate::error::{ConfigError, ProtocolError};
use crate::frame::{AuthToken, Frame, Nonce};
use crate::mode::Mode;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest window the fixed `u128` bitmask can track.
pub const MAX_WINDOW_SIZE: u32 = 128;

/// Why a frame was accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Accepted without checks (no-defense mode)
    NoDefense,
    /// Accepted (rolling counter advanced, or challenge nonce consumed)
    Ok,
    /// Window mode: first frame ever seen
    OkInit,
    /// Window mode: counter advanced the window
    OkNew,
    /// Window mode: late counter inside the window, first sighting
    OkOld,
    /// Signature does not authenticate the frame
    MacMismatch,
    /// Counter already consumed
    Replay,
    /// Counter too far ahead of the window to track
    OutOfWindowFuture,
    /// Counter behind the tracked window
    TooOld,
    /// Nonce is not the outstanding challenge
    NonceMismatch,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::NoDefense => "no_defense",
            Reason::Ok => "ok",
            Reason::OkInit => "ok_init",
            Reason::OkNew => "ok_new",
            Reason::OkOld => "ok_old",
            Reason::MacMismatch => "mac_mismatch",
            Reason::Replay => "replay",
            Reason::OutOfWindowFuture => "out_of_window_future",
            Reason::TooOld => "too_old",
            Reason::NonceMismatch => "nonce_mismatch",
        }
    }

    /// Whether this reason denotes acceptance.
    pub fn is_accept(self) -> bool {
        matches!(
            self,
            Reason::NoDefense | Reason::Ok | Reason::OkInit | Reason::OkNew | Reason::OkOld
        )
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accept/reject decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: Reason,
}

impl Verdict {
    fn from_reason(reason: Reason) -> Self {
        Self {
            accepted: reason.is_accept(),
            reason,
        }
    }
}

/// Replay bitmask over the trailing `size` counters.
#[derive(Debug, Clone)]
pub struct ReplayWindow {
    size: u32,
    last: Option<u64>,
    mask: u128,
}

impl ReplayWindow {
    /// Create an empty window.
    ///
    /// # Errors
    /// `ConfigError::InvalidWindowSize` unless `1 <= size <= MAX_WINDOW_SIZE`.
    pub fn new(size: u32) -> Result<Self, ConfigError> {
        if size == 0 || size > MAX_WINDOW_SIZE {
            return Err(ConfigError::InvalidWindowSize {
                size,
                max: MAX_WINDOW_SIZE,
            });
        }

        Ok(Self {
            size,
            last: None,
            mask: 0,
        })
    }

    /// Check `counter` against the window and record it if fresh.
    pub fn check_and_update(&mut self, counter: u64) -> Reason {
        let Some(last) = self.last else {
            self.last = Some(counter);
            self.mask = 1;
            return Reason::OkInit;
        };

        if counter > last {
            let diff = counter - last;
            if diff > u64::from(self.size) {
                return Reason::OutOfWindowFuture;
            }

            // diff <= size <= 128; a full 128-bit shift empties the mask
            let shifted = self.mask.checked_shl(diff as u32).unwrap_or(0);
            self.mask = (shifted | 1) & self.limit();
            self.last = Some(counter);
            return Reason::OkNew;
        }

        let offset = last - counter;
        if offset >= u64::from(self.size) {
            return Reason::TooOld;
        }

        let bit = 1u128 << offset;
        if self.mask & bit != 0 {
            return Reason::Replay;
        }

        self.mask |= bit;
        Reason::OkOld
    }

    /// Highest counter accepted so far.
    pub fn last(&self) -> Option<u64> {
        self.last
    }

    /// Raw bitmask (bit 0 = `last`).
    pub fn mask(&self) -> u128 {
        self.mask
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    fn limit(&self) -> u128 {
        if self.size >= MAX_WINDOW_SIZE {
            u128::MAX
        } else {
            (1u128 << self.size) - 1
        }
    }
}

/// Mode-specific receiver state.
#[derive(Debug, Clone)]
pub enum DefenseState {
    NoDefense,
    Rolling { last: Option<u64> },
    Window(ReplayWindow),
    Challenge { expected: Option<Nonce> },
}

impl DefenseState {
    fn fresh(mode: Mode, window_size: u32) -> Result<Self, ConfigError> {
        Ok(match mode {
            Mode::NoDefense => DefenseState::NoDefense,
            Mode::Rolling => DefenseState::Rolling { last: None },
            Mode::Window => DefenseState::Window(ReplayWindow::new(window_size)?),
            Mode::Challenge => DefenseState::Challenge { expected: None },
        })
    }
}

/// Validates incoming frames under one defense mode.
#[derive(Debug, Clone)]
pub struct Receiver {
    mode: Mode,
    key: String,
    window_size: u32,
    state: DefenseState,
}

impl Receiver {
    /// Create a receiver.
    ///
    /// `window_size` is only consulted in window mode.
    ///
    /// # Errors
    /// `ConfigError::InvalidWindowSize` for window mode with an unusable size.
    pub fn new(mode: Mode, key: impl Into<String>, window_size: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            mode,
            key: key.into(),
            window_size,
            state: DefenseState::fresh(mode, window_size)?,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &DefenseState {
        &self.state
    }

    /// Issue a fresh challenge, replacing any outstanding one.
    ///
    /// # Errors
    /// `ProtocolError::NonceUnsupported` outside challenge mode.
    pub fn issue_nonce<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Nonce, ProtocolError> {
        match &mut self.state {
            DefenseState::Challenge { expected } => {
                let nonce = Nonce::random(rng);
                *expected = Some(nonce);
                Ok(nonce)
            }
            _ => Err(ProtocolError::NonceUnsupported { mode: self.mode }),
        }
    }

    /// Validate a frame and apply the mode's state transition.
    ///
    /// # Errors
    /// `ProtocolError::MissingFields` when a defended mode receives a frame
    /// without its token or signature. State is untouched in that case.
    pub fn process(&mut self, frame: &Frame) -> Result<Verdict, ProtocolError> {
        let mode = self.mode;
        let key = self.key.as_str();

        let reason = match &mut self.state {
            DefenseState::NoDefense => Reason::NoDefense,

            DefenseState::Rolling { last } => {
                let counter = frame.counter();
                match authenticate(mode, key, frame, counter, AuthToken::Counter, "counter")? {
                    None => Reason::MacMismatch,
                    Some(counter) if last.map_or(true, |l| counter > l) => {
                        *last = Some(counter);
                        Reason::Ok
                    }
                    Some(_) => Reason::Replay,
                }
            }

            DefenseState::Window(window) => {
                let counter = frame.counter();
                match authenticate(mode, key, frame, counter, AuthToken::Counter, "counter")? {
                    None => Reason::MacMismatch,
                    Some(counter) => window.check_and_update(counter),
                }
            }

            DefenseState::Challenge { expected } => {
                match authenticate(mode, key, frame, frame.nonce(), AuthToken::Nonce, "nonce")? {
                    None => Reason::MacMismatch,
                    Some(nonce) if *expected == Some(nonce) => {
                        *expected = None;
                        Reason::Ok
                    }
                    Some(_) => Reason::NonceMismatch,
                }
            }
        };

        Ok(Verdict::from_reason(reason))
    }

    /// Discard all mode state, as if freshly constructed.
    pub fn reset(&mut self) {
        // window_size was validated in `new`
        self.state = match self.mode {
            Mode::NoDefense => DefenseState::NoDefense,
            Mode::Rolling => DefenseState::Rolling { last: None },
            Mode::Window => DefenseState::Window(ReplayWindow {
                size: self.window_size,
                last: None,
                mask: 0,
            }),
            Mode::Challenge => DefenseState::Challenge { expected: None },
        };
    }
}

/// Shared precondition for defended modes.
///
/// Returns `Ok(Some(token))` when the token is present and the signature
/// verifies, `Ok(None)` on signature mismatch.
fn authenticate<T: Copy>(
    mode: Mode,
    key: &str,
    frame: &Frame,
    token: Option<T>,
    wrap: fn(T) -> AuthToken,
    field: &'static str,
) -> Result<Option<T>, ProtocolError> {
    let missing = |field| ProtocolError::MissingFields {
        mode,
        seq: frame.seq,
        field,
    };

    let token = token.ok_or_else(|| missing(field))?;
    let signature = frame.signature.as_ref().ok_or_else(|| missing("signature"))?;

    if signature.verify(&wrap(token), &frame.command, key) {
        Ok(Some(token))
    } else {
        Ok(None)
    }
}
