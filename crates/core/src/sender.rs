//! Legitimate frame source.

use crate::frame::{AuthToken, Frame, Nonce};
use crate::mode::Mode;
use crate::signature::Signature;

/// Builds the legitimate frame sequence for one simulation instance.
#[derive(Debug, Clone)]
pub struct Sender {
    mode: Mode,
    key: String,
    seq: u64,
}

impl Sender {
    pub fn new(mode: Mode, key: impl Into<String>) -> Self {
        Self {
            mode,
            key: key.into(),
            seq: 0,
        }
    }

    /// Build the next frame for `command`.
    ///
    /// In challenge mode `nonce` must be the value the receiver just issued;
    /// it is echoed and bound into the signature. Other modes ignore it.
    pub fn next_frame(&mut self, command: &str, nonce: Option<Nonce>) -> Frame {
        self.seq += 1;
        let seq = self.seq;

        match self.mode {
            // Counter rides along for telemetry only
            Mode::NoDefense => Frame::new(seq, command, Some(AuthToken::Counter(seq)), None),
            Mode::Rolling | Mode::Window => {
                let token = AuthToken::Counter(seq);
                let signature = Signature::compute(&token, command, &self.key);
                Frame::new(seq, command, Some(token), Some(signature))
            }
            Mode::Challenge => match nonce {
                Some(nonce) => {
                    let token = AuthToken::Nonce(nonce);
                    let signature = Signature::compute(&token, command, &self.key);
                    Frame::new(seq, command, Some(token), Some(signature))
                }
                // Receiver reports this as a wiring error
                None => Frame::new(seq, command, None, None),
            },
        }
    }
}
