//! Idealized message authentication.
//!
//! The simulator assumes a perfect MAC: equal `(token, command, key)` triples
//! give equal tags, and any difference gives a different tag. That is all the
//! replay logic needs, so the tag is an injective textual encoding of the
//! triple rather than a cryptographic hash. Each component is length-prefixed
//! so no choice of separator characters inside a command or key can make two
//! different triples collide.
//!
//! This is a simulation stand-in. It offers no secrecy and must not be used to
//! authenticate anything real.

use crate::frame::AuthToken;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication tag over `(token, command, key)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(String);

impl Signature {
    /// Compute the tag for a token, command and shared key.
    pub fn compute(token: &AuthToken, command: &str, key: &str) -> Self {
        let token = token.to_string();
        Self(format!(
            "SIG[{}:{}|{}:{}|{}:{}]",
            key.len(),
            key,
            token.len(),
            token,
            command.len(),
            command
        ))
    }

    /// Whether this tag authenticates `(token, command)` under `key`.
    pub fn verify(&self, token: &AuthToken, command: &str, key: &str) -> bool {
        *self == Self::compute(token, command, key)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
