//! Defense modes and attack timing identifiers.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anti-replay defense evaluated by a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mode {
    /// Accept everything; baseline for attack success
    #[serde(rename = "no_def", alias = "no_defense", alias = "none")]
    NoDefense,

    /// Strictly increasing authenticated counter
    #[serde(rename = "rolling", alias = "rolling_mac")]
    Rolling,

    /// Authenticated counter with a sliding replay bitmask
    #[serde(rename = "window", alias = "sliding_window")]
    Window,

    /// Receiver-issued single-use nonce
    #[serde(rename = "challenge")]
    Challenge,
}

impl Mode {
    /// All modes, in presentation order.
    pub const ALL: [Mode; 4] = [Mode::NoDefense, Mode::Rolling, Mode::Window, Mode::Challenge];

    /// Canonical identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::NoDefense => "no_def",
            Mode::Rolling => "rolling",
            Mode::Window => "window",
            Mode::Challenge => "challenge",
        }
    }

    /// Stable per-mode ChaCha stream id.
    ///
    /// Keeps a mode's random draws independent of which other modes share the
    /// sweep and in what order they are evaluated.
    pub(crate) fn stream_id(self) -> u64 {
        match self {
            Mode::NoDefense => 1,
            Mode::Rolling => 2,
            Mode::Window => 3,
            Mode::Challenge => 4,
        }
    }

    /// Whether frames in this mode must carry a signature.
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Mode::NoDefense)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no_def" | "no_defense" | "none" => Ok(Mode::NoDefense),
            "rolling" | "rolling_mac" => Ok(Mode::Rolling),
            "window" | "sliding_window" => Ok(Mode::Window),
            "challenge" => Ok(Mode::Challenge),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// When the attacker replays captured frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    /// Replay only after the legitimate phase has fully drained
    #[default]
    #[serde(alias = "post_run")]
    Post,

    /// Interleave replay bursts with legitimate traffic
    Inline,
}

impl AttackMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AttackMode::Post => "post",
            AttackMode::Inline => "inline",
        }
    }
}

impl fmt::Display for AttackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" | "post_run" => Ok(AttackMode::Post),
            "inline" => Ok(AttackMode::Inline),
            _ => Err(ConfigError::UnknownAttackMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_aliases() {
        assert_eq!("no_def".parse::<Mode>().unwrap(), Mode::NoDefense);
        assert_eq!("rolling_mac".parse::<Mode>().unwrap(), Mode::Rolling);
        assert_eq!("Window".parse::<Mode>().unwrap(), Mode::Window);
        assert_eq!(" challenge ".parse::<Mode>().unwrap(), Mode::Challenge);
    }

    #[test]
    fn test_unknown_mode() {
        let err = "hmac".parse::<Mode>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownMode("hmac".to_string()));
    }

    #[test]
    fn test_display_round_trips() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_serde_identifiers() {
        let json = serde_json::to_string(&Mode::NoDefense).unwrap();
        assert_eq!(json, "\"no_def\"");

        let mode: Mode = serde_json::from_str("\"rolling_mac\"").unwrap();
        assert_eq!(mode, Mode::Rolling);

        // Every alias the CLI parser accepts is also valid in config files
        for alias in ["no_def", "no_defense", "none", "rolling_mac", "sliding_window"] {
            let from_serde: Mode = serde_json::from_str(&format!("\"{alias}\"")).unwrap();
            assert_eq!(from_serde, alias.parse::<Mode>().unwrap());
        }

        let attack: AttackMode = serde_json::from_str("\"inline\"").unwrap();
        assert_eq!(attack, AttackMode::Inline);
    }

    #[test]
    fn test_attack_mode_parse() {
        assert_eq!("post".parse::<AttackMode>().unwrap(), AttackMode::Post);
        assert!("realtime".parse::<AttackMode>().is_err());
    }

    #[test]
    fn test_stream_ids_distinct() {
        let mut ids: Vec<u64> = Mode::ALL.iter().map(|m| m.stream_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Mode::ALL.len());
    }
}
