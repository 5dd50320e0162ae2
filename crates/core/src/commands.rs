//! Command traces driving the legitimate sender.
//!
//! Commands carry no protocol meaning; they exist so that signatures differ
//! between frames the way they would for a real remote. A trace is cycled for
//! as many frames as a run needs.

use crate::error::{Result, TraceError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The toy command set used when no trace is supplied.
pub const DEFAULT_COMMANDS: [&str; 5] = ["FWD", "BACK", "LEFT", "RIGHT", "STOP"];

/// Non-empty, cyclic sequence of command identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CommandTrace {
    commands: Vec<String>,
}

impl CommandTrace {
    /// Build a trace from explicit commands.
    ///
    /// # Errors
    /// `TraceError::Empty` if `commands` yields nothing.
    pub fn new<I, S>(commands: I) -> std::result::Result<Self, TraceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let commands: Vec<String> = commands.into_iter().map(Into::into).collect();
        if commands.is_empty() {
            return Err(TraceError::Empty);
        }
        Ok(Self { commands })
    }

    /// Parse a trace from text: one command per line.
    ///
    /// Blank lines and lines starting with `#` are skipped; surrounding
    /// whitespace is trimmed.
    pub fn parse(text: &str) -> std::result::Result<Self, TraceError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load and parse a trace file.
    ///
    /// # Errors
    /// - `TraceError::NotFound` if the file does not exist
    /// - `TraceError::Empty` if it holds no commands
    /// - `Error::Io` for other read failures
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TraceError::NotFound(path.display().to_string()).into());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Command for the `index`-th frame (0-based), wrapping around.
    pub fn command_at(&self, index: usize) -> &str {
        &self.commands[index % self.commands.len()]
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Default for CommandTrace {
    fn default() -> Self {
        Self {
            commands: DEFAULT_COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for CommandTrace {
    type Error = TraceError;

    fn try_from(commands: Vec<String>) -> std::result::Result<Self, Self::Error> {
        Self::new(commands)
    }
}

impl From<CommandTrace> for Vec<String> {
    fn from(trace: CommandTrace) -> Self {
        trace.commands
    }
}
