//! Configuration for the replay-sim application.
//!
//! Resolution order, later wins:
//! 1. built-in defaults ([`SimulationConfig::default`])
//! 2. a TOML file given with `--config`
//! 3. individual command-line flags
//!
//! The tool works with zero arguments. When no seed is given the engine draws
//! one and reports it, so every run can be reproduced.

use anyhow::{Context, Result};
use clap::Parser;
use replay_sim_core::commands::CommandTrace;
use replay_sim_core::{AttackMode, Mode, SimulationConfig};
use std::path::{Path, PathBuf};

/// Compare anti-replay defenses over a lossy, reordering channel.
#[derive(Parser, Debug)]
#[command(name = "replay-sim", author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file holding a simulation config; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Modes to evaluate, comma separated (no_def, rolling, window, challenge)
    #[arg(long, value_delimiter = ',')]
    pub modes: Option<Vec<Mode>>,

    /// Trials per mode
    #[arg(long)]
    pub runs: Option<u32>,

    /// Frame loss probability 0.0-1.0
    #[arg(long = "loss")]
    pub p_loss: Option<f64>,

    /// Probability a frame is held for reordering 0.0-1.0
    #[arg(long = "reorder")]
    pub p_reorder: Option<f64>,

    /// Replay window width for window mode (1-128)
    #[arg(long)]
    pub window_size: Option<u32>,

    /// Legitimate frames per trial
    #[arg(long)]
    pub num_legit: Option<u32>,

    /// Replay attempts per trial
    #[arg(long)]
    pub num_replay: Option<u32>,

    /// When replays happen: post or inline
    #[arg(long)]
    pub attack_mode: Option<AttackMode>,

    /// Probability the attacker misses a frame 0.0-1.0
    #[arg(long)]
    pub record_loss: Option<f64>,

    /// Inline mode: chance of a replay burst after each legitimate frame
    #[arg(long)]
    pub inline_probability: Option<f64>,

    /// Inline mode: maximum replays per burst
    #[arg(long)]
    pub inline_burst: Option<u32>,

    /// Command trace file, one command per line ('#' starts a comment)
    #[arg(long)]
    pub commands: Option<PathBuf>,

    /// Random seed for a reproducible sweep
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit results as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Print the resolved configuration before running
    #[arg(long)]
    pub print_config: bool,

    /// Enable verbose (per-trial) logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the simulation config from file and flags.
    pub fn resolve(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => load_file(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(modes) = &self.modes {
            config.modes = modes.clone();
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(p_loss) = self.p_loss {
            config.p_loss = p_loss;
        }
        if let Some(p_reorder) = self.p_reorder {
            config.p_reorder = p_reorder;
        }
        if let Some(window_size) = self.window_size {
            config.window_size = window_size;
        }
        if let Some(num_legit) = self.num_legit {
            config.num_legit = num_legit;
        }
        if let Some(num_replay) = self.num_replay {
            config.num_replay = num_replay;
        }
        if let Some(attack_mode) = self.attack_mode {
            config.attack_mode = attack_mode;
        }
        if let Some(record_loss) = self.record_loss {
            config.attacker_record_loss = record_loss;
        }
        if let Some(probability) = self.inline_probability {
            config.inline_attack_probability = probability;
        }
        if let Some(burst) = self.inline_burst {
            config.inline_attack_burst = burst;
        }
        if let Some(path) = &self.commands {
            config.commands = CommandTrace::load(path)
                .with_context(|| format!("loading command trace {}", path.display()))?;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate().context("invalid simulation configuration")?;
        Ok(config)
    }
}

fn load_file(path: &Path) -> Result<SimulationConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

/// Print the configuration in human-readable form.
pub fn print_config(config: &SimulationConfig, seed: u64) {
    let modes: Vec<&str> = config.modes.iter().map(|m| m.as_str()).collect();

    println!("=== Configuration ===");
    println!("Modes: {}", modes.join(", "));
    println!("Runs per mode: {}", config.runs);
    println!("Seed: {}", seed);
    println!();
    println!("=== Channel ===");
    println!("Loss rate: {:.2}%", config.p_loss * 100.0);
    println!("Reorder rate: {:.2}%", config.p_reorder * 100.0);
    println!();
    println!("=== Traffic ===");
    println!("Legitimate frames: {}", config.num_legit);
    println!("Replay attempts: {}", config.num_replay);
    println!("Window size: {}", config.window_size);
    println!("Commands: {}", config.commands.commands().join(", "));
    println!();
    println!("=== Attacker ===");
    println!("Attack mode: {}", config.attack_mode);
    println!("Record loss: {:.2}%", config.attacker_record_loss * 100.0);
    if config.attack_mode == AttackMode::Inline {
        println!(
            "Inline bursts: p={:.2}, up to {} frames",
            config.inline_attack_probability, config.inline_attack_burst
        );
    }
    println!();
}
