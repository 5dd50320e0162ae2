//! Result rendering: a human-readable summary table or a JSON document.

use replay_sim_core::{SimulationConfig, SimulationResult};
use serde::Serialize;

/// Machine-readable report written with `--json`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub config: &'a SimulationConfig,
    pub seed: u64,
    pub results: &'a [SimulationResult],
}

impl<'a> Report<'a> {
    pub fn new(config: &'a SimulationConfig, seed: u64, results: &'a [SimulationResult]) -> Self {
        Self {
            config,
            seed,
            results,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print the per-mode table followed by verdict and channel breakdowns.
    pub fn print_summary(&self) {
        println!("=== Results (seed {}) ===", self.seed);
        println!(
            "{:<10} {:>6} {:>18} {:>18} {:>10}",
            "mode", "runs", "legit accept", "attack success", "attempts"
        );
        for result in self.results {
            let legit = result.legit();
            let attack = result.attack();
            println!(
                "{:<10} {:>6} {:>18} {:>18} {:>10.1}",
                result.mode.as_str(),
                result.runs,
                format!("{:.2}% ± {:.2}", legit.mean * 100.0, legit.std_dev * 100.0),
                format!("{:.2}% ± {:.2}", attack.mean * 100.0, attack.std_dev * 100.0),
                result.avg_attack_attempts,
            );
        }
        println!();

        println!("=== Verdicts ===");
        for result in self.results {
            let counts: Vec<String> = result
                .reasons
                .iter()
                .map(|(reason, count)| format!("{}={}", reason, count))
                .collect();
            println!(
                "{:<10} accepted {}/{}: {}",
                result.mode.as_str(),
                result.reasons.accepted(),
                result.reasons.total(),
                counts.join(" ")
            );
        }
        println!();

        println!("=== Channel ===");
        for result in self.results {
            let channel = &result.channel;
            println!(
                "{:<10} sent={} dropped={} ({:.2}%) held={} ({:.2}%) delivered={}",
                result.mode.as_str(),
                channel.sent,
                channel.dropped,
                channel.loss_rate() * 100.0,
                channel.held,
                channel.reorder_rate() * 100.0,
                channel.delivered,
            );
        }
    }
}
