//! Integration tests for full simulation sweeps.
//!
//! These tests drive the public API end to end: config -> trials -> per-mode
//! statistics, under clean, lossy and reordering channels.

use replay_sim_core::{
    run_simulation, AttackMode, Mode, SimulationConfig, SimulationResult, Simulator,
};

fn base(modes: Vec<Mode>) -> SimulationConfig {
    SimulationConfig {
        modes,
        runs: 50,
        p_loss: 0.0,
        p_reorder: 0.0,
        window_size: 5,
        num_legit: 20,
        num_replay: 50,
        seed: Some(2024),
        ..Default::default()
    }
}

fn result_for(results: &[SimulationResult], mode: Mode) -> &SimulationResult {
    results
        .iter()
        .find(|r| r.mode == mode)
        .expect("mode missing from results")
}

/// Rolling counter on a clean channel: every legit frame accepted, every
/// replay stale.
#[test]
fn test_rolling_clean_channel_scenario() {
    let results = run_simulation(&base(vec![Mode::Rolling])).expect("simulation failed");

    assert_eq!(results.len(), 1);
    let rolling = &results[0];
    assert_eq!(rolling.runs, 50);
    assert_eq!(rolling.avg_legit_rate, 1.0);
    assert_eq!(rolling.std_legit_rate, 0.0);
    assert_eq!(rolling.avg_attack_rate, 0.0);
    assert_eq!(rolling.std_attack_rate, 0.0);
}

/// No defense on a clean channel accepts everything in every run.
#[test]
fn test_no_defense_accepts_everything() {
    for (p_loss, p_reorder) in [(0.0, 0.0), (0.0, 0.5)] {
        let config = SimulationConfig {
            p_loss,
            p_reorder,
            ..base(vec![Mode::NoDefense])
        };
        let sim = Simulator::new(config).unwrap();

        for run in 0..20 {
            let outcome = sim.simulate_one_run(Mode::NoDefense, run).unwrap();
            assert_eq!(outcome.legit_rate(20), 1.0);
            assert_eq!(outcome.attack_rate(50), 1.0);
        }
    }
}

/// Under loss, no-defense still accepts every frame that is delivered.
#[test]
fn test_no_defense_accepts_every_delivered_frame() {
    let config = SimulationConfig {
        p_loss: 0.3,
        p_reorder: 0.3,
        ..base(vec![Mode::NoDefense])
    };
    let sim = Simulator::new(config).unwrap();

    for run in 0..20 {
        let outcome = sim.simulate_one_run(Mode::NoDefense, run).unwrap();
        assert_eq!(
            outcome.legit_accepted + outcome.attack_accepted,
            outcome.channel.delivered
        );
    }
}

/// Total loss: nothing legitimate ever gets through, whatever the defense.
#[test]
fn test_total_loss_zero_legit_rate() {
    let config = SimulationConfig {
        p_loss: 1.0,
        ..base(Mode::ALL.to_vec())
    };
    let sim = Simulator::new(config).unwrap();

    for mode in Mode::ALL {
        for run in 0..10 {
            let outcome = sim.simulate_one_run(mode, run).unwrap();
            assert_eq!(outcome.legit_rate(20), 0.0, "{mode} run {run}");
        }
    }

    for result in sim.run().unwrap() {
        assert_eq!(result.avg_legit_rate, 0.0);
        assert_eq!(result.std_legit_rate, 0.0);
    }
}

/// Results come back one per requested mode, in request order.
#[test]
fn test_results_in_request_order() {
    let order = vec![Mode::Challenge, Mode::NoDefense, Mode::Window];
    let results = run_simulation(&base(order.clone())).unwrap();

    let modes: Vec<Mode> = results.iter().map(|r| r.mode).collect();
    assert_eq!(modes, order);
}

/// Evaluating modes together must match evaluating each alone.
#[test]
fn test_run_independence_across_modes() {
    let noisy = |modes| SimulationConfig {
        p_loss: 0.15,
        p_reorder: 0.25,
        ..base(modes)
    };

    let together = run_simulation(&noisy(vec![Mode::Rolling, Mode::Window])).unwrap();
    let reversed = run_simulation(&noisy(vec![Mode::Window, Mode::Rolling])).unwrap();
    let rolling_alone = run_simulation(&noisy(vec![Mode::Rolling])).unwrap();
    let window_alone = run_simulation(&noisy(vec![Mode::Window])).unwrap();

    assert_eq!(result_for(&together, Mode::Rolling), &rolling_alone[0]);
    assert_eq!(result_for(&together, Mode::Window), &window_alone[0]);
    assert_eq!(result_for(&reversed, Mode::Rolling), &rolling_alone[0]);
    assert_eq!(result_for(&reversed, Mode::Window), &window_alone[0]);
}

/// Seeded sweeps are reproducible; different seeds diverge under noise.
#[test]
fn test_seed_reproducibility() {
    let noisy = |seed| SimulationConfig {
        p_loss: 0.2,
        p_reorder: 0.3,
        attacker_record_loss: 0.1,
        seed: Some(seed),
        ..base(Mode::ALL.to_vec())
    };

    assert_eq!(
        run_simulation(&noisy(7)).unwrap(),
        run_simulation(&noisy(7)).unwrap()
    );
    assert_ne!(
        run_simulation(&noisy(7)).unwrap(),
        run_simulation(&noisy(8)).unwrap()
    );
}

/// Loss lowers legitimate acceptance.
#[test]
fn test_loss_reduces_legit_acceptance() {
    let clean = run_simulation(&base(vec![Mode::Rolling])).unwrap();
    let lossy = run_simulation(&SimulationConfig {
        p_loss: 0.5,
        ..base(vec![Mode::Rolling])
    })
    .unwrap();

    assert!(lossy[0].avg_legit_rate < clean[0].avg_legit_rate);
    assert!(lossy[0].std_legit_rate > 0.0);
}

/// Reordering hurts challenge mode: a held frame is released after its
/// nonce has been superseded.
#[test]
fn test_reorder_costs_challenge_usability() {
    let results = run_simulation(&SimulationConfig {
        p_reorder: 0.5,
        ..base(vec![Mode::Challenge])
    })
    .unwrap();

    assert!(results[0].avg_legit_rate < 1.0);
    assert_eq!(results[0].avg_attack_rate, 0.0);
}

/// Post-hoc replays never beat any defended mode on a clean channel.
#[test]
fn test_defended_modes_block_post_hoc_replays() {
    let modes = vec![Mode::Rolling, Mode::Window, Mode::Challenge];
    let results = run_simulation(&base(modes)).unwrap();

    for result in &results {
        assert_eq!(result.avg_attack_rate, 0.0, "{}", result.mode);
        assert_eq!(result.avg_legit_rate, 1.0, "{}", result.mode);
    }
}

/// An attacker that records less has fewer frames to replay.
#[test]
fn test_record_loss_reduces_captures() {
    let sim = Simulator::new(SimulationConfig {
        attacker_record_loss: 0.5,
        ..base(vec![Mode::NoDefense])
    })
    .unwrap();

    let captured: u64 = (0..20)
        .map(|run| sim.simulate_one_run(Mode::NoDefense, run).unwrap().captured)
        .sum();
    assert!(captured < 20 * 20);
    assert!(captured > 0);
}

/// Zero legitimate frames: nothing to capture, both rates defined as zero.
#[test]
fn test_zero_legit_frames() {
    let results = run_simulation(&SimulationConfig {
        num_legit: 0,
        ..base(vec![Mode::Window, Mode::NoDefense])
    })
    .unwrap();

    for result in &results {
        assert_eq!(result.avg_legit_rate, 0.0);
        assert_eq!(result.avg_attack_rate, 0.0);
        assert_eq!(result.avg_attack_attempts, 0.0);
    }
}

/// Zero replay attempts: attack rate defined as zero, not NaN.
#[test]
fn test_zero_replays() {
    let results = run_simulation(&SimulationConfig {
        num_replay: 0,
        ..base(vec![Mode::NoDefense])
    })
    .unwrap();

    assert_eq!(results[0].avg_attack_rate, 0.0);
    assert_eq!(results[0].avg_legit_rate, 1.0);
}

/// Inline bursts never exceed the configured replay budget.
#[test]
fn test_inline_attack_stays_within_budget() {
    let config = SimulationConfig {
        p_reorder: 0.5,
        attack_mode: AttackMode::Inline,
        inline_attack_probability: 0.5,
        inline_attack_burst: 3,
        ..base(Mode::ALL.to_vec())
    };
    let sim = Simulator::new(config).unwrap();

    for mode in Mode::ALL {
        for run in 0..10 {
            let outcome = sim.simulate_one_run(mode, run).unwrap();
            assert!(outcome.attack_attempts <= 50);
            assert!(outcome.attack_accepted <= outcome.attack_attempts);
        }
    }
}

/// Single run: standard deviation is defined as zero.
#[test]
fn test_single_run_zero_std() {
    let results = run_simulation(&SimulationConfig {
        runs: 1,
        p_loss: 0.4,
        ..base(vec![Mode::Rolling])
    })
    .unwrap();

    assert_eq!(results[0].std_legit_rate, 0.0);
    assert_eq!(results[0].std_attack_rate, 0.0);
}

/// Results serialize with the flat field names callers expect.
#[test]
fn test_result_json_shape() {
    let results = run_simulation(&SimulationConfig {
        runs: 2,
        ..base(vec![Mode::Rolling])
    })
    .unwrap();

    let json = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(json["mode"], "rolling");
    assert_eq!(json["runs"], 2);
    assert_eq!(json["avg_legit_rate"], 1.0);
    assert!(json["reasons"]["replay"].as_u64().unwrap() > 0);
}
