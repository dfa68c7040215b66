// adcs_sim/tests/scenarios.rs

//! Runs the bundled scenario files end to end.

use std::path::PathBuf;

use adcs_sim::prelude::*;
use approx::assert_abs_diff_eq;
use nalgebra::Vector3;

fn scenario(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("assets/scenarios")
        .join(name)
}

#[test]
fn free_rotation_ends_half_a_turn_later() {
    let outcome = adcs_sim::run_scenario(&scenario("free_rotation.toml"), None).unwrap();

    assert!(outcome.is_complete());
    let q = outcome.last_committed.attitude.rotation.into_inner();
    let axis = Vector3::new(1.0, 2.0, 3.0).normalize();
    assert_abs_diff_eq!(q.w.abs(), 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(q.imag(), axis, epsilon = 1e-6);
}

#[test]
fn torque_scenario_reverses_the_spin_up() {
    let outcome = adcs_sim::run_scenario(&scenario("torque_scenario.toml"), Some(22.0)).unwrap();

    let end = &outcome.last_committed;
    assert_abs_diff_eq!(end.time(), 22.0, epsilon = 1e-9);
    assert!(end.attitude.spin.x > 0.0);
    // Coasting between the two windows.
    assert_abs_diff_eq!(end.attitude.acceleration.x, 0.0, epsilon = 1e-12);
}

#[test]
fn loopback_duty_cycle_produces_a_report() {
    let outcome = adcs_sim::run_scenario(&scenario("hardware_loopback.toml"), Some(5.0)).unwrap();
    let report = StateReport::from_outcome(&outcome);

    assert!(report.completed);
    assert_eq!(report.time, 5.0);
    assert!(report.to_toml().unwrap().contains("quaternion"));
}

#[test]
fn every_bundled_scenario_parses() {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios");
    let scenarios = list_scenarios(&dir);
    assert!(scenarios.len() >= 4);
    for path in scenarios {
        load_scenario(&path).unwrap();
    }
}
