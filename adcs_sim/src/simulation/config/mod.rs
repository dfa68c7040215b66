// adcs_sim/src/simulation/config/mod.rs

//! This module handles loading and validating simulation configuration from
//! disk, plus discovery of the scenario files shipped under `assets/`.

mod catalog;

pub mod structs;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

use crate::simulation::errors::SimError;
pub use catalog::{list_scenarios, DEFAULT_SCENARIO_DIR};
pub use structs::{
    ChannelConfig, CommandKind, GyrometerConfig, MagnetometerConfig, OrbitConfig, ScenarioConfig,
    SimulationSection, SpacecraftConfig, TorqueConfig, TorqueStepConfig,
};

/// Prefix of environment variables that override scenario values, e.g.
/// `ADCS_SIMULATION__STEP_SIZE=0.5`.
pub const ENV_PREFIX: &str = "ADCS_";

/// The provider stack for a scenario file: TOML first, environment on top.
pub fn scenario_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Loads, parses and validates the scenario at `path`.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    // A missing file is an empty provider to figment, not an error.
    if !path.is_file() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }
    info!("Loading scenario from: {}", path.display());
    let config = from_figment(scenario_figment(path))?;
    info!(
        torque = config.torque.get_kind_str(),
        duration = config.simulation.duration_seconds,
        step_size = config.simulation.step_size,
        "Scenario loaded"
    );
    Ok(config)
}

/// Extracts and validates a scenario from any provider stack.
pub fn from_figment(figment: Figment) -> Result<ScenarioConfig, SimError> {
    let config: ScenarioConfig = figment.extract()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ScenarioConfig) -> Result<(), SimError> {
    let sim = &config.simulation;
    if !(sim.step_size.is_finite() && sim.step_size > 0.0) {
        return invalid(format!("step_size must be positive, got {}", sim.step_size));
    }
    if !(sim.duration_seconds.is_finite() && sim.duration_seconds >= 0.0) {
        return invalid(format!(
            "duration_seconds must be non-negative, got {}",
            sim.duration_seconds
        ));
    }

    let craft = &config.spacecraft;
    if !(craft.mass.is_finite() && craft.mass > 0.0) {
        return invalid(format!("spacecraft mass must be positive, got {}", craft.mass));
    }
    let q_norm = craft.quaternion.iter().map(|c| c * c).sum::<f64>().sqrt();
    if !(q_norm.is_finite() && q_norm > 0.0) {
        return invalid(format!("initial quaternion {:?} cannot be normalized", craft.quaternion));
    }

    for (sensor, noise) in [
        ("magnetometer", config.magnetometer.noise_stddev),
        ("gyrometer", config.gyrometer.noise_stddev),
    ] {
        if !(noise.is_finite() && noise >= 0.0) {
            return invalid(format!("{} noise_stddev must be non-negative, got {}", sensor, noise));
        }
    }

    match &config.torque {
        TorqueConfig::Scenario { steps, .. } => {
            if let Some(step) = steps.iter().find(|s| !(s.duration >= 0.0)) {
                return invalid(format!("torque step at {} s has a negative duration", step.start));
            }
        }
        TorqueConfig::Controller {
            filter_time_constant,
            sample_period,
            ..
        } => {
            if !(*filter_time_constant > 0.0) {
                return invalid(format!(
                    "filter_time_constant must be positive, got {}",
                    filter_time_constant
                ));
            }
            if let Some(period) = sample_period.filter(|p| !(*p > 0.0)) {
                return invalid(format!("sample_period must be positive, got {}", period));
            }
        }
        TorqueConfig::HardwareLoop { key_prefix, .. } => {
            if key_prefix.is_empty() {
                return invalid("key_prefix must not be empty".to_string());
            }
        }
    }
    Ok(())
}

fn invalid(message: String) -> Result<(), SimError> {
    Err(SimError::InvalidConfig(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcs_core::prelude::{InertiaDivisor, IntegratorKind};

    fn parse(toml: &str) -> Result<ScenarioConfig, SimError> {
        from_figment(Figment::new().merge(Toml::string(toml)))
    }

    #[test]
    fn empty_file_uses_cubesat_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.simulation.step_size, 1.0);
        assert_eq!(config.simulation.integrator, IntegratorKind::Rk4);
        assert_eq!(config.spacecraft.euler_divisor, InertiaDivisor::FirstAxis);
        assert_eq!(config.spacecraft.quaternion, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(config.torque.get_kind_str(), "Scenario");
    }

    #[test]
    fn parses_scripted_torque_profile() {
        let config = parse(
            r#"
            [simulation]
            duration_seconds = 50.0
            step_size = 0.5
            integrator = "Euler"

            [torque]
            kind = "Scenario"
            max_intensity = 0.01
            steps = [
                { start = 0.0, duration = 20.0, direction = [1.0, 0.0, 0.0] },
                { start = 25.0, duration = 20.0, direction = [-1.0, 0.0, 0.0] },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.integrator, IntegratorKind::Euler);
        match config.torque {
            TorqueConfig::Scenario {
                max_intensity,
                steps,
            } => {
                assert_eq!(max_intensity, 0.01);
                assert_eq!(steps.len(), 2);
                assert_eq!(steps[1].direction, [-1.0, 0.0, 0.0]);
            }
            other => panic!("unexpected torque config {:?}", other),
        }
    }

    #[test]
    fn parses_hardware_loop_over_memcached() {
        let config = parse(
            r#"
            [torque]
            kind = "HardwareLoop"
            command = "DutyCycle"

            [torque.channel]
            kind = "Memcached"
            address = "127.0.0.1:11211"
            "#,
        )
        .unwrap();

        match config.torque {
            TorqueConfig::HardwareLoop {
                channel,
                key_prefix,
                command,
                ..
            } => {
                assert_eq!(key_prefix, "Simulation_Torque_");
                assert_eq!(command, CommandKind::DutyCycle);
                assert!(matches!(
                    channel,
                    ChannelConfig::Memcached { timeout_ms: 500, .. }
                ));
            }
            other => panic!("unexpected torque config {:?}", other),
        }
    }

    #[test]
    fn controller_defaults_match_flight_gains() {
        let config = parse("[torque]\nkind = \"Controller\"\n").unwrap();
        match config.torque {
            TorqueConfig::Controller {
                gains,
                filter_time_constant,
                sample_period,
                ..
            } => {
                assert_eq!(gains, [-54_000.0; 3]);
                assert_eq!(filter_time_constant, 5.0);
                assert_eq!(sample_period, None);
            }
            other => panic!("unexpected torque config {:?}", other),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse("[simulation]\nstep_sise = 1.0\n").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for toml in [
            "[simulation]\nstep_size = 0.0\n",
            "[simulation]\nduration_seconds = -1.0\n",
            "[spacecraft]\nquaternion = [0.0, 0.0, 0.0, 0.0]\n",
            "[magnetometer]\nnoise_stddev = -1e-7\n",
            "[gyrometer]\nnoise_stddev = -1e-3\n",
            "[torque]\nkind = \"Controller\"\nsample_period = 0.0\n",
        ] {
            assert!(
                matches!(parse(toml), Err(SimError::InvalidConfig(_))),
                "accepted {}",
                toml
            );
        }
    }

    #[test]
    fn missing_scenario_file_is_reported() {
        let err = load_scenario(Path::new("assets/scenarios/does_not_exist.toml")).unwrap_err();
        assert!(matches!(err, SimError::ScenarioNotFound(_)));
    }
}
