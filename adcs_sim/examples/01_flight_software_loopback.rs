// adcs_sim/examples/01_flight_software_loopback.rs

//! A full end-to-end hardware-in-the-loop run without external processes.
//!
//! This example demonstrates how to:
//! 1. Load the loopback scenario and force its channel to carry torques.
//! 2. Build a `Simulation` and grab its in-process command channel.
//! 3. Play the flight software as a step handler that reads the published
//!    gyro keys and answers with a rate damping torque every step.
//!
//! To run this example:
//! `cargo run --example 01_flight_software_loopback`

use std::path::Path;

use adcs_core::errors::ChannelError;
use adcs_core::io::{axis_keys, codec, publish_vector, DEFAULT_TORQUE_KEY_PREFIX, GYROMETER_KEY_PREFIX};
use adcs_sim::prelude::*;
use nalgebra::Vector3;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Proportional rate damping, N·m per rad/s.
const DAMPING_GAIN: f64 = 2.0e-4;

/// Reads the gyro keys and publishes `-k·ω`.
struct FlightSoftware {
    channel: InMemoryChannel,
}

impl FlightSoftware {
    fn read_gyro(&mut self) -> Result<Option<Vector3<f64>>, ChannelError> {
        let mut spin = Vector3::zeros();
        for (axis, key) in axis_keys(GYROMETER_KEY_PREFIX).iter().enumerate() {
            match self.channel.fetch(key)?.as_deref().and_then(codec::decode_f64) {
                Some(rate) => spin[axis] = rate,
                None => return Ok(None),
            }
        }
        Ok(Some(spin))
    }

    fn respond(&mut self) -> Result<(), ChannelError> {
        // No reading yet means the previous torque is held.
        if let Some(spin) = self.read_gyro()? {
            publish_vector(&mut self.channel, DEFAULT_TORQUE_KEY_PREFIX, &(-spin * DAMPING_GAIN))?;
        }
        Ok(())
    }
}

impl FixedStepHandler for FlightSoftware {
    fn handle_step(&mut self, _state: &SpacecraftState, _is_last: bool) -> Result<(), PropagationError> {
        if let Err(e) = self.respond() {
            tracing::warn!(error = %e, "Flight software could not answer");
        }
        Ok(())
    }
}

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info,adcs_core=warn"))
        .init();

    // --- 1. Load Simulation Configuration ---
    let scenario_path = Path::new("assets/scenarios/hardware_loopback.toml");
    let mut config = load_scenario(scenario_path)?;
    config.spacecraft.spin = [0.05, -0.03, 0.02];
    if let TorqueConfig::HardwareLoop { command, .. } = &mut config.torque {
        *command = CommandKind::Torque;
    }

    // --- 2. Build the simulation and attach the flight software ---
    let mut simulation = Simulation::build(&config)?;
    let channel = simulation
        .loopback_channel()
        .cloned()
        .ok_or_else(|| SimError::InvalidConfig("scenario has no loopback channel".into()))?;
    simulation.add_step_handler(Box::new(FlightSoftware { channel }));

    // --- 3. Run and print the final state ---
    let outcome = simulation.run();
    let report = StateReport::from_outcome(&outcome);
    info!(
        initial_rate = Vector3::from(config.spacecraft.spin).norm(),
        final_rate = outcome.last_committed.attitude.spin.norm(),
        "Rate damping finished"
    );
    println!("{}", report.to_toml()?);
    Ok(())
}
