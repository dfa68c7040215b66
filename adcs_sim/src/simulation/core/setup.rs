// adcs_sim/src/simulation/core/setup.rs

//! Turns a parsed `ScenarioConfig` into the objects the engine runs with.

use std::time::Duration;

use adcs_core::io::{codec, publish_vector};
use adcs_core::prelude::*;
use nalgebra::{Quaternion, Vector3};
use tracing::{info, warn};

use crate::simulation::config::structs::vec3;
use crate::simulation::config::{ChannelConfig, CommandKind, ScenarioConfig, TorqueConfig};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::errors::SimError;
use crate::simulation::sensors::NoisyMagnetometer;

/// The torque provider chosen for a run, plus the in-process channel when
/// the hardware loop runs in loopback.
#[derive(Debug)]
pub struct TorqueSetup {
    pub source: Box<dyn TorqueSource>,
    pub loopback: Option<InMemoryChannel>,
    /// Second handle on the hardware loop's store, for sensor readings.
    pub sensor_link: Option<Box<dyn CommandChannel>>,
}

/// Handles on the flight software's key-value store.
struct ChannelLink {
    commands: Box<dyn CommandChannel>,
    sensors: Box<dyn CommandChannel>,
    loopback: Option<InMemoryChannel>,
}

/// The spacecraft state at the simulation start, with the packed secondary
/// vector already registered.
pub fn initial_state(config: &ScenarioConfig) -> Result<SpacecraftState, SimError> {
    let craft = &config.spacecraft;
    let [w, x, y, z] = craft.quaternion;
    let attitude = Attitude::new(
        0.0,
        craft.frame,
        Quaternion::new(w, x, y, z),
        vec3(craft.spin),
        vec3(craft.acceleration),
    );
    let orbit = OrbitState::new(0.0, vec3(config.orbit.position), vec3(config.orbit.velocity));
    let state = SpacecraftState::with_secondary_states(
        orbit,
        attitude,
        craft.mass,
        &SecondaryStateLayout::standard(),
    )?;
    Ok(state)
}

/// Rigid-body model from the `[spacecraft]` section.
pub fn rotational_model(config: &ScenarioConfig) -> Result<RotationalAccelerationModel, SimError> {
    let inertia = InertiaModel::new_diagonal(vec3(config.spacecraft.inertia))?;
    Ok(RotationalAccelerationModel::new(
        inertia,
        config.spacecraft.euler_divisor,
    ))
}

/// Builds the one torque provider the scenario asks for.
pub fn torque_source(
    config: &ScenarioConfig,
    store: &SharedStateStore,
    rng: &mut SimulationRng,
) -> Result<TorqueSetup, SimError> {
    let step_size = config.simulation.step_size;
    let epoch = store.initial().time();
    let field = FixedInertialField::new(vec3(config.magnetometer.inertial_field), store.clone());

    let setup = match &config.torque {
        TorqueConfig::Scenario {
            max_intensity,
            steps,
        } => {
            let steps = steps
                .iter()
                .map(|s| TorqueStep::new(s.start, s.duration, vec3(s.direction)))
                .collect::<Vec<_>>();
            info!(
                windows = steps.len(),
                max_intensity, "Using scripted torque profile"
            );
            TorqueSetup {
                source: Box::new(ScenarioTorqueSource::new(epoch, *max_intensity, steps)),
                loopback: None,
                sensor_link: None,
            }
        }
        TorqueConfig::Controller {
            gains,
            max_dipole,
            filter_time_constant,
            sample_period,
        } => {
            let sample_period = sample_period.unwrap_or(step_size);
            let estimator = BdotEstimator::new(*filter_time_constant, sample_period)?;
            let sensor = NoisyMagnetometer::new(field, config.magnetometer.noise_stddev, rng.fork())?;
            info!(
                gains = ?gains,
                time_constant = filter_time_constant,
                sample_period,
                "Using B-dot controller"
            );
            TorqueSetup {
                source: Box::new(ControllerTorqueSource::new(
                    Box::new(sensor),
                    estimator,
                    vec3(*gains),
                    MagnetorquerArray::new(vec3(*max_dipole)),
                    store.clock(),
                    step_size,
                )),
                loopback: None,
                sensor_link: None,
            }
        }
        TorqueConfig::HardwareLoop {
            channel,
            key_prefix,
            command,
            max_dipole,
        } => {
            let link = command_channel(channel, key_prefix)?;
            let command = match command {
                CommandKind::Torque => HardwareCommand::Torque,
                CommandKind::DutyCycle => HardwareCommand::DutyCycle {
                    actuators: MagnetorquerArray::new(vec3(*max_dipole)),
                    sensor: Box::new(field),
                },
            };
            info!(key_prefix = %key_prefix, "Using hardware-in-the-loop torque");
            TorqueSetup {
                source: Box::new(HardwareLoopTorqueSource::new(
                    link.commands,
                    key_prefix.as_str(),
                    command,
                    store.clock(),
                    step_size,
                )),
                loopback: link.loopback,
                sensor_link: Some(link.sensors),
            }
        }
    };
    Ok(setup)
}

fn command_channel(config: &ChannelConfig, key_prefix: &str) -> Result<ChannelLink, SimError> {
    match config {
        ChannelConfig::Memory { preset } => {
            let mut channel = InMemoryChannel::new();
            publish_vector(&mut channel, key_prefix, &Vector3::from(*preset))?;
            info!(preset = ?preset, "Hardware loop running on an in-process channel");
            Ok(ChannelLink {
                commands: Box::new(channel.clone()),
                sensors: Box::new(channel.clone()),
                loopback: Some(channel),
            })
        }
        ChannelConfig::Memcached {
            address,
            timeout_ms,
        } => {
            if *timeout_ms == 0 {
                warn!(address = %address, "Zero channel timeout, falling back to the default");
            }
            let timeout = match *timeout_ms {
                0 => adcs_core::io::memcached::DEFAULT_TIMEOUT,
                ms => Duration::from_millis(ms),
            };
            let commands = MemcachedChannel::new(address, timeout)?;
            let sensors = MemcachedChannel::new(address, timeout)?;
            info!(
                address = %commands.address(),
                flag = codec::RAW_DATA_FLAG,
                "Hardware loop connected to memcached"
            );
            Ok(ChannelLink {
                commands: Box::new(commands),
                sensors: Box::new(sensors),
                loopback: None,
            })
        }
    }
}
