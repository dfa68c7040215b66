// adcs_core/src/torque/hardware.rs

use nalgebra::Vector3;
use tracing::{debug, error};

use super::{AcquisitionSchedule, TorqueSample, TorqueSource};
use crate::errors::AcquisitionError;
use crate::io::channel::CommandChannel;
use crate::io::{axis_keys, codec};
use crate::models::actuators::MagnetorquerArray;
use crate::models::magnetometer::MagneticFieldSensor;
use crate::state::store::StepClock;
use crate::types::{same_instant, SimTime};

/// Where the hardware loop is within the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPhase {
    /// Waiting for the first evaluation of a new step.
    AwaitingStep,
    /// Reading the command channel.
    Acquiring,
    /// Serving the torque acquired for this step.
    Holding,
}

/// How the three values read from the channel are turned into a torque.
#[derive(Debug)]
pub enum HardwareCommand {
    /// Body torque in N·m.
    Torque,
    /// Per-axis magnetorquer duty cycles in [-1, 1]. The resulting dipole is
    /// crossed with the true field at acquisition time.
    DutyCycle {
        actuators: MagnetorquerArray,
        sensor: Box<dyn MagneticFieldSensor>,
    },
}

/// Torque commanded by external flight software through a key-value channel.
///
/// The channel is read at most once per step, at the step start. The torque
/// is then held constant until the next step. A failed read is logged and
/// the previous torque is kept, so bad data never reaches the dynamics.
#[derive(Debug)]
pub struct HardwareLoopTorqueSource {
    channel: Box<dyn CommandChannel>,
    key_prefix: String,
    keys: [String; 3],
    command: HardwareCommand,
    schedule: AcquisitionSchedule,
    phase: AcquisitionPhase,
    cached: Vector3<f64>,
    valid: bool,
    failures: usize,
}

impl HardwareLoopTorqueSource {
    pub fn new(
        channel: Box<dyn CommandChannel>,
        key_prefix: impl Into<String>,
        command: HardwareCommand,
        clock: StepClock,
        step_size: f64,
    ) -> Self {
        let key_prefix = key_prefix.into();
        Self {
            channel,
            keys: axis_keys(&key_prefix),
            key_prefix,
            command,
            schedule: AcquisitionSchedule::new(clock, step_size),
            phase: AcquisitionPhase::AwaitingStep,
            cached: Vector3::zeros(),
            valid: true,
            failures: 0,
        }
    }

    pub fn phase(&self) -> AcquisitionPhase {
        self.phase
    }

    /// The torque currently held, N·m.
    pub fn cached_torque(&self) -> Vector3<f64> {
        self.cached
    }

    /// Number of acquisitions that failed since construction.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn next_acquisition(&self) -> SimTime {
        self.schedule.next()
    }

    fn read_axis(&mut self, axis: usize) -> Result<f64, AcquisitionError> {
        let key = &self.keys[axis];
        let bytes = self
            .channel
            .fetch(key)
            .map_err(|source| AcquisitionError::Channel {
                key: key.clone(),
                source,
            })?
            .ok_or_else(|| AcquisitionError::Missing { key: key.clone() })?;
        match codec::decode_f64(&bytes) {
            Some(value) => Ok(value),
            None => Err(AcquisitionError::Malformed {
                key: key.clone(),
                bytes,
            }),
        }
    }

    fn read_command(&mut self) -> Result<Vector3<f64>, AcquisitionError> {
        let command = Vector3::new(self.read_axis(0)?, self.read_axis(1)?, self.read_axis(2)?);
        if command.iter().all(|c| c.is_finite()) {
            Ok(command)
        } else {
            Err(AcquisitionError::NonFinite { command })
        }
    }

    fn acquire(&mut self, sim_time: SimTime) -> Result<Vector3<f64>, AcquisitionError> {
        let command = self.read_command()?;
        let torque = match &self.command {
            HardwareCommand::Torque => command,
            HardwareCommand::DutyCycle { actuators, sensor } => {
                let dipole = actuators.dipole_from_duty(&command);
                MagnetorquerArray::torque(&dipole, &sensor.true_field(sim_time))
            }
        };
        Ok(torque)
    }
}

impl TorqueSource for HardwareLoopTorqueSource {
    fn torque_at(&mut self, sim_time: SimTime) -> TorqueSample {
        if self.phase == AcquisitionPhase::Holding
            && same_instant(self.schedule.step_start(), self.schedule.next())
        {
            self.phase = AcquisitionPhase::AwaitingStep;
        }

        if self.schedule.is_due(sim_time) {
            self.phase = AcquisitionPhase::Acquiring;
            match self.acquire(sim_time) {
                Ok(torque) => {
                    debug!(time = sim_time, torque = ?torque, "Acquired hardware torque");
                    self.cached = torque;
                    self.valid = true;
                }
                Err(e) => {
                    self.failures += 1;
                    self.valid = false;
                    error!(
                        time = sim_time,
                        key_prefix = %self.key_prefix,
                        sample = %e,
                        held_torque = ?self.cached,
                        "Hardware torque acquisition failed, holding previous torque"
                    );
                }
            }
            self.schedule.advance();
            self.phase = AcquisitionPhase::Holding;
        }

        if self.valid {
            TorqueSample::valid(self.cached)
        } else {
            TorqueSample::stale(self.cached)
        }
    }
}
