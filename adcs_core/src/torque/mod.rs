// adcs_core/src/torque/mod.rs

//! Pluggable sources of the body torque fed into Euler's equations.

pub mod controller;
pub mod hardware;
pub mod scenario;

use std::fmt::Debug;

use nalgebra::Vector3;

use crate::state::store::StepClock;
use crate::types::{same_instant, SimTime};

pub use controller::ControllerTorqueSource;
pub use hardware::{AcquisitionPhase, HardwareCommand, HardwareLoopTorqueSource};
pub use scenario::{ScenarioTorqueSource, TorqueStep};

/// Torque applied to the body at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueSample {
    /// Body frame, N·m.
    pub torque: Vector3<f64>,
    /// False when the source is holding a stale value after a failed read.
    pub valid: bool,
}

impl TorqueSample {
    pub fn valid(torque: Vector3<f64>) -> Self {
        Self {
            torque,
            valid: true,
        }
    }

    pub fn stale(torque: Vector3<f64>) -> Self {
        Self {
            torque,
            valid: false,
        }
    }

    pub fn zero() -> Self {
        Self::valid(Vector3::zeros())
    }
}

/// The contract for anything that can supply the body torque.
///
/// Called once per derivative evaluation, which may happen several times per
/// step and not in increasing time order. Implementations that sample the
/// outside world must do so only at step boundaries.
pub trait TorqueSource: Debug + Send {
    fn torque_at(&mut self, sim_time: SimTime) -> TorqueSample;
}

/// Decides when a step-synchronous source may sample: exactly once per
/// committed step, at the first evaluation that lands on the step start.
#[derive(Debug, Clone)]
pub struct AcquisitionSchedule {
    clock: StepClock,
    step_size: f64,
    next: SimTime,
}

impl AcquisitionSchedule {
    /// The first acquisition is due at the current step start.
    pub fn new(clock: StepClock, step_size: f64) -> Self {
        let next = clock.step_start();
        Self {
            clock,
            step_size,
            next,
        }
    }

    /// True when `sim_time` is both the scheduled time and the start of the
    /// step being integrated.
    pub fn is_due(&self, sim_time: SimTime) -> bool {
        same_instant(sim_time, self.next) && same_instant(sim_time, self.clock.step_start())
    }

    /// Schedules the next acquisition one step after the current step start.
    /// Called after every attempt, successful or not.
    pub fn advance(&mut self) {
        self.next = self.clock.step_start() + self.step_size;
    }

    pub fn next(&self) -> SimTime {
        self.next
    }

    pub fn step_start(&self) -> SimTime {
        self.clock.step_start()
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use nalgebra::Vector3;

    use crate::state::store::SharedStateStore;
    use crate::state::SpacecraftState;
    use crate::types::{Attitude, OrbitState, ReferenceFrame};

    /// A store whose current state sits at `time`.
    pub fn store_at(time: f64) -> SharedStateStore {
        SharedStateStore::new(state_at(time))
    }

    pub fn state_at(time: f64) -> SpacecraftState {
        SpacecraftState::new(
            OrbitState::new(time, Vector3::new(7.0e6, 0.0, 0.0), Vector3::zeros()),
            Attitude::identity(time, ReferenceFrame::Eme2000),
            1.0,
        )
    }
}
