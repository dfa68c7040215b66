// adcs_core/src/torque/scenario.rs

use nalgebra::Vector3;

use super::{TorqueSample, TorqueSource};
use crate::types::SimTime;

/// Default torque magnitude for scripted steps, N·m.
pub const DEFAULT_MAX_INTENSITY: f64 = 0.1;

/// One scripted torque window, relative to the scenario epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueStep {
    /// Seconds after the epoch at which the step begins.
    pub start: f64,
    /// Seconds the step lasts.
    pub duration: f64,
    /// Direction in the body frame, scaled by the scenario intensity.
    pub direction: Vector3<f64>,
}

impl TorqueStep {
    pub fn new(start: f64, duration: f64, direction: Vector3<f64>) -> Self {
        Self {
            start,
            duration,
            direction,
        }
    }

    /// Half-open window `[start, start + duration)`.
    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.start && offset < self.start + self.duration
    }
}

/// Piecewise-constant torque script. Stateless in time: the same instant
/// always yields the same torque.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTorqueSource {
    epoch: SimTime,
    max_intensity: f64,
    steps: Vec<TorqueStep>,
}

impl ScenarioTorqueSource {
    pub fn new(epoch: SimTime, max_intensity: f64, steps: Vec<TorqueStep>) -> Self {
        Self {
            epoch,
            max_intensity,
            steps,
        }
    }

    /// An empty script at the default intensity.
    pub fn at_epoch(epoch: SimTime) -> Self {
        Self::new(epoch, DEFAULT_MAX_INTENSITY, Vec::new())
    }

    pub fn add_step(&mut self, step: TorqueStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[TorqueStep] {
        &self.steps
    }

    pub fn max_intensity(&self) -> f64 {
        self.max_intensity
    }

    /// Torque at `sim_time`. The first matching step wins when steps overlap.
    pub fn torque(&self, sim_time: SimTime) -> Vector3<f64> {
        let offset = sim_time - self.epoch;
        self.steps
            .iter()
            .find(|step| step.contains(offset))
            .map(|step| step.direction * self.max_intensity)
            .unwrap_or_else(Vector3::zeros)
    }
}

impl TorqueSource for ScenarioTorqueSource {
    fn torque_at(&mut self, sim_time: SimTime) -> TorqueSample {
        TorqueSample::valid(self.torque(sim_time))
    }
}
