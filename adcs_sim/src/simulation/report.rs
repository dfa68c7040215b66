// adcs_sim/src/simulation/report.rs

use std::fs;
use std::path::Path;

use adcs_core::prelude::{ReferenceFrame, SpacecraftState};
use serde::Serialize;
use tracing::info;

use crate::simulation::errors::SimError;
use crate::simulation::runner::RunOutcome;

/// Final state of a run, written as TOML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateReport {
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub target_time: f64,
    pub time: f64,
    pub frame: ReferenceFrame,
    /// `[w, x, y, z]`
    pub quaternion: [f64; 4],
    pub spin: [f64; 3],
    pub acceleration: [f64; 3],
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub mass: f64,
}

impl StateReport {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let mut report = Self::from_state(&outcome.last_committed);
        report.completed = outcome.is_complete();
        report.failure = outcome.failure.as_ref().map(|e| e.to_string());
        report.target_time = outcome.target;
        report
    }

    pub fn from_state(state: &SpacecraftState) -> Self {
        let q = state.attitude.rotation.quaternion();
        let attitude = &state.attitude;
        Self {
            completed: true,
            failure: None,
            target_time: state.time(),
            time: state.time(),
            frame: attitude.frame,
            quaternion: [q.w, q.i, q.j, q.k],
            spin: attitude.spin.into(),
            acceleration: attitude.acceleration.into(),
            position: state.orbit.position.into(),
            velocity: state.orbit.velocity.into(),
            mass: state.mass,
        }
    }

    pub fn to_toml(&self) -> Result<String, SimError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), SimError> {
        fs::write(path, self.to_toml()?)?;
        info!("Wrote state report to {}", path.display());
        Ok(())
    }
}
