// adcs_sim/src/lib.rs

//! Scenario-driven runner for the `adcs_core` attitude simulator: TOML
//! configuration, torque provider setup, the run loop and state reports.

// This prelude is for convenience for other files WITHIN the adcs_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

use std::path::Path;

use crate::simulation::config::load_scenario;
use crate::simulation::errors::SimError;
use crate::simulation::runner::{RunOutcome, Simulation};

/// Loads the scenario at `path`, applies `duration` if given, and runs it
/// to completion or to the first fatal error.
pub fn run_scenario(path: &Path, duration: Option<f64>) -> Result<RunOutcome, SimError> {
    let mut config = load_scenario(path)?;
    if let Some(duration) = duration {
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "duration must be non-negative, got {}",
                duration
            )));
        }
        config.simulation.duration_seconds = duration;
    }
    let mut simulation = Simulation::build(&config)?;
    Ok(simulation.run())
}
