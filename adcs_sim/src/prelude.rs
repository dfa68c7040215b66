// adcs_sim/src/prelude.rs

// Re-export the entire adcs_core prelude so binaries and tests can reach
// the pure types like `SpacecraftState`, `TorqueSource`, etc.
pub use adcs_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::config::{list_scenarios, load_scenario};
pub use crate::simulation::errors::SimError;
pub use crate::simulation::report::StateReport;
pub use crate::simulation::runner::{RunOutcome, Simulation};
