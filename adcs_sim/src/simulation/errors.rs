// adcs_sim/src/simulation/errors.rs

use std::path::PathBuf;

use adcs_core::prelude::{ChannelError, FilterError, InertiaError, LayoutError, PropagationError};
use thiserror::Error;

/// Everything that can stop a simulation from being built, run or reported.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Scenario file not found: {0}")]
    ScenarioNotFound(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Command channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Propagation failed: {0}")]
    Propagation(#[from] PropagationError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Inertia(#[from] InertiaError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for SimError {
    fn from(e: figment::Error) -> Self {
        SimError::Config(Box::new(e))
    }
}
