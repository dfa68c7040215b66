// adcs_core/src/errors.rs

//! Error taxonomy of the attitude core.
//!
//! Recoverable conditions (`AcquisitionError`) are handled where they occur and
//! never leave the torque source. Everything else is returned to the caller.

use nalgebra::Vector3;
use thiserror::Error;

/// Lookup of a field that the secondary-state layout does not define, or a
/// vector too short to hold it. Always a programming error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("unknown secondary state field '{field}'")]
    OutOfRange { field: String },

    #[error("field '{field}' needs indices {start}..{end} but the vector has {len} entries")]
    VectorTooShort {
        field: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("field '{field}' has {found} entries, expected {expected}")]
    WrongSize {
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("secondary state field '{field}' is declared twice")]
    DuplicateField { field: String },
}

/// A replacement state whose auxiliary vectors do not match the stored state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateCompatibilityError {
    #[error("additional state '{name}' is missing from the replacement state")]
    MissingField { name: String },

    #[error("additional state '{name}' is not present in the stored state")]
    UnexpectedField { name: String },

    #[error("additional state '{name}' has size {found}, expected {expected}")]
    SizeMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Failure to read a usable torque command from the hardware channel.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("channel read for '{key}' failed: {source}")]
    Channel {
        key: String,
        #[source]
        source: ChannelError,
    },

    #[error("no value stored under '{key}'")]
    Missing { key: String },

    #[error("value under '{key}' is {} bytes [{}], expected 8", .bytes.len(), hex(.bytes))]
    Malformed { key: String, bytes: Vec<u8> },

    #[error("decoded command {command:?} is not finite")]
    NonFinite { command: Vector3<f64> },
}

/// Transport-level failure of a key-value command channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid key '{0}'")]
    InvalidKey(String),

    #[error("could not resolve address '{0}'")]
    Unresolved(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("time constant must be positive and finite, got {0}")]
    InvalidTimeConstant(f64),

    #[error("sample period must be positive and finite, got {0}")]
    InvalidSamplePeriod(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InertiaError {
    #[error("principal moment I{axis} must be positive and finite, got {value}")]
    NonPositiveMoment { axis: usize, value: f64 },
}

/// Fatal failure of a propagation step. No state is committed when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("integration diverged at t = {time} s")]
    Divergence { time: f64 },

    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("equation '{name}' expects {expected} state entries, found {found}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("additional state '{0}' is not registered")]
    MissingAdditionalState(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    StateCompatibility(#[from] StateCompatibilityError),
}

/// Space-separated lowercase hex, e.g. `3f f0`.
fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
