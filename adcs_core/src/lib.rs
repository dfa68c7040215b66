// adcs_core/src/lib.rs

//! Attitude integration and torque control for a small satellite.
//!
//! The crate is engine-agnostic at its seams: the rotational dynamics are
//! exposed as `AdditionalEquations`, the attitude commit as a
//! `FixedStepHandler`, and the body torque as a `TorqueSource`. The
//! `propagation` module supplies a fixed-step engine that drives them.

pub mod errors;
pub mod estimation;
pub mod io;
pub mod models;
pub mod prelude;
pub mod propagation;
pub mod state;
pub mod torque;
pub mod types;
