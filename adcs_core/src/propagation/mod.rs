// adcs_core/src/propagation/mod.rs

//! Stand-in for the external orbital propagation engine, plus the step
//! handler that keeps the committed attitude in sync with it.

pub mod integrators;
pub mod orbit;
pub mod propagator;
pub mod synchronizer;

pub use integrators::{Euler, Integrator, IntegratorKind, Rk4};
pub use orbit::{MainDynamics, TwoBodyGravity};
pub use propagator::FixedStepPropagator;
pub use synchronizer::StepSynchronizer;

use crate::errors::PropagationError;
use crate::state::SpacecraftState;

/// An auxiliary ODE integrated alongside the main state.
///
/// The engine owns the auxiliary vector registered under `name()` in the
/// spacecraft state and calls `compute_derivatives` at every integrator
/// stage, in no guaranteed time order.
pub trait AdditionalEquations: Send {
    fn name(&self) -> &str;

    fn dimension(&self) -> usize;

    /// Writes `d(secondary)/dt` into `out`. `state` is the stage state
    /// (stage time and orbit; attitude as of the step start).
    fn compute_derivatives(
        &mut self,
        state: &SpacecraftState,
        secondary: &[f64],
        out: &mut [f64],
    ) -> Result<(), PropagationError>;
}

/// Receives the state at the end of every fixed step, in increasing time
/// order. The start state is announced once before the first step.
pub trait FixedStepHandler: Send {
    fn handle_step(&mut self, state: &SpacecraftState, is_last: bool)
        -> Result<(), PropagationError>;
}
