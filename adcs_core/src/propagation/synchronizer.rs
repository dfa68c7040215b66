// adcs_core/src/propagation/synchronizer.rs

use nalgebra::{Quaternion, Vector3};
use tracing::{debug, trace};

use super::FixedStepHandler;
use crate::errors::PropagationError;
use crate::state::layout::{SecondaryStateLayout, SECONDARY_STATES_KEY, SPIN};
use crate::state::store::SharedStateStore;
use crate::state::SpacecraftState;
use crate::types::{Attitude, SimTime, TIME_EPSILON};

/// Second-order Wilcox increment for a rotation vector `θ = Δt·ω`:
/// `dQ = (1 − |θ|²/8, θ/2 · (1 − |θ|²/24))`.
pub fn wilcox_increment(theta: &Vector3<f64>) -> Quaternion<f64> {
    let theta_sq = theta.norm_squared();
    let scalar = 1.0 - theta_sq / 8.0;
    let vector = theta * (0.5 * (1.0 - theta_sq / 24.0));
    Quaternion::from_parts(scalar, vector)
}

/// Advances `q` by body-frame spin `spin` held for `dt`: `q ⊗ dQ`.
/// The result is not normalized.
pub fn wilcox_update(q: &Quaternion<f64>, spin: &Vector3<f64>, dt: f64) -> Quaternion<f64> {
    q * wilcox_increment(&(spin * dt))
}

/// Step handler that turns each completed engine step into a committed
/// attitude.
///
/// It is the only writer of the shared store. A step at or before the last
/// processed time is ignored, so announcing the same instant twice never
/// rotates the body twice.
#[derive(Debug)]
pub struct StepSynchronizer {
    store: SharedStateStore,
    layout: SecondaryStateLayout,
    last_processed: SimTime,
    commits: usize,
}

impl StepSynchronizer {
    pub fn new(store: SharedStateStore) -> Self {
        let last_processed = store.initial().time();
        Self {
            store,
            layout: SecondaryStateLayout::standard(),
            last_processed,
            commits: 0,
        }
    }

    pub fn last_processed(&self) -> SimTime {
        self.last_processed
    }

    /// Number of states committed so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    fn next_state(&self, state: &SpacecraftState) -> Result<SpacecraftState, PropagationError> {
        let time = state.time();
        let previous = self.store.get();
        let dt = time - previous.time();

        let spin = state.secondary_vector(&self.layout, SPIN)?;
        let derivatives = state
            .additional_derivative(SECONDARY_STATES_KEY)
            .ok_or_else(|| PropagationError::MissingAdditionalState(SECONDARY_STATES_KEY.into()))?;
        let acceleration = self.layout.extract_vector3(derivatives, SPIN)?;

        let q = wilcox_update(previous.attitude.rotation.quaternion(), &spin, dt);
        if !q.coords.iter().all(|c| c.is_finite()) || q.norm() == 0.0 {
            return Err(PropagationError::Divergence { time });
        }

        Ok(SpacecraftState {
            orbit: state.orbit.clone(),
            attitude: Attitude::new(time, previous.attitude.frame, q, spin, acceleration),
            mass: state.mass,
            additional: state.additional.clone(),
            additional_derivatives: state.additional_derivatives.clone(),
        })
    }
}

impl FixedStepHandler for StepSynchronizer {
    fn handle_step(
        &mut self,
        state: &SpacecraftState,
        is_last: bool,
    ) -> Result<(), PropagationError> {
        let time = state.time();
        if time <= self.last_processed + TIME_EPSILON {
            trace!(time, last_processed = self.last_processed, "Step already processed");
            return Ok(());
        }

        let next = self.next_state(state)?;
        self.store.set(next)?;
        self.last_processed = time;
        self.commits += 1;

        if is_last {
            debug!(time, commits = self.commits, "Final step committed");
        }
        Ok(())
    }
}
