// adcs_core/src/state/store.rs

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::SpacecraftState;
use crate::errors::StateCompatibilityError;
use crate::types::SimTime;

/// Holds the initial and current spacecraft states.
///
/// Both are immutable snapshots. `set` swaps in a freshly built state, so a
/// reader holding the previous `Arc` never sees it change underneath it.
#[derive(Debug)]
pub struct AttitudeStateStore {
    initial: Arc<SpacecraftState>,
    current: Arc<SpacecraftState>,
}

impl AttitudeStateStore {
    /// The initial state also becomes the current state.
    pub fn new(initial: SpacecraftState) -> Self {
        let initial = Arc::new(initial);
        Self {
            current: Arc::clone(&initial),
            initial,
        }
    }

    pub fn get(&self) -> Arc<SpacecraftState> {
        Arc::clone(&self.current)
    }

    pub fn initial(&self) -> Arc<SpacecraftState> {
        Arc::clone(&self.initial)
    }

    /// Replaces the current state. On error the store is left untouched.
    pub fn set(&mut self, new_state: SpacecraftState) -> Result<(), StateCompatibilityError> {
        self.current = Arc::new(Self::rebuild(&self.current, new_state)?);
        Ok(())
    }

    /// Replaces the initial state, with the same shape check as `set`.
    pub fn set_initial(&mut self, new_state: SpacecraftState) -> Result<(), StateCompatibilityError> {
        self.initial = Arc::new(Self::rebuild(&self.initial, new_state)?);
        Ok(())
    }

    fn rebuild(
        prior: &SpacecraftState,
        new_state: SpacecraftState,
    ) -> Result<SpacecraftState, StateCompatibilityError> {
        prior.ensure_compatible_additional_states(&new_state)?;

        let SpacecraftState {
            orbit,
            attitude,
            mass,
            additional,
            additional_derivatives,
        } = new_state;

        let mut state = SpacecraftState::new(orbit, attitude, mass);
        for (name, values) in additional {
            state = state.add_additional_state(name, values);
        }
        state.additional_derivatives = additional_derivatives;
        Ok(state)
    }
}

/// Cloneable handle to the single store shared by the synchronizer (the only
/// writer) and the components that read from it.
#[derive(Debug, Clone)]
pub struct SharedStateStore(Arc<RwLock<AttitudeStateStore>>);

impl SharedStateStore {
    pub fn new(initial: SpacecraftState) -> Self {
        Self(Arc::new(RwLock::new(AttitudeStateStore::new(initial))))
    }

    fn read(&self) -> RwLockReadGuard<'_, AttitudeStateStore> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AttitudeStateStore> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> Arc<SpacecraftState> {
        self.read().get()
    }

    pub fn initial(&self) -> Arc<SpacecraftState> {
        self.read().initial()
    }

    pub fn set(&self, new_state: SpacecraftState) -> Result<(), StateCompatibilityError> {
        let time = new_state.time();
        self.write().set(new_state)?;
        debug!(time, "Committed spacecraft state");
        Ok(())
    }

    pub fn set_initial(&self, new_state: SpacecraftState) -> Result<(), StateCompatibilityError> {
        self.write().set_initial(new_state)
    }

    /// A read-only view exposing only the step-start time.
    pub fn clock(&self) -> StepClock {
        StepClock(self.clone())
    }
}

/// Read-only view handed to torque sources. The step-start time is the
/// timestamp of the last committed state, i.e. the start of the step the
/// engine is currently integrating.
#[derive(Debug, Clone)]
pub struct StepClock(SharedStateStore);

impl StepClock {
    pub fn step_start(&self) -> SimTime {
        self.0.get().time()
    }
}
