// adcs_core/src/propagation/propagator.rs

use nalgebra::{DVector, Vector3};
use tracing::{debug, info};

use super::integrators::Integrator;
use super::orbit::MainDynamics;
use super::{AdditionalEquations, FixedStepHandler};
use crate::errors::PropagationError;
use crate::state::SpacecraftState;
use crate::types::{SimTime, TIME_EPSILON};

/// Position and velocity lead the integrated vector.
const MAIN_DIM: usize = 6;

/// Fixed-step numerical propagator.
///
/// The integrated vector is `[position, velocity, aux_1, aux_2, ...]` with one
/// auxiliary block per registered `AdditionalEquations`, in registration
/// order. Auxiliary vectors with no registered equations are carried through
/// unchanged, and so is the attitude: the committed attitude lives in the
/// state store, not in the engine.
pub struct FixedStepPropagator {
    state: SpacecraftState,
    step_size: f64,
    integrator: Box<dyn Integrator>,
    dynamics: Box<dyn MainDynamics>,
    equations: Vec<Box<dyn AdditionalEquations>>,
    handlers: Vec<Box<dyn FixedStepHandler>>,
}

impl FixedStepPropagator {
    pub fn new(
        initial: SpacecraftState,
        step_size: f64,
        integrator: Box<dyn Integrator>,
        dynamics: Box<dyn MainDynamics>,
    ) -> Result<Self, PropagationError> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(PropagationError::InvalidStepSize(step_size));
        }
        Ok(Self {
            state: initial,
            step_size,
            integrator,
            dynamics,
            equations: Vec::new(),
            handlers: Vec::new(),
        })
    }

    /// Registers an auxiliary ODE. Its vector must already be present in the
    /// state with the declared dimension.
    pub fn add_additional_equations(
        &mut self,
        equations: Box<dyn AdditionalEquations>,
    ) -> Result<(), PropagationError> {
        let name = equations.name().to_string();
        let found = self
            .state
            .additional_state(&name)
            .ok_or_else(|| PropagationError::MissingAdditionalState(name.clone()))?
            .len();
        if found != equations.dimension() {
            return Err(PropagationError::DimensionMismatch {
                name,
                expected: equations.dimension(),
                found,
            });
        }
        debug!(name = %name, dimension = found, "Registered additional equations");
        self.equations.push(equations);
        Ok(())
    }

    pub fn add_step_handler(&mut self, handler: Box<dyn FixedStepHandler>) {
        self.handlers.push(handler);
    }

    pub fn state(&self) -> &SpacecraftState {
        &self.state
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Integrates whole fixed steps up to `target` and returns the final
    /// engine state. A trailing partial step is not integrated.
    ///
    /// On error the engine stays at the start of the failed step. Handlers
    /// registered before the failing one have already seen the step end, so
    /// a synchronizer ahead of it may have committed one step further.
    pub fn propagate(&mut self, target: SimTime) -> Result<SpacecraftState, PropagationError> {
        let start = self.state.time();
        let steps = ((target - start) / self.step_size + TIME_EPSILON).floor().max(0.0) as usize;
        info!(start, target, steps, step_size = self.step_size, "Propagating");

        for handler in &mut self.handlers {
            handler.handle_step(&self.state, steps == 0)?;
        }

        for k in 0..steps {
            let next = self.advance()?;
            let is_last = k + 1 == steps;
            for handler in &mut self.handlers {
                handler.handle_step(&next, is_last)?;
            }
            self.state = next;
        }

        let remainder = target - self.state.time();
        if remainder > TIME_EPSILON {
            debug!(remainder, "Final partial step not integrated");
        }
        Ok(self.state.clone())
    }

    /// One fixed step from the current engine state.
    fn advance(&mut self) -> Result<SpacecraftState, PropagationError> {
        let Self {
            state,
            step_size,
            integrator,
            dynamics,
            equations,
            ..
        } = self;
        let template: &SpacecraftState = state;
        let t0 = template.time();
        let t1 = t0 + *step_size;

        let x0 = pack(template, equations)?;
        let mut rhs =
            |x: &DVector<f64>, t: f64| derivative(&**dynamics, equations.as_mut_slice(), template, x, t);
        let x1 = integrator.step(&mut rhs, &x0, t0, t1)?;

        if x1.iter().any(|v| !v.is_finite()) {
            return Err(PropagationError::Divergence { time: t1 });
        }

        // Derivatives at the step end are reported with the state.
        let xdot = derivative(&**dynamics, equations.as_mut_slice(), template, &x1, t1)?;
        let mut next = stage_state(template, equations, &x1, t1);
        let mut offset = MAIN_DIM;
        for eq in equations.iter() {
            let n = eq.dimension();
            next.additional_derivatives.insert(
                eq.name().to_string(),
                xdot.as_slice()[offset..offset + n].to_vec(),
            );
            offset += n;
        }
        Ok(next)
    }
}

fn pack(
    state: &SpacecraftState,
    equations: &[Box<dyn AdditionalEquations>],
) -> Result<DVector<f64>, PropagationError> {
    let mut x: Vec<f64> = Vec::with_capacity(
        MAIN_DIM + equations.iter().map(|eq| eq.dimension()).sum::<usize>(),
    );
    x.extend(state.orbit.position.iter());
    x.extend(state.orbit.velocity.iter());
    for eq in equations {
        let values = state
            .additional_state(eq.name())
            .ok_or_else(|| PropagationError::MissingAdditionalState(eq.name().to_string()))?;
        x.extend_from_slice(values);
    }
    Ok(DVector::from_vec(x))
}

/// The spacecraft state seen at an integrator stage.
fn stage_state(
    template: &SpacecraftState,
    equations: &[Box<dyn AdditionalEquations>],
    x: &DVector<f64>,
    t: SimTime,
) -> SpacecraftState {
    let mut stage = template.clone();
    stage.orbit.time = t;
    stage.orbit.position = Vector3::new(x[0], x[1], x[2]);
    stage.orbit.velocity = Vector3::new(x[3], x[4], x[5]);

    let mut offset = MAIN_DIM;
    for eq in equations {
        let n = eq.dimension();
        stage
            .additional
            .insert(eq.name().to_string(), x.as_slice()[offset..offset + n].to_vec());
        offset += n;
    }
    stage
}

fn derivative(
    dynamics: &dyn MainDynamics,
    equations: &mut [Box<dyn AdditionalEquations>],
    template: &SpacecraftState,
    x: &DVector<f64>,
    t: SimTime,
) -> Result<DVector<f64>, PropagationError> {
    let stage = stage_state(template, equations, x, t);
    let position = stage.orbit.position;
    let velocity = stage.orbit.velocity;

    let mut xdot = DVector::zeros(x.len());
    xdot.fixed_rows_mut::<3>(0).copy_from(&velocity);
    xdot.fixed_rows_mut::<3>(3)
        .copy_from(&dynamics.acceleration(t, &position, &velocity));

    let mut offset = MAIN_DIM;
    for eq in equations.iter_mut() {
        let n = eq.dimension();
        eq.compute_derivatives(
            &stage,
            &x.as_slice()[offset..offset + n],
            &mut xdot.as_mut_slice()[offset..offset + n],
        )?;
        offset += n;
    }
    Ok(xdot)
}
