// adcs_core/src/propagation/integrators.rs

use std::fmt::Debug;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::errors::PropagationError;

/// State derivative `f(x, t)`. Fallible so a failing equation aborts the step.
pub type DerivativeFn<'a> =
    dyn FnMut(&DVector<f64>, f64) -> Result<DVector<f64>, PropagationError> + 'a;

pub trait Integrator: Debug + Send {
    /// Advances `x0` from `t0` to `tf` in a single step.
    fn step(
        &self,
        func: &mut DerivativeFn<'_>,
        x0: &DVector<f64>,
        t0: f64,
        tf: f64,
    ) -> Result<DVector<f64>, PropagationError>;
}

// Runge-Kutta methods
#[derive(Debug, Default, Clone, Copy)]
pub struct Euler;

impl Integrator for Euler {
    fn step(
        &self,
        func: &mut DerivativeFn<'_>,
        x0: &DVector<f64>,
        t0: f64,
        tf: f64,
    ) -> Result<DVector<f64>, PropagationError> {
        let dt = tf - t0;
        Ok(x0 + func(x0, t0)? * dt)
    }
}

/// Classical fourth-order Runge-Kutta.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rk4;

impl Integrator for Rk4 {
    fn step(
        &self,
        func: &mut DerivativeFn<'_>,
        x0: &DVector<f64>,
        t0: f64,
        tf: f64,
    ) -> Result<DVector<f64>, PropagationError> {
        let dt = tf - t0;
        let half = 0.5 * dt;

        let k1 = func(x0, t0)?;
        let k2 = func(&(x0 + &k1 * half), t0 + half)?;
        let k3 = func(&(x0 + &k2 * half), t0 + half)?;
        let k4 = func(&(x0 + &k3 * dt), tf)?;

        Ok(x0 + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }
}

/// Integrator choice as it appears in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegratorKind {
    #[default]
    Rk4,
    Euler,
}

impl IntegratorKind {
    pub fn build(self) -> Box<dyn Integrator> {
        match self {
            Self::Rk4 => Box::new(Rk4),
            Self::Euler => Box::new(Euler),
        }
    }
}
