// adcs_core/src/models/inertia.rs

use nalgebra::{Matrix3, Vector3};

use crate::errors::InertiaError;

/// Principal moments of the 1U CubeSat the simulator was built around, kg·m².
pub const CUBESAT_1U_INERTIA: [f64; 3] = [1.9002e-3, 1.9156e-3, 1.9496e-3];

/// Moment-of-inertia tensor in the body frame.
///
/// Only the diagonal (principal moments) enters the dynamics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertiaModel {
    tensor: Matrix3<f64>,
}

impl InertiaModel {
    /// Builds a diagonal tensor. Every principal moment must be positive.
    pub fn new_diagonal(moments: Vector3<f64>) -> Result<Self, InertiaError> {
        Self::validate(&moments)?;
        Ok(Self {
            tensor: Matrix3::from_diagonal(&moments),
        })
    }

    /// Wraps a full tensor. Off-diagonal terms are kept but unused.
    pub fn from_matrix(tensor: Matrix3<f64>) -> Result<Self, InertiaError> {
        Self::validate(&tensor.diagonal())?;
        Ok(Self { tensor })
    }

    fn validate(moments: &Vector3<f64>) -> Result<(), InertiaError> {
        for (axis, value) in moments.iter().enumerate() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(InertiaError::NonPositiveMoment {
                    axis: axis + 1,
                    value: *value,
                });
            }
        }
        Ok(())
    }

    pub fn tensor(&self) -> &Matrix3<f64> {
        &self.tensor
    }

    /// (I1, I2, I3).
    pub fn diagonal(&self) -> Vector3<f64> {
        self.tensor.diagonal()
    }
}

impl Default for InertiaModel {
    fn default() -> Self {
        Self {
            tensor: Matrix3::from_diagonal(&Vector3::from(CUBESAT_1U_INERTIA)),
        }
    }
}
