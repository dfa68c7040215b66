// adcs_core/src/propagation/orbit.rs

use std::fmt::Debug;

use nalgebra::Vector3;

use crate::types::SimTime;

/// Earth gravitational parameter, m³/s².
pub const EARTH_MU: f64 = 3.986004418e14;

/// Force model driving the main (orbital) state.
pub trait MainDynamics: Debug + Send {
    /// Inertial acceleration, m/s².
    fn acceleration(
        &self,
        time: SimTime,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> Vector3<f64>;
}

/// Point-mass central gravity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoBodyGravity {
    pub mu: f64,
}

impl Default for TwoBodyGravity {
    fn default() -> Self {
        Self { mu: EARTH_MU }
    }
}

impl MainDynamics for TwoBodyGravity {
    fn acceleration(
        &self,
        _time: SimTime,
        position: &Vector3<f64>,
        _velocity: &Vector3<f64>,
    ) -> Vector3<f64> {
        let r = position.norm();
        -position * (self.mu / (r * r * r))
    }
}
