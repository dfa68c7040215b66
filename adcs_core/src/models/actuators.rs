// adcs_core/src/models/actuators.rs

use nalgebra::Vector3;

/// Default per-axis dipole saturation, A·m².
pub const DEFAULT_MAX_DIPOLE: f64 = 0.1;

/// Three orthogonal magnetorquers with static per-axis saturation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetorquerArray {
    /// Saturation limit per body axis, A·m². Always non-negative.
    pub max_dipole: Vector3<f64>,
}

impl MagnetorquerArray {
    pub fn new(max_dipole: Vector3<f64>) -> Self {
        Self {
            max_dipole: max_dipole.abs(),
        }
    }

    pub fn uniform(max_dipole: f64) -> Self {
        Self::new(Vector3::repeat(max_dipole))
    }

    /// Clamps each axis to its limit, keeping the sign of the request.
    pub fn saturate(&self, requested: &Vector3<f64>) -> Vector3<f64> {
        requested.zip_map(&self.max_dipole, |m, limit| m.clamp(-limit, limit))
    }

    /// Dipole produced by per-axis duty cycles in [-1, 1].
    pub fn dipole_from_duty(&self, duty: &Vector3<f64>) -> Vector3<f64> {
        self.saturate(&duty.component_mul(&self.max_dipole))
    }

    /// Torque `m × B` for a dipole in a body-frame field (tesla).
    pub fn torque(dipole: &Vector3<f64>, field: &Vector3<f64>) -> Vector3<f64> {
        dipole.cross(field)
    }
}

impl Default for MagnetorquerArray {
    fn default() -> Self {
        Self::uniform(DEFAULT_MAX_DIPOLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn saturation_preserves_sign() {
        let array = MagnetorquerArray::uniform(0.1);
        let clamped = array.saturate(&Vector3::new(5.0, -5.0, 0.05));
        assert_eq!(clamped, Vector3::new(0.1, -0.1, 0.05));
    }

    #[test]
    fn duty_scales_by_limit() {
        let array = MagnetorquerArray::new(Vector3::new(0.2, 0.1, 0.1));
        let dipole = array.dipole_from_duty(&Vector3::new(0.5, -1.0, 2.0));
        assert_eq!(dipole, Vector3::new(0.1, -0.1, 0.1));
    }

    #[test]
    fn torque_is_perpendicular_to_field() {
        let field = Vector3::new(0.0, 2e-5, 0.0);
        let torque = MagnetorquerArray::torque(&Vector3::new(0.1, 0.0, 0.0), &field);
        assert_relative_eq!(torque, Vector3::new(0.0, 0.0, 2e-6), epsilon = 1e-18);
        assert_eq!(torque.dot(&field), 0.0);
    }
}
