// adcs_core/src/models/magnetometer.rs

use std::fmt::Debug;

use nalgebra::Vector3;

use crate::state::store::SharedStateStore;
use crate::types::SimTime;

/// Source of body-frame magnetic field readings, tesla.
pub trait MagneticFieldSensor: Debug + Send {
    /// A sensor reading, possibly noisy.
    fn measure(&mut self, sim_time: SimTime) -> Vector3<f64>;

    /// The noise-free field, used to turn a dipole into a torque.
    fn true_field(&self, sim_time: SimTime) -> Vector3<f64>;
}

/// Constant inertial field rotated into the body frame using the last
/// committed attitude. Readings are noise-free.
#[derive(Debug, Clone)]
pub struct FixedInertialField {
    inertial_field: Vector3<f64>,
    store: SharedStateStore,
}

impl FixedInertialField {
    pub fn new(inertial_field: Vector3<f64>, store: SharedStateStore) -> Self {
        Self {
            inertial_field,
            store,
        }
    }

    pub fn inertial_field(&self) -> &Vector3<f64> {
        &self.inertial_field
    }
}

impl MagneticFieldSensor for FixedInertialField {
    fn measure(&mut self, sim_time: SimTime) -> Vector3<f64> {
        self.true_field(sim_time)
    }

    fn true_field(&self, _sim_time: SimTime) -> Vector3<f64> {
        self.store.get().attitude.to_body(&self.inertial_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SpacecraftState;
    use crate::types::{Attitude, OrbitState, ReferenceFrame};
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn field_is_expressed_in_the_body_frame() {
        let mut attitude = Attitude::identity(0.0, ReferenceFrame::Eme2000);
        // Body x axis points along inertial y.
        attitude.rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let state = SpacecraftState::new(
            OrbitState::new(0.0, Vector3::zeros(), Vector3::zeros()),
            attitude,
            1.0,
        );
        let mut sensor = FixedInertialField::new(Vector3::new(0.0, 3e-5, 0.0), SharedStateStore::new(state));

        let body = sensor.measure(0.0);

        assert_relative_eq!(body, Vector3::new(3e-5, 0.0, 0.0), epsilon = 1e-15);
    }
}
