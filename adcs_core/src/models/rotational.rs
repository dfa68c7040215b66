// adcs_core/src/models/rotational.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::inertia::InertiaModel;
use crate::errors::PropagationError;
use crate::propagation::AdditionalEquations;
use crate::state::layout::{SecondaryStateLayout, SECONDARY_STATES_KEY, SPIN, THETA};
use crate::state::SpacecraftState;
use crate::torque::TorqueSource;

/// Which principal moment divides each row of Euler's equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InertiaDivisor {
    /// Every axis is divided by I1. Matches the flight-software reference
    /// model, and is exact for the spherical bodies used in validation.
    #[default]
    FirstAxis,
    /// Axis k is divided by Ik (textbook form).
    PerAxis,
}

/// Euler's rigid-body equations for a diagonal inertia tensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationalAccelerationModel {
    pub inertia: InertiaModel,
    pub divisor: InertiaDivisor,
}

impl RotationalAccelerationModel {
    pub fn new(inertia: InertiaModel, divisor: InertiaDivisor) -> Self {
        Self { inertia, divisor }
    }

    /// Angular acceleration (body frame, rad/s²) for an applied torque and
    /// current spin. Non-finite inputs propagate to the output.
    pub fn acceleration(&self, torque: &Vector3<f64>, spin: &Vector3<f64>) -> Vector3<f64> {
        let i = self.inertia.diagonal();
        let (i1, i2, i3) = (i.x, i.y, i.z);
        let (w1, w2, w3) = (spin.x, spin.y, spin.z);

        let divisors = match self.divisor {
            InertiaDivisor::FirstAxis => Vector3::new(i1, i1, i1),
            InertiaDivisor::PerAxis => Vector3::new(i1, i2, i3),
        };

        // Gyroscopic coupling subtracted from the applied torque.
        let net = Vector3::new(
            torque.x - (i3 - i2) * w2 * w3,
            torque.y - (i1 - i3) * w3 * w1,
            torque.z - (i2 - i1) * w1 * w2,
        );
        net.component_div(&divisors)
    }
}

/// The secondary ODE integrated by the engine next to the orbit:
/// `Spin' = α(torque(t), Spin)` and `Theta' = Spin`.
#[derive(Debug)]
pub struct AttitudeEquations {
    model: RotationalAccelerationModel,
    torque: Box<dyn TorqueSource>,
    layout: SecondaryStateLayout,
}

impl AttitudeEquations {
    pub fn new(model: RotationalAccelerationModel, torque: Box<dyn TorqueSource>) -> Self {
        Self {
            model,
            torque,
            layout: SecondaryStateLayout::standard(),
        }
    }

    pub fn layout(&self) -> &SecondaryStateLayout {
        &self.layout
    }

    pub fn model(&self) -> &RotationalAccelerationModel {
        &self.model
    }
}

impl AdditionalEquations for AttitudeEquations {
    fn name(&self) -> &str {
        SECONDARY_STATES_KEY
    }

    fn dimension(&self) -> usize {
        self.layout.total_size()
    }

    fn compute_derivatives(
        &mut self,
        state: &SpacecraftState,
        secondary: &[f64],
        out: &mut [f64],
    ) -> Result<(), PropagationError> {
        let expected = self.layout.total_size();
        for found in [secondary.len(), out.len()] {
            if found != expected {
                return Err(PropagationError::DimensionMismatch {
                    name: SECONDARY_STATES_KEY.to_string(),
                    expected,
                    found,
                });
            }
        }

        let spin = self.layout.extract_vector3(secondary, SPIN)?;
        let sample = self.torque.torque_at(state.time());
        let acceleration = self.model.acceleration(&sample.torque, &spin);
        trace!(
            time = state.time(),
            torque = ?sample.torque,
            valid = sample.valid,
            "Evaluated attitude derivatives"
        );

        out.fill(0.0);
        self.layout.write(out, SPIN, acceleration.as_slice())?;
        self.layout.write(out, THETA, spin.as_slice())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torque::TorqueSample;
    use crate::types::{Attitude, OrbitState, ReferenceFrame};
    use approx::assert_relative_eq;

    fn cubesat(divisor: InertiaDivisor) -> RotationalAccelerationModel {
        RotationalAccelerationModel::new(InertiaModel::default(), divisor)
    }

    #[test]
    fn zero_spin_reduces_to_torque_over_first_moment() {
        let model = cubesat(InertiaDivisor::FirstAxis);
        let torque = Vector3::new(1e-4, -2e-4, 3e-4);
        let i1 = model.inertia.diagonal().x;

        let alpha = model.acceleration(&torque, &Vector3::zeros());

        assert_eq!(alpha, Vector3::new(torque.x / i1, torque.y / i1, torque.z / i1));
    }

    #[test]
    fn per_axis_divides_by_own_moment() {
        let model = cubesat(InertiaDivisor::PerAxis);
        let torque = Vector3::new(1e-4, 1e-4, 1e-4);
        let i = model.inertia.diagonal();

        let alpha = model.acceleration(&torque, &Vector3::zeros());

        assert_relative_eq!(alpha, torque.component_div(&i), epsilon = 1e-12);
    }

    #[test]
    fn spin_about_a_principal_axis_is_steady() {
        let model = cubesat(InertiaDivisor::PerAxis);
        let alpha = model.acceleration(&Vector3::zeros(), &Vector3::new(0.0, 0.0, 0.3));
        assert_eq!(alpha, Vector3::zeros());
    }

    #[test]
    fn gyroscopic_term_matches_euler() {
        let model = cubesat(InertiaDivisor::PerAxis);
        let i = model.inertia.diagonal();
        let w = Vector3::new(0.1, 0.2, 0.3);

        let alpha = model.acceleration(&Vector3::zeros(), &w);

        assert_relative_eq!(alpha.x, -(i.z - i.y) * w.y * w.z / i.x, epsilon = 1e-12);
        assert_relative_eq!(alpha.y, -(i.x - i.z) * w.z * w.x / i.y, epsilon = 1e-12);
        assert_relative_eq!(alpha.z, -(i.y - i.x) * w.x * w.y / i.z, epsilon = 1e-12);
    }

    #[test]
    fn nan_torque_propagates() {
        let model = cubesat(InertiaDivisor::FirstAxis);
        let alpha = model.acceleration(&Vector3::new(f64::NAN, 0.0, 0.0), &Vector3::zeros());
        assert!(alpha.x.is_nan());
    }

    #[derive(Debug)]
    struct Constant(Vector3<f64>);

    impl TorqueSource for Constant {
        fn torque_at(&mut self, _sim_time: f64) -> TorqueSample {
            TorqueSample::valid(self.0)
        }
    }

    #[test]
    fn equations_fill_spin_rate_and_theta_rate() {
        let model = cubesat(InertiaDivisor::FirstAxis);
        let i1 = model.inertia.diagonal().x;
        let mut equations =
            AttitudeEquations::new(model, Box::new(Constant(Vector3::new(i1, 0.0, 0.0))));
        let state = SpacecraftState::new(
            OrbitState::new(0.0, Vector3::new(7.0e6, 0.0, 0.0), Vector3::zeros()),
            Attitude::identity(0.0, ReferenceFrame::Eme2000),
            1.0,
        );
        let secondary = [0.0, 0.0, 0.0, 0.5, 0.5, 0.5];
        let mut out = [f64::NAN; 6];

        equations.compute_derivatives(&state, &secondary, &mut out).unwrap();

        assert_relative_eq!(out[0], 1.0, epsilon = 1e-12);
        assert_eq!(&out[1..], &[0.0; 5]);
    }

    #[test]
    fn equations_reject_wrong_dimension() {
        let mut equations = AttitudeEquations::new(
            cubesat(InertiaDivisor::FirstAxis),
            Box::new(Constant(Vector3::zeros())),
        );
        let state = SpacecraftState::new(
            OrbitState::new(0.0, Vector3::zeros(), Vector3::zeros()),
            Attitude::identity(0.0, ReferenceFrame::Eme2000),
            1.0,
        );
        let mut out = [0.0; 6];
        let err = equations
            .compute_derivatives(&state, &[0.0; 4], &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            PropagationError::DimensionMismatch { expected: 6, found: 4, .. }
        ));
    }
}
