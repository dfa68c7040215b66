// adcs_core/src/state/mod.rs

pub mod layout;
pub mod store;

use std::collections::BTreeMap;

use nalgebra::Vector3;

use crate::errors::{LayoutError, StateCompatibilityError};
use crate::types::{Attitude, OrbitState, SimTime};
use layout::{SecondaryStateLayout, SECONDARY_STATES_KEY, SPIN, THETA};

/// Full spacecraft state at one instant: engine-owned orbit, attitude, mass
/// and the named auxiliary vectors integrated alongside the orbit.
///
/// Treated as an immutable value. Updates build a new state.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacecraftState {
    pub orbit: OrbitState,
    pub attitude: Attitude,
    /// Mass in kilograms.
    pub mass: f64,
    pub additional: BTreeMap<String, Vec<f64>>,
    /// Time derivatives of `additional`, as last evaluated by the engine.
    pub additional_derivatives: BTreeMap<String, Vec<f64>>,
}

impl SpacecraftState {
    pub fn new(orbit: OrbitState, attitude: Attitude, mass: f64) -> Self {
        Self {
            orbit,
            attitude,
            mass,
            additional: BTreeMap::new(),
            additional_derivatives: BTreeMap::new(),
        }
    }

    /// Builds the initial state with the packed secondary vector seeded from
    /// the attitude: Spin from the attitude spin, Theta from its rotation vector.
    pub fn with_secondary_states(
        orbit: OrbitState,
        attitude: Attitude,
        mass: f64,
        layout: &SecondaryStateLayout,
    ) -> Result<Self, LayoutError> {
        let spin = attitude.spin;
        let theta = attitude.rotation_vector();
        let packed = layout.pack(&[(SPIN, spin.as_slice()), (THETA, theta.as_slice())])?;
        Ok(Self::new(orbit, attitude, mass).add_additional_state(SECONDARY_STATES_KEY, packed))
    }

    pub fn time(&self) -> SimTime {
        self.orbit.time
    }

    /// Returns a copy of this state carrying one more auxiliary vector.
    pub fn add_additional_state(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.additional.insert(name.into(), values);
        self
    }

    pub fn additional_state(&self, name: &str) -> Option<&[f64]> {
        self.additional.get(name).map(Vec::as_slice)
    }

    pub fn additional_derivative(&self, name: &str) -> Option<&[f64]> {
        self.additional_derivatives.get(name).map(Vec::as_slice)
    }

    /// Reads a three-component field of the packed secondary vector.
    pub fn secondary_vector(
        &self,
        layout: &SecondaryStateLayout,
        field: &str,
    ) -> Result<Vector3<f64>, LayoutError> {
        let packed = self
            .additional_state(SECONDARY_STATES_KEY)
            .ok_or_else(|| LayoutError::OutOfRange {
                field: SECONDARY_STATES_KEY.to_string(),
            })?;
        layout.extract_vector3(packed, field)
    }

    /// Checks that `other` carries the same auxiliary vector names and sizes.
    pub fn ensure_compatible_additional_states(
        &self,
        other: &SpacecraftState,
    ) -> Result<(), StateCompatibilityError> {
        for (name, values) in &self.additional {
            match other.additional.get(name) {
                None => {
                    return Err(StateCompatibilityError::MissingField { name: name.clone() })
                }
                Some(found) if found.len() != values.len() => {
                    return Err(StateCompatibilityError::SizeMismatch {
                        name: name.clone(),
                        expected: values.len(),
                        found: found.len(),
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(name) = other
            .additional
            .keys()
            .find(|name| !self.additional.contains_key(*name))
        {
            return Err(StateCompatibilityError::UnexpectedField { name: name.clone() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReferenceFrame;
    use approx::assert_abs_diff_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    fn attitude_with(rotation: UnitQuaternion<f64>, spin: Vector3<f64>) -> Attitude {
        Attitude {
            time: 0.0,
            frame: ReferenceFrame::Eme2000,
            rotation,
            spin,
            acceleration: Vector3::zeros(),
        }
    }

    #[test]
    fn secondary_states_are_seeded_from_the_attitude() {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5);
        let spin = Vector3::new(0.01, -0.02, 0.03);
        let orbit = OrbitState::new(0.0, Vector3::new(7.0e6, 0.0, 0.0), Vector3::zeros());
        let layout = SecondaryStateLayout::standard();

        let state =
            SpacecraftState::with_secondary_states(orbit, attitude_with(rotation, spin), 1.04, &layout)
                .unwrap();

        assert_eq!(state.secondary_vector(&layout, SPIN).unwrap(), spin);
        let theta = state.secondary_vector(&layout, THETA).unwrap();
        assert_abs_diff_eq!(theta.z, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(theta.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn compatibility_reports_each_kind_of_mismatch() {
        let orbit = OrbitState::new(0.0, Vector3::zeros(), Vector3::zeros());
        let base = SpacecraftState::new(
            orbit,
            attitude_with(UnitQuaternion::identity(), Vector3::zeros()),
            1.0,
        )
        .add_additional_state("SecondaryStates", vec![0.0; 6]);

        assert!(base.ensure_compatible_additional_states(&base.clone()).is_ok());

        let shorter = base.clone().add_additional_state("SecondaryStates", vec![0.0; 3]);
        assert_eq!(
            base.ensure_compatible_additional_states(&shorter),
            Err(StateCompatibilityError::SizeMismatch {
                name: "SecondaryStates".into(),
                expected: 6,
                found: 3
            })
        );

        let extra = base.clone().add_additional_state("RotAcc", vec![0.0; 3]);
        assert!(matches!(
            base.ensure_compatible_additional_states(&extra),
            Err(StateCompatibilityError::UnexpectedField { .. })
        ));

        let mut missing = base.clone();
        missing.additional.clear();
        assert!(matches!(
            base.ensure_compatible_additional_states(&missing),
            Err(StateCompatibilityError::MissingField { .. })
        ));
    }
}
