// adcs_core/src/torque/controller.rs

use nalgebra::Vector3;
use tracing::{debug, warn};

use super::{AcquisitionSchedule, TorqueSample, TorqueSource};
use crate::estimation::BdotEstimator;
use crate::models::actuators::MagnetorquerArray;
use crate::models::magnetometer::MagneticFieldSensor;
use crate::state::store::StepClock;
use crate::types::{same_instant, SimTime};

/// Per-axis B-dot gain used by the flight software, A·m²·s/T.
pub const DEFAULT_BDOT_GAIN: f64 = -54_000.0;

/// Closed-loop B-dot detumbling.
///
/// Once per step the controller samples the magnetometer, updates the
/// filtered field derivative and commands a saturated dipole
/// `m = sat(K ∘ Ḃ)`. Between updates the dipole is held and every call
/// returns `m × B_true(t)`.
#[derive(Debug)]
pub struct ControllerTorqueSource {
    sensor: Box<dyn MagneticFieldSensor>,
    estimator: BdotEstimator,
    gains: Vector3<f64>,
    actuators: MagnetorquerArray,
    schedule: AcquisitionSchedule,
    dipole: Vector3<f64>,
}

impl ControllerTorqueSource {
    pub fn new(
        sensor: Box<dyn MagneticFieldSensor>,
        estimator: BdotEstimator,
        gains: Vector3<f64>,
        actuators: MagnetorquerArray,
        clock: StepClock,
        step_size: f64,
    ) -> Self {
        if !same_instant(estimator.sample_period(), step_size) {
            warn!(
                sample_period = estimator.sample_period(),
                step_size,
                "B-dot sample period differs from the control update interval"
            );
        }
        Self {
            sensor,
            estimator,
            gains,
            actuators,
            schedule: AcquisitionSchedule::new(clock, step_size),
            dipole: Vector3::zeros(),
        }
    }

    /// Dipole currently held by the magnetorquers, A·m².
    pub fn dipole(&self) -> Vector3<f64> {
        self.dipole
    }

    fn update_dipole(&mut self, sim_time: SimTime) {
        let field = self.sensor.measure(sim_time);
        let bdot = self.estimator.update(field);
        self.dipole = self.actuators.saturate(&bdot.component_mul(&self.gains));
        debug!(
            time = sim_time,
            bdot = ?bdot,
            dipole = ?self.dipole,
            "B-dot control update"
        );
    }
}

impl TorqueSource for ControllerTorqueSource {
    fn torque_at(&mut self, sim_time: SimTime) -> TorqueSample {
        if self.schedule.is_due(sim_time) {
            self.update_dipole(sim_time);
            self.schedule.advance();
        }
        let field = self.sensor.true_field(sim_time);
        TorqueSample::valid(MagnetorquerArray::torque(&self.dipole, &field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::SharedStateStore;
    use crate::torque::test_support::{state_at, store_at};
    use std::collections::VecDeque;

    /// Replays scripted readings; the true field is the last reading.
    #[derive(Debug)]
    struct Scripted {
        readings: VecDeque<Vector3<f64>>,
        last: Vector3<f64>,
    }

    impl Scripted {
        fn new(readings: &[Vector3<f64>]) -> Self {
            Self {
                readings: readings.iter().copied().collect(),
                last: Vector3::zeros(),
            }
        }
    }

    impl MagneticFieldSensor for Scripted {
        fn measure(&mut self, _sim_time: SimTime) -> Vector3<f64> {
            if let Some(next) = self.readings.pop_front() {
                self.last = next;
            }
            self.last
        }

        fn true_field(&self, _sim_time: SimTime) -> Vector3<f64> {
            self.last
        }
    }

    fn controller(readings: &[Vector3<f64>], store: &SharedStateStore) -> ControllerTorqueSource {
        ControllerTorqueSource::new(
            Box::new(Scripted::new(readings)),
            BdotEstimator::new(0.5, 1.0).unwrap(),
            Vector3::repeat(DEFAULT_BDOT_GAIN),
            MagnetorquerArray::uniform(0.1),
            store.clock(),
            1.0,
        )
    }

    #[test]
    fn first_update_commands_no_dipole() {
        let store = store_at(0.0);
        let mut source = controller(&[Vector3::new(2e-5, 0.0, 0.0)], &store);

        let sample = source.torque_at(0.0);

        assert!(sample.valid);
        assert_eq!(sample.torque, Vector3::zeros());
        assert_eq!(source.dipole(), Vector3::zeros());
    }

    #[test]
    fn dipole_opposes_field_rate_and_saturates() {
        let store = store_at(0.0);
        let mut source = controller(
            &[Vector3::new(0.0, 2e-5, 0.0), Vector3::new(1e-5, 2e-5, -1e-5)],
            &store,
        );

        source.torque_at(0.0);
        store.set(state_at(1.0)).unwrap();
        source.torque_at(1.0);

        // Ḃ has +x and −z components, the gain is negative and large.
        assert_eq!(source.dipole(), Vector3::new(-0.1, 0.0, 0.1));
    }

    #[test]
    fn interior_evaluations_do_not_advance_the_filter() {
        let store = store_at(0.0);
        let mut source = controller(
            &[Vector3::new(0.0, 2e-5, 0.0), Vector3::new(1e-5, 2e-5, 0.0)],
            &store,
        );

        source.torque_at(0.0);
        source.torque_at(0.5);
        source.torque_at(0.5);
        source.torque_at(1.0);
        // Still the first step: the second reading has not been consumed.
        assert_eq!(source.dipole(), Vector3::zeros());

        store.set(state_at(1.0)).unwrap();
        source.torque_at(1.0);
        assert!(source.dipole().x < 0.0);
    }

    #[test]
    fn torque_is_held_dipole_crossed_with_true_field() {
        let store = store_at(0.0);
        let mut source = controller(
            &[Vector3::new(0.0, 2e-5, 0.0), Vector3::new(1e-5, 2e-5, 0.0)],
            &store,
        );
        source.torque_at(0.0);
        store.set(state_at(1.0)).unwrap();

        let sample = source.torque_at(1.0);

        let expected = source.dipole().cross(&Vector3::new(1e-5, 2e-5, 0.0));
        assert_eq!(sample.torque, expected);
    }
}
