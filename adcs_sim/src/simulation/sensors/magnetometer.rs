// adcs_sim/src/simulation/sensors/magnetometer.rs

use adcs_core::prelude::{FixedInertialField, MagneticFieldSensor, SimTime};
use nalgebra::Vector3;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::trace;

use super::noise_distribution;
use crate::simulation::errors::SimError;

/// Magnetometer that adds zero-mean Gaussian noise on every axis to a
/// noise-free field model.
#[derive(Debug)]
pub struct NoisyMagnetometer {
    truth: FixedInertialField,
    noise: Normal<f64>,
    rng: ChaCha8Rng,
}

impl NoisyMagnetometer {
    pub fn new(truth: FixedInertialField, noise_stddev: f64, rng: ChaCha8Rng) -> Result<Self, SimError> {
        let noise = noise_distribution("magnetometer", noise_stddev)?;
        Ok(Self { truth, noise, rng })
    }
}

impl MagneticFieldSensor for NoisyMagnetometer {
    fn measure(&mut self, sim_time: SimTime) -> Vector3<f64> {
        let perfect = self.truth.true_field(sim_time);
        let reading = Vector3::new(
            perfect.x + self.noise.sample(&mut self.rng),
            perfect.y + self.noise.sample(&mut self.rng),
            perfect.z + self.noise.sample(&mut self.rng),
        );
        trace!(time = sim_time, reading = ?reading, "Magnetometer sample");
        reading
    }

    fn true_field(&self, sim_time: SimTime) -> Vector3<f64> {
        self.truth.true_field(sim_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adcs_core::prelude::*;
    use rand::SeedableRng;

    fn truth() -> FixedInertialField {
        let state = SpacecraftState::new(
            OrbitState::new(0.0, Vector3::new(7.0e6, 0.0, 0.0), Vector3::zeros()),
            Attitude::identity(0.0, ReferenceFrame::Eme2000),
            1.0,
        );
        FixedInertialField::new(Vector3::new(0.0, 3.0e-5, 0.0), SharedStateStore::new(state))
    }

    #[test]
    fn zero_noise_reads_the_true_field() {
        let mut mag = NoisyMagnetometer::new(truth(), 0.0, ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(mag.measure(0.0), Vector3::new(0.0, 3.0e-5, 0.0));
    }

    #[test]
    fn noise_is_small_and_seeded() {
        let mut a = NoisyMagnetometer::new(truth(), 1.0e-7, ChaCha8Rng::seed_from_u64(7)).unwrap();
        let mut b = NoisyMagnetometer::new(truth(), 1.0e-7, ChaCha8Rng::seed_from_u64(7)).unwrap();

        let reading = a.measure(0.0);
        assert_eq!(reading, b.measure(0.0));
        assert_ne!(reading, a.true_field(0.0));
        assert!((reading - a.true_field(0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn negative_or_non_finite_stddev_is_rejected() {
        for stddev in [-1.0, -1e-9, f64::NAN, f64::INFINITY] {
            let err = NoisyMagnetometer::new(truth(), stddev, ChaCha8Rng::seed_from_u64(0)).unwrap_err();
            assert!(matches!(err, SimError::InvalidConfig(_)), "accepted {}", stddev);
        }
    }
}
