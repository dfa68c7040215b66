// adcs_sim/src/simulation/sensors/gyrometer.rs

use adcs_core::prelude::SharedStateStore;
use nalgebra::Vector3;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::trace;

use super::noise_distribution;
use crate::simulation::errors::SimError;

/// Rate gyro reading the committed body spin with per-axis Gaussian noise.
#[derive(Debug)]
pub struct NoisyGyrometer {
    store: SharedStateStore,
    noise: Normal<f64>,
    rng: ChaCha8Rng,
}

impl NoisyGyrometer {
    pub fn new(store: SharedStateStore, noise_stddev: f64, rng: ChaCha8Rng) -> Result<Self, SimError> {
        let noise = noise_distribution("gyrometer", noise_stddev)?;
        Ok(Self { store, noise, rng })
    }

    /// Spin of the last committed step plus noise, rad/s.
    pub fn measure(&mut self) -> Vector3<f64> {
        let committed = self.store.get();
        let spin = committed.attitude.spin;
        let reading = spin.map(|w| w + self.noise.sample(&mut self.rng));
        trace!(time = committed.time(), reading = ?reading, "Gyrometer sample");
        reading
    }
}
