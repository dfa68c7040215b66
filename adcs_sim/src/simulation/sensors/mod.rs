// adcs_sim/src/simulation/sensors/mod.rs

pub mod gyrometer;
pub mod magnetometer;

pub use gyrometer::NoisyGyrometer;
pub use magnetometer::NoisyMagnetometer;

use rand_distr::Normal;

use crate::simulation::errors::SimError;

/// Zero-mean Gaussian with `stddev`. `Normal::new` lets negative values
/// through, so the range is checked here.
pub(crate) fn noise_distribution(sensor: &str, stddev: f64) -> Result<Normal<f64>, SimError> {
    if !(stddev.is_finite() && stddev >= 0.0) {
        return Err(SimError::InvalidConfig(format!(
            "{sensor} noise_stddev must be finite and non-negative, got {stddev}"
        )));
    }
    Normal::new(0.0, stddev)
        .map_err(|e| SimError::InvalidConfig(format!("{sensor} noise_stddev {stddev}: {e}")))
}
