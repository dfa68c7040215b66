// adcs_core/src/estimation/bdot.rs

use nalgebra::Vector3;

use super::low_pass::LowPassFilter;
use crate::errors::FilterError;

/// Default smoothing time constant, seconds.
pub const DEFAULT_TIME_CONSTANT: f64 = 5.0;
/// Default spacing between magnetometer samples, seconds.
pub const DEFAULT_SAMPLE_PERIOD: f64 = 0.25;

/// Estimates the time derivative of the body-frame magnetic field from
/// successive magnetometer samples.
#[derive(Debug, Clone)]
pub struct BdotEstimator {
    filter: LowPassFilter<Vector3<f64>>,
    sample_period: f64,
    last_sample: Option<Vector3<f64>>,
}

impl BdotEstimator {
    /// `sample_period` is both the finite-difference spacing and the filter
    /// sample period.
    pub fn new(time_constant: f64, sample_period: f64) -> Result<Self, FilterError> {
        Ok(Self {
            filter: LowPassFilter::new(time_constant, sample_period, Vector3::zeros())?,
            sample_period,
            last_sample: None,
        })
    }

    /// Feeds one field sample and returns the filtered derivative, T/s.
    ///
    /// The first sample only primes the difference and contributes zero.
    pub fn update(&mut self, sample: Vector3<f64>) -> Vector3<f64> {
        let raw = match self.last_sample.replace(sample) {
            Some(previous) => (sample - previous) / self.sample_period,
            None => Vector3::zeros(),
        };
        self.filter.process(raw)
    }

    pub fn estimate(&self) -> Vector3<f64> {
        self.filter.value()
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_update_contributes_zero() {
        let mut estimator = BdotEstimator::new(5.0, 0.25).unwrap();
        let out = estimator.update(Vector3::new(1e-5, 2e-5, 3e-5));
        assert_eq!(out, Vector3::zeros());
    }

    #[test]
    fn steady_ramp_is_tracked() {
        let (tau, dt) = (1.0, 0.1);
        let mut estimator = BdotEstimator::new(tau, dt).unwrap();
        let rate = Vector3::new(1e-6, -2e-6, 0.0);

        let mut field = Vector3::new(2e-5, 0.0, -1e-5);
        for _ in 0..200 {
            estimator.update(field);
            field += rate * dt;
        }

        assert_relative_eq!(estimator.estimate(), rate, epsilon = 1e-12);
    }
}
