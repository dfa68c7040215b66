// adcs_core/src/estimation/low_pass.rs

use std::ops::{Add, Mul};

use crate::errors::FilterError;

/// First-order exponential smoother:
/// `output = α·previous + (1 − α)·input`, with `α = exp(−Δt/τ)`.
///
/// Works for any signal that can be scaled and summed, so the same filter
/// serves scalars and `Vector3` readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter<T> {
    time_constant: f64,
    sample_period: f64,
    alpha: f64,
    state: T,
}

impl<T> LowPassFilter<T>
where
    T: Copy + Add<Output = T> + Mul<f64, Output = T>,
{
    /// `initial` is the value the first sample is blended with.
    pub fn new(time_constant: f64, sample_period: f64, initial: T) -> Result<Self, FilterError> {
        if !(time_constant.is_finite() && time_constant > 0.0) {
            return Err(FilterError::InvalidTimeConstant(time_constant));
        }
        if !(sample_period.is_finite() && sample_period > 0.0) {
            return Err(FilterError::InvalidSamplePeriod(sample_period));
        }
        Ok(Self {
            time_constant,
            sample_period,
            alpha: (-sample_period / time_constant).exp(),
            state: initial,
        })
    }

    /// Blends one sample into the state and returns the new output.
    pub fn process(&mut self, sample: T) -> T {
        self.state = self.state * self.alpha + sample * (1.0 - self.alpha);
        self.state
    }

    pub fn value(&self) -> T {
        self.state
    }

    pub fn reset(&mut self, value: T) {
        self.state = value;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }
}
