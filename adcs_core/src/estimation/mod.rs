// adcs_core/src/estimation/mod.rs

//! Rate estimation for the B-dot controller.

pub mod bdot;
pub mod low_pass;

pub use bdot::BdotEstimator;
pub use low_pass::LowPassFilter;
