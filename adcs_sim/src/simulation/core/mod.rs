// adcs_sim/src/simulation/core/mod.rs

pub mod handlers;
pub mod prng;
pub mod setup;
