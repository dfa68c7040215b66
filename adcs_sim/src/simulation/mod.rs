// adcs_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod errors;
pub mod report;
pub mod runner;
pub mod sensors;
