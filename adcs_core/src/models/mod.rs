// adcs_core/src/models/mod.rs

pub mod actuators;
pub mod inertia;
pub mod magnetometer;
pub mod rotational;
