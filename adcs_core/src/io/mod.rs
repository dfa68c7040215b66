// adcs_core/src/io/mod.rs

//! Key-value command channel shared with external flight software.

pub mod channel;
pub mod codec;
pub mod memcached;

pub use channel::{CommandChannel, InMemoryChannel};
pub use memcached::MemcachedChannel;

use nalgebra::Vector3;

use crate::errors::ChannelError;

/// Key prefix under which the torque command is published.
pub const DEFAULT_TORQUE_KEY_PREFIX: &str = "Simulation_Torque_";

/// Key prefix of the noisy magnetometer reading fed back to the flight software.
pub const MAGNETOMETER_KEY_PREFIX: &str = "Simulation_Magnetometer_";

/// Key prefix of the noisy gyro reading fed back to the flight software.
pub const GYROMETER_KEY_PREFIX: &str = "Simulation_Gyrometer_";

/// The three per-axis keys for `prefix`, in X, Y, Z order.
pub fn axis_keys(prefix: &str) -> [String; 3] {
    [format!("{prefix}X"), format!("{prefix}Y"), format!("{prefix}Z")]
}

/// Writes a vector under the three per-axis keys of `prefix`.
pub fn publish_vector(
    channel: &mut dyn CommandChannel,
    prefix: &str,
    value: &Vector3<f64>,
) -> Result<(), ChannelError> {
    for (key, component) in axis_keys(prefix).iter().zip(value.iter()) {
        channel.store(key, &codec::encode_f64(*component))?;
    }
    Ok(())
}
