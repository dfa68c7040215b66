// adcs_core/src/types.rs

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
/// Simulation time in seconds since the simulation epoch.
pub type SimTime = f64;

/// Two timestamps closer than this are considered the same instant.
pub const TIME_EPSILON: f64 = 1e-9;

pub fn same_instant(a: SimTime, b: SimTime) -> bool {
    (a - b).abs() <= TIME_EPSILON
}

// --- Core Identifier ---
/// The frame in which orbital and attitude quantities are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// Earth-centred inertial (EME2000 / J2000).
    #[default]
    Eme2000,
    /// Geocentric celestial reference frame.
    Gcrf,
}

/// Orientation and rotational motion of the rigid body at an instant.
///
/// `rotation` maps body-frame vectors into `frame`. Spin and angular
/// acceleration are expressed in the body frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Attitude {
    pub time: SimTime,
    pub frame: ReferenceFrame,
    pub rotation: UnitQuaternion<f64>,
    pub spin: Vector3<f64>,
    pub acceleration: Vector3<f64>,
}

impl Attitude {
    /// Builds an attitude from a raw quaternion, normalizing it.
    pub fn new(
        time: SimTime,
        frame: ReferenceFrame,
        quaternion: Quaternion<f64>,
        spin: Vector3<f64>,
        acceleration: Vector3<f64>,
    ) -> Self {
        Self {
            time,
            frame,
            rotation: UnitQuaternion::new_normalize(quaternion),
            spin,
            acceleration,
        }
    }

    /// Identity orientation at rest.
    pub fn identity(time: SimTime, frame: ReferenceFrame) -> Self {
        Self {
            time,
            frame,
            rotation: UnitQuaternion::identity(),
            spin: Vector3::zeros(),
            acceleration: Vector3::zeros(),
        }
    }

    /// Rotation vector (axis scaled by angle) of the current orientation.
    pub fn rotation_vector(&self) -> Vector3<f64> {
        self.rotation.scaled_axis()
    }

    /// Expresses a reference-frame vector in the body frame.
    pub fn to_body(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.inverse_transform_vector(v)
    }
}

/// Cartesian orbital state owned by the propagation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitState {
    pub time: SimTime,
    pub frame: ReferenceFrame,
    /// Position in metres.
    pub position: Vector3<f64>,
    /// Velocity in metres per second.
    pub velocity: Vector3<f64>,
}

impl OrbitState {
    pub fn new(time: SimTime, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            time,
            frame: ReferenceFrame::default(),
            position,
            velocity,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|v| v.is_finite())
    }
}
