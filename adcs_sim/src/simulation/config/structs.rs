// adcs_sim/src/simulation/config/structs.rs

use adcs_core::io::DEFAULT_TORQUE_KEY_PREFIX;
use adcs_core::models::actuators::DEFAULT_MAX_DIPOLE;
use adcs_core::models::inertia::CUBESAT_1U_INERTIA;
use adcs_core::prelude::{InertiaDivisor, IntegratorKind, ReferenceFrame};
use adcs_core::propagation::orbit::EARTH_MU;
use adcs_core::torque::controller::DEFAULT_BDOT_GAIN;
use adcs_core::torque::scenario::DEFAULT_MAX_INTENSITY;
use nalgebra::Vector3;
use serde::Deserialize;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// Everything needed to build and run one simulation. This struct is the
/// root of the data parsed from a `scenario.toml` file; every section is
/// optional and falls back to the 1U CubeSat defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationSection,

    #[serde(default)]
    pub spacecraft: SpacecraftConfig,

    #[serde(default)]
    pub orbit: OrbitConfig,

    #[serde(default)]
    pub magnetometer: MagnetometerConfig,

    /// Only read when a hardware loop publishes sensor readings.
    #[serde(default)]
    pub gyrometer: GyrometerConfig,

    // The TOML has `[torque]` with a `kind = "..."` discriminator.
    #[serde(default)]
    pub torque: TorqueConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationSection {
    /// Simulated seconds to propagate.
    pub duration_seconds: f64,
    /// Fixed integration step, also the torque acquisition interval.
    pub step_size: f64,
    pub integrator: IntegratorKind,
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Pace the run so one simulated second takes one wall-clock second.
    pub realtime: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            duration_seconds: 100.0,
            step_size: 1.0,
            integrator: IntegratorKind::Rk4,
            seed: None,
            realtime: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SpacecraftConfig {
    /// kg
    pub mass: f64,
    /// Principal moments of inertia, kg·m².
    pub inertia: [f64; 3],
    pub euler_divisor: InertiaDivisor,
    pub frame: ReferenceFrame,
    /// Initial orientation as `[w, x, y, z]`; normalized on load.
    pub quaternion: [f64; 4],
    /// Initial body spin, rad/s.
    pub spin: [f64; 3],
    /// Initial body angular acceleration, rad/s².
    pub acceleration: [f64; 3],
}

impl Default for SpacecraftConfig {
    fn default() -> Self {
        Self {
            mass: 1.04,
            inertia: CUBESAT_1U_INERTIA,
            euler_divisor: InertiaDivisor::FirstAxis,
            frame: ReferenceFrame::Eme2000,
            quaternion: [1.0, 0.0, 0.0, 0.0],
            spin: [0.0; 3],
            acceleration: [0.0; 3],
        }
    }
}

/// Initial orbit in the spacecraft frame, SI units.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct OrbitConfig {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    /// Gravitational parameter, m³/s².
    pub mu: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        // Circular orbit at 7000 km.
        let radius = 7.0e6;
        Self {
            position: [radius, 0.0, 0.0],
            velocity: [0.0, (EARTH_MU / radius).sqrt(), 0.0],
            mu: EARTH_MU,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MagnetometerConfig {
    /// Field in the inertial frame, tesla.
    pub inertial_field: [f64; 3],
    /// Standard deviation of the per-axis white noise, tesla.
    pub noise_stddev: f64,
}

impl Default for MagnetometerConfig {
    fn default() -> Self {
        Self {
            inertial_field: [0.0, 3.0e-5, 0.0],
            noise_stddev: 1.0e-7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GyrometerConfig {
    /// Standard deviation of the per-axis white noise, rad/s.
    pub noise_stddev: f64,
}

/// Same variance as a uniform error of +/-1e-3 rad/s.
pub const DEFAULT_GYRO_NOISE_STDDEV: f64 = 5.773_502_691_896_258e-4;

impl Default for GyrometerConfig {
    fn default() -> Self {
        Self {
            noise_stddev: DEFAULT_GYRO_NOISE_STDDEV,
        }
    }
}

// =========================================================================
// == Torque Providers ==
// =========================================================================

/// Which torque provider drives the attitude equations. Chosen once when
/// the simulation is built.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum TorqueConfig {
    Scenario {
        #[serde(default = "default_max_intensity")]
        max_intensity: f64,
        #[serde(default)]
        steps: Vec<TorqueStepConfig>,
    },
    Controller {
        #[serde(default = "default_gains")]
        gains: [f64; 3],
        #[serde(default = "default_max_dipole")]
        max_dipole: [f64; 3],
        #[serde(default = "default_filter_time_constant")]
        filter_time_constant: f64,
        /// Finite-difference period of the B-dot estimate. Defaults to the
        /// simulation step.
        #[serde(default)]
        sample_period: Option<f64>,
    },
    HardwareLoop {
        channel: ChannelConfig,
        #[serde(default = "default_key_prefix")]
        key_prefix: String,
        #[serde(default)]
        command: CommandKind,
        #[serde(default = "default_max_dipole")]
        max_dipole: [f64; 3],
    },
}

impl Default for TorqueConfig {
    fn default() -> Self {
        TorqueConfig::Scenario {
            max_intensity: default_max_intensity(),
            steps: Vec::new(),
        }
    }
}

impl TorqueConfig {
    pub fn get_kind_str(&self) -> &str {
        match self {
            TorqueConfig::Scenario { .. } => "Scenario",
            TorqueConfig::Controller { .. } => "Controller",
            TorqueConfig::HardwareLoop { .. } => "HardwareLoop",
        }
    }
}

/// One window of the scripted profile, relative to the simulation start.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TorqueStepConfig {
    pub start: f64,
    pub duration: f64,
    /// Scaled by `max_intensity`.
    pub direction: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "PascalCase")]
pub enum ChannelConfig {
    /// In-process map, pre-loaded with a torque command.
    Memory {
        #[serde(default)]
        preset: [f64; 3],
    },
    Memcached {
        /// `host:port`
        address: String,
        #[serde(default = "default_timeout_ms")]
        timeout_ms: u64,
    },
}

/// Meaning of the three values read from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CommandKind {
    #[default]
    Torque,
    DutyCycle,
}

fn default_max_intensity() -> f64 {
    DEFAULT_MAX_INTENSITY
}

fn default_gains() -> [f64; 3] {
    [DEFAULT_BDOT_GAIN; 3]
}

fn default_max_dipole() -> [f64; 3] {
    [DEFAULT_MAX_DIPOLE; 3]
}

fn default_filter_time_constant() -> f64 {
    adcs_core::estimation::bdot::DEFAULT_TIME_CONSTANT
}

fn default_key_prefix() -> String {
    DEFAULT_TORQUE_KEY_PREFIX.to_string()
}

fn default_timeout_ms() -> u64 {
    500
}

/// `[x, y, z]` from a config array.
pub fn vec3(values: [f64; 3]) -> Vector3<f64> {
    Vector3::from(values)
}
