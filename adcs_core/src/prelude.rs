// adcs_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::io::CommandChannel;
pub use crate::models::magnetometer::MagneticFieldSensor;
pub use crate::propagation::{AdditionalEquations, FixedStepHandler, Integrator, MainDynamics};
pub use crate::torque::{TorqueSample, TorqueSource};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::state::layout::{SecondaryStateLayout, SECONDARY_STATES_KEY, SPIN, THETA};
pub use crate::state::store::{AttitudeStateStore, SharedStateStore, StepClock};
pub use crate::state::SpacecraftState;
pub use crate::types::{Attitude, OrbitState, ReferenceFrame, SimTime};

// --- Errors ---
pub use crate::errors::{
    AcquisitionError, ChannelError, FilterError, InertiaError, LayoutError, PropagationError,
    StateCompatibilityError,
};

// --- Concrete Implementations (Export common ones for convenience) ---
pub use crate::estimation::{BdotEstimator, LowPassFilter};
pub use crate::io::{InMemoryChannel, MemcachedChannel};
pub use crate::models::actuators::MagnetorquerArray;
pub use crate::models::inertia::InertiaModel;
pub use crate::models::magnetometer::FixedInertialField;
pub use crate::models::rotational::{AttitudeEquations, InertiaDivisor, RotationalAccelerationModel};
pub use crate::propagation::{
    FixedStepPropagator, IntegratorKind, StepSynchronizer, TwoBodyGravity,
};
pub use crate::torque::{
    ControllerTorqueSource, HardwareCommand, HardwareLoopTorqueSource, ScenarioTorqueSource,
    TorqueStep,
};
