// adcs_sim/src/simulation/runner.rs

use std::sync::Arc;

use adcs_core::prelude::*;
use tracing::{error, info};

use crate::simulation::config::ScenarioConfig;
use crate::simulation::config::structs::vec3;
use crate::simulation::core::handlers::{ProgressLogger, RealtimePacer, SensorPublisher};
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::setup;
use crate::simulation::errors::SimError;
use crate::simulation::sensors::{NoisyGyrometer, NoisyMagnetometer};

/// How many progress lines a run logs at `info` level.
const PROGRESS_LINES: f64 = 10.0;

/// What a run ended with. A failed run still carries the last state the
/// synchronizer committed.
#[derive(Debug)]
pub struct RunOutcome {
    pub last_committed: Arc<SpacecraftState>,
    pub target: SimTime,
    pub failure: Option<PropagationError>,
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// A fully wired simulation: state store, engine, attitude equations with
/// their torque provider, and the step handlers.
pub struct Simulation {
    store: SharedStateStore,
    engine: FixedStepPropagator,
    duration: SimTime,
    loopback: Option<InMemoryChannel>,
}

impl Simulation {
    pub fn build(config: &ScenarioConfig) -> Result<Self, SimError> {
        let mut rng = SimulationRng::new(config.simulation.seed);
        let initial = setup::initial_state(config)?;
        let store = SharedStateStore::new(initial.clone());

        let model = setup::rotational_model(config)?;
        let torque = setup::torque_source(config, &store, &mut rng)?;

        let mut engine = FixedStepPropagator::new(
            initial,
            config.simulation.step_size,
            config.simulation.integrator.build(),
            Box::new(TwoBodyGravity {
                mu: config.orbit.mu,
            }),
        )?;
        engine.add_additional_equations(Box::new(AttitudeEquations::new(model, torque.source)))?;

        // The synchronizer commits first so later handlers see the new step.
        engine.add_step_handler(Box::new(StepSynchronizer::new(store.clone())));
        if let Some(link) = torque.sensor_link {
            let field = FixedInertialField::new(vec3(config.magnetometer.inertial_field), store.clone());
            let magnetometer = NoisyMagnetometer::new(field, config.magnetometer.noise_stddev, rng.fork())?;
            let gyrometer = NoisyGyrometer::new(store.clone(), config.gyrometer.noise_stddev, rng.fork())?;
            info!("Publishing sensor readings to the flight software");
            engine.add_step_handler(Box::new(SensorPublisher::new(
                store.clone(),
                Box::new(magnetometer),
                gyrometer,
                link,
            )));
        }
        let duration = config.simulation.duration_seconds;
        engine.add_step_handler(Box::new(ProgressLogger::new(
            store.clone(),
            (duration / PROGRESS_LINES).max(config.simulation.step_size),
        )));
        if config.simulation.realtime {
            info!("Real-time pacing enabled");
            engine.add_step_handler(Box::new(RealtimePacer::new()));
        }

        info!(
            torque = config.torque.get_kind_str(),
            integrator = ?config.simulation.integrator,
            step_size = config.simulation.step_size,
            duration,
            "Simulation built"
        );
        Ok(Self {
            store,
            engine,
            duration,
            loopback: torque.loopback,
        })
    }

    /// The committed attitude shared with the torque providers.
    pub fn store(&self) -> &SharedStateStore {
        &self.store
    }

    /// The in-process command channel when the hardware loop runs in
    /// loopback, so a caller can play the flight software.
    pub fn loopback_channel(&self) -> Option<&InMemoryChannel> {
        self.loopback.as_ref()
    }

    /// Registers an extra handler, called after the built-in ones.
    pub fn add_step_handler(&mut self, handler: Box<dyn FixedStepHandler>) {
        self.engine.add_step_handler(handler);
    }

    /// Propagates for the configured duration.
    pub fn run(&mut self) -> RunOutcome {
        let target = self.store.get().time() + self.duration;
        let failure = match self.engine.propagate(target) {
            Ok(end) => {
                info!(time = end.time(), "Simulation complete");
                None
            }
            Err(e) => {
                let last = self.store.get();
                error!(
                    error = %e,
                    last_committed = last.time(),
                    target,
                    "Simulation aborted, reporting the last committed state"
                );
                Some(e)
            }
        };
        RunOutcome {
            last_committed: self.store.get(),
            target,
            failure,
        }
    }
}
