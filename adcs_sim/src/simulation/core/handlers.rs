// adcs_sim/src/simulation/core/handlers.rs

//! Step handlers the runner adds after the synchronizer.

use std::thread;
use std::time::{Duration, Instant};

use adcs_core::io::{publish_vector, GYROMETER_KEY_PREFIX, MAGNETOMETER_KEY_PREFIX};
use adcs_core::prelude::{
    CommandChannel, FixedStepHandler, MagneticFieldSensor, PropagationError, SharedStateStore, SimTime,
    SpacecraftState,
};
use tracing::{debug, info, warn};

use crate::simulation::sensors::NoisyGyrometer;

/// Sleeps so that simulated time never runs ahead of wall-clock time.
#[derive(Debug)]
pub struct RealtimePacer {
    origin: Option<(Instant, SimTime)>,
}

impl RealtimePacer {
    pub fn new() -> Self {
        Self { origin: None }
    }
}

impl Default for RealtimePacer {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedStepHandler for RealtimePacer {
    fn handle_step(&mut self, state: &SpacecraftState, _is_last: bool) -> Result<(), PropagationError> {
        let (wall_start, sim_start) = *self.origin.get_or_insert((Instant::now(), state.time()));
        let due = Duration::try_from_secs_f64(state.time() - sim_start).unwrap_or_default();
        let elapsed = wall_start.elapsed();
        if due > elapsed {
            thread::sleep(due - elapsed);
        } else if elapsed - due > Duration::from_millis(100) {
            debug!(time = state.time(), lag_ms = (elapsed - due).as_millis() as u64, "Running behind real time");
        }
        Ok(())
    }
}

/// Logs the committed attitude every `interval` simulated seconds.
#[derive(Debug)]
pub struct ProgressLogger {
    store: SharedStateStore,
    interval: SimTime,
    next: SimTime,
}

impl ProgressLogger {
    pub fn new(store: SharedStateStore, interval: SimTime) -> Self {
        let next = store.initial().time();
        Self {
            store,
            interval,
            next,
        }
    }
}

impl FixedStepHandler for ProgressLogger {
    fn handle_step(&mut self, _state: &SpacecraftState, is_last: bool) -> Result<(), PropagationError> {
        let committed = self.store.get();
        let time = committed.time();
        if time + 1e-9 < self.next && !is_last {
            return Ok(());
        }
        let q = committed.attitude.rotation.quaternion();
        info!(
            time,
            quaternion = ?[q.w, q.i, q.j, q.k],
            spin_rate = committed.attitude.spin.norm(),
            "Attitude"
        );
        while self.next <= time + 1e-9 {
            self.next += self.interval;
        }
        Ok(())
    }
}

/// Writes the noisy magnetometer and gyro readings of every committed step
/// to the flight software's channel.
///
/// A failed write is logged and counted. The run goes on, and the flight
/// software keeps the previous readings.
#[derive(Debug)]
pub struct SensorPublisher {
    store: SharedStateStore,
    magnetometer: Box<dyn MagneticFieldSensor>,
    gyrometer: NoisyGyrometer,
    channel: Box<dyn CommandChannel>,
    failures: u64,
}

impl SensorPublisher {
    pub fn new(
        store: SharedStateStore,
        magnetometer: Box<dyn MagneticFieldSensor>,
        gyrometer: NoisyGyrometer,
        channel: Box<dyn CommandChannel>,
    ) -> Self {
        Self {
            store,
            magnetometer,
            gyrometer,
            channel,
            failures: 0,
        }
    }

    /// Steps whose readings could not be written.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl FixedStepHandler for SensorPublisher {
    fn handle_step(&mut self, _state: &SpacecraftState, _is_last: bool) -> Result<(), PropagationError> {
        let time = self.store.get().time();
        let field = self.magnetometer.measure(time);
        let spin = self.gyrometer.measure();

        let written = publish_vector(self.channel.as_mut(), MAGNETOMETER_KEY_PREFIX, &field)
            .and_then(|()| publish_vector(self.channel.as_mut(), GYROMETER_KEY_PREFIX, &spin));
        if let Err(e) = written {
            self.failures += 1;
            warn!(time, error = %e, failures = self.failures, "Could not publish sensor readings");
        }
        Ok(())
    }
}
