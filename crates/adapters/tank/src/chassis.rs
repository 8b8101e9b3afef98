//! Simulated chassis controller.
//!
//! Stands in for the motor and LED driver board. It keeps the same state the
//! board would (current motion, light pattern, dance routine) and a log of
//! every command received, so behaviour can be observed without hardware.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thingkit_app::ports::Actuator;
use thingkit_domain::error::HardwareFault;
use tokio::time::Instant;

use crate::command::{ChassisCommand, MotionVector};

/// Failures reported by the chassis controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChassisError {
    /// A command arrived before `Start`.
    #[error("chassis not started, cannot execute {0}")]
    NotStarted(ChassisCommand),
    /// The controller refused the command.
    #[error("chassis rejected {0}")]
    Rejected(ChassisCommand),
}

impl From<ChassisError> for HardwareFault {
    fn from(err: ChassisError) -> Self {
        Self::new("chassis command failed", err)
    }
}

/// Last known state of the simulated board.
#[derive(Debug, Clone, PartialEq)]
pub struct ChassisState {
    pub started: bool,
    pub motion: MotionVector,
    pub light: Option<u8>,
    pub dance: Option<u8>,
    pub speed: Option<u8>,
    pub brightness: Option<u8>,
}

impl Default for ChassisState {
    fn default() -> Self {
        Self {
            started: false,
            motion: MotionVector::STOP,
            light: None,
            dance: None,
            speed: None,
            brightness: None,
        }
    }
}

#[derive(Default)]
struct Inner {
    state: ChassisState,
    log: Vec<(Instant, ChassisCommand)>,
    reject: Vec<ChassisCommand>,
}

/// In-memory [`Actuator`] for [`ChassisCommand`]s.
pub struct SimulatedChassis {
    created: Instant,
    latency: Duration,
    inner: Mutex<Inner>,
}

impl Default for SimulatedChassis {
    fn default() -> Self {
        Self {
            created: Instant::now(),
            latency: Duration::ZERO,
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl std::fmt::Debug for SimulatedChassis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedChassis")
            .field("latency", &self.latency)
            .field("state", &self.lock().state)
            .finish_non_exhaustive()
    }
}

impl SimulatedChassis {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every command by `latency`, like a serial link would.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the board refuse `command` from now on.
    pub fn reject(&self, command: ChassisCommand) {
        self.lock().reject.push(command);
    }

    /// Accept every command again.
    pub fn heal(&self) {
        self.lock().reject.clear();
    }

    #[must_use]
    pub fn state(&self) -> ChassisState {
        self.lock().state.clone()
    }

    /// Every accepted command, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<ChassisCommand> {
        self.lock().log.iter().map(|(_, command)| *command).collect()
    }

    /// Accepted commands with their offset from the chassis' creation.
    #[must_use]
    pub fn timeline(&self) -> Vec<(Duration, ChassisCommand)> {
        self.lock()
            .log
            .iter()
            .map(|(at, command)| (at.duration_since(self.created), *command))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, command: ChassisCommand) -> Result<(), ChassisError> {
        let mut inner = self.lock();
        if inner.reject.contains(&command) {
            return Err(ChassisError::Rejected(command));
        }
        if !inner.state.started && command != ChassisCommand::Start {
            return Err(ChassisError::NotStarted(command));
        }

        let state = &mut inner.state;
        match command {
            ChassisCommand::Start => state.started = true,
            ChassisCommand::Motion(vector) => {
                state.motion = vector;
                if !vector.is_stop() {
                    state.dance = None;
                }
            }
            ChassisCommand::RgbLight(code) => state.light = Some(code),
            ChassisCommand::DanceMode(mode) => state.dance = Some(mode),
            ChassisCommand::Speed(speed) => state.speed = Some(speed),
            ChassisCommand::Brightness(level) => state.brightness = Some(level),
        }
        inner.log.push((Instant::now(), command));
        Ok(())
    }
}

impl Actuator for SimulatedChassis {
    type Command = ChassisCommand;

    fn execute(
        &self,
        command: &ChassisCommand,
    ) -> impl Future<Output = Result<(), HardwareFault>> + Send {
        let command = *command;
        async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            tracing::debug!(line = %command, "chassis");
            self.apply(command).map_err(HardwareFault::from)
        }
    }
}
