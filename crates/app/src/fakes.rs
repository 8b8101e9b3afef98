//! Test doubles shared by the service tests.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thingkit_domain::error::{HardwareFault, RegistrationError};
use thingkit_domain::parameter::{Parameter, ParameterList};
use thingkit_domain::plan::Plan;
use thingkit_domain::thing::DeclaredThing;
use thingkit_domain::value::ValueType;
use tokio::time::Instant;

use crate::ports::Actuator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmd {
    Init,
    Go,
    Stop,
    Level(u8),
}

/// Records every command with its offset from construction time.
pub struct RecordingActuator {
    started: Instant,
    log: Mutex<Vec<(Duration, Cmd)>>,
    reject: Option<Cmd>,
}

impl Default for RecordingActuator {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            log: Mutex::new(Vec::new()),
            reject: None,
        }
    }
}

impl RecordingActuator {
    pub fn failing_on(command: Cmd) -> Self {
        Self {
            reject: Some(command),
            ..Self::default()
        }
    }

    pub fn timed_commands(&self) -> Vec<(Duration, Cmd)> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn commands(&self) -> Vec<Cmd> {
        self.timed_commands().into_iter().map(|(_, c)| c).collect()
    }
}

impl Actuator for RecordingActuator {
    type Command = Cmd;

    fn execute(&self, command: &Cmd) -> impl Future<Output = Result<(), HardwareFault>> + Send {
        let result = if self.reject == Some(*command) {
            Err(HardwareFault::message(format!("rejected {command:?}")))
        } else {
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((self.started.elapsed(), *command));
            Ok(())
        };
        async move { result }
    }
}

#[derive(Debug, Default)]
pub struct Rover {
    pub moving: bool,
    pub level: u8,
}

/// A small thing driving [`Cmd`]s: `Drive` goes for 500 ms then stops,
/// `SetLevel` takes a required level in 1..=10.
pub fn rover(name: &str) -> Result<DeclaredThing<Rover, Cmd>, RegistrationError> {
    DeclaredThing::new(name, "test rover", Rover::default())
        .boolean_property("moving", "", |s: &Rover| s.moving)?
        .number_property("level", "", |s: &Rover| f64::from(s.level))?
        .method("Drive", "", ParameterList::new(), |s: &mut Rover, _: &ParameterList| {
            s.moving = true;
            Ok(Plan::none().issue(Cmd::Go).hold_millis(500).issue(Cmd::Stop))
        })?
        .method(
            "SetLevel",
            "",
            ParameterList::from_parameters([
                Parameter::new("level", "", ValueType::Number, true).with_range(1.0..=10.0)
            ])?,
            |s: &mut Rover, p: &ParameterList| {
                s.level = p.byte("level")?;
                Ok(Plan::none().issue(Cmd::Level(s.level)).returning(s.level))
            },
        )
        .map(|thing| thing.on_startup(Plan::none().issue(Cmd::Init)))
}
