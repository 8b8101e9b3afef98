//! Actuator port: the hardware collaborator that executes commands.
//!
//! The capability model never drives hardware itself. Method handlers emit
//! commands in a [`Plan`](thingkit_domain::plan::Plan); the executor forwards
//! each one to an [`Actuator`]. What a command physically does is entirely
//! up to the adapter.

use std::future::Future;
use std::sync::Arc;

use thingkit_domain::error::HardwareFault;

/// Executes device commands, one at a time, in the order received.
///
/// The actuator does not arbitrate between things sharing it: ordering is
/// whatever order the executor issues commands in.
pub trait Actuator: Send + Sync {
    /// The command vocabulary this actuator understands.
    type Command;

    /// Execute a single command.
    fn execute(
        &self,
        command: &Self::Command,
    ) -> impl Future<Output = Result<(), HardwareFault>> + Send;
}

impl<T: Actuator> Actuator for Arc<T> {
    type Command = T::Command;

    fn execute(
        &self,
        command: &Self::Command,
    ) -> impl Future<Output = Result<(), HardwareFault>> + Send {
        (**self).execute(command)
    }
}
