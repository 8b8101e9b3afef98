//! Plan execution.

use std::fmt;

use thingkit_domain::error::HardwareFault;
use thingkit_domain::plan::Step;

use crate::ports::Actuator;

/// Run `steps` against `actuator`, in order.
///
/// Holds are awaited with [`tokio::time::sleep`], so a long hold does not
/// occupy a runtime thread. Execution stops at the first failing command;
/// later steps are not attempted.
///
/// # Errors
///
/// Returns the [`HardwareFault`] of the first command the actuator rejects.
pub async fn execute_plan<A>(actuator: &A, steps: Vec<Step<A::Command>>) -> Result<(), HardwareFault>
where
    A: Actuator,
    A::Command: fmt::Debug + Send + Sync,
{
    for (index, step) in steps.into_iter().enumerate() {
        match step {
            Step::Issue(command) => {
                tracing::debug!(step = index, ?command, "issuing command");
                if let Err(err) = actuator.execute(&command).await {
                    tracing::warn!(step = index, ?command, error = %err, "command failed");
                    return Err(err);
                }
            }
            Step::Hold(duration) => {
                tracing::debug!(step = index, ?duration, "holding");
                tokio::time::sleep(duration).await;
            }
        }
    }
    Ok(())
}
