//! Plans: what a method handler asks the hardware to do.
//!
//! Handlers never talk to hardware directly. They return a [`Plan`]: an
//! ordered list of commands and bounded holds, plus an optional result value.
//! The application layer executes the plan after the handler returns, so a
//! hold-then-stop action is expressed as `issue(go)`, `hold(d)`, `issue(stop)`
//! and the executor awaits the hold instead of blocking a thread.

use std::time::Duration;

use crate::value::Value;

/// One step of a [`Plan`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step<C> {
    /// Send a command to the hardware collaborator.
    Issue(C),
    /// Wait before the next step.
    Hold(Duration),
}

/// The outcome of a method handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<C> {
    steps: Vec<Step<C>>,
    result: Option<Value>,
}

impl<C> Default for Plan<C> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            result: None,
        }
    }
}

impl<C> Plan<C> {
    /// A plan with no hardware effect and no result.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Append a command.
    #[must_use]
    pub fn issue(mut self, command: C) -> Self {
        self.steps.push(Step::Issue(command));
        self
    }

    /// Append a hold of `millis` milliseconds.
    #[must_use]
    pub fn hold_millis(self, millis: u64) -> Self {
        self.hold(Duration::from_millis(millis))
    }

    /// Append a hold.
    #[must_use]
    pub fn hold(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Hold(duration));
        self
    }

    /// Set the value returned to the caller once the plan completes.
    #[must_use]
    pub fn returning(mut self, value: impl Into<Value>) -> Self {
        self.result = Some(value.into());
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[Step<C>] {
        &self.steps
    }

    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Total time spent in holds.
    #[must_use]
    pub fn hold_time(&self) -> Duration {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::Hold(d) => Some(*d),
                Step::Issue(_) => None,
            })
            .sum()
    }

    /// Split into steps and result.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Step<C>>, Option<Value>) {
        (self.steps, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_steps_in_order() {
        let plan = Plan::none().issue("go").hold_millis(500).issue("stop");
        assert_eq!(
            plan.steps(),
            &[
                Step::Issue("go"),
                Step::Hold(Duration::from_millis(500)),
                Step::Issue("stop"),
            ]
        );
    }

    #[test]
    fn should_sum_hold_time() {
        let plan: Plan<()> = Plan::none().hold_millis(600).hold(Duration::from_secs(1));
        assert_eq!(plan.hold_time(), Duration::from_millis(1600));
    }

    #[test]
    fn should_carry_result_value() {
        let plan: Plan<()> = Plan::none().returning(true);
        let (steps, result) = plan.into_parts();
        assert!(steps.is_empty());
        assert_eq!(result, Some(Value::Boolean(true)));
    }
}
