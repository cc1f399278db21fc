//! Lifecycle callbacks invoked by the scenario runner.

use crate::execution::ExecutionError;
use crate::model::{ScenarioRef, Step};
use crate::registry::StepDefinition;
use crate::resolver::StepArguments;

/// Callbacks around scenario and step execution.
///
/// Every method defaults to doing nothing, so implementors override only
/// what they observe. Lookup failures go to
/// [`step_lookup_error`](Self::step_lookup_error); every other step failure
/// goes to [`step_error`](Self::step_error).
pub trait ScenarioHooks {
    /// Before the first step of a scenario.
    fn before_scenario(&self, _scenario: ScenarioRef<'_>) {}

    /// Before looking up a step implementation.
    fn before_step(&self, _scenario: ScenarioRef<'_>, _step: &Step) {}

    /// After arguments are resolved, right before the implementation runs.
    fn before_step_call(
        &self,
        _scenario: ScenarioRef<'_>,
        _step: &Step,
        _definition: &StepDefinition,
        _args: &StepArguments,
    ) {
    }

    /// After a step implementation succeeded.
    fn after_step(
        &self,
        _scenario: ScenarioRef<'_>,
        _step: &Step,
        _definition: &StepDefinition,
        _args: &StepArguments,
    ) {
    }

    /// After the last step, whether or not the scenario passed.
    fn after_scenario(&self, _scenario: ScenarioRef<'_>) {}

    /// A step failed while resolving arguments or running.
    fn step_error(&self, _scenario: ScenarioRef<'_>, _step: &Step, _error: &ExecutionError) {}

    /// No implementation is registered for a step.
    fn step_lookup_error(&self, _scenario: ScenarioRef<'_>, _step: &Step, _error: &ExecutionError) {
    }
}

/// Hooks that observe nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ScenarioHooks for NoHooks {}
