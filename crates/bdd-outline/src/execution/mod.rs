//! Running one scenario invocation against the step registry.
//!
//! The runner walks the effective steps of a scenario, matches each one's
//! canonical first line against the registry by step type, resolves its
//! arguments against the invocation's [`ExecutionContext`], and calls the
//! implementation. Multi-line content never takes part in matching; it
//! reaches the implementation as the `docstring` argument. Hooks observe
//! every stage. The first failing step stops the scenario.

mod context;
mod error;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bdd_outline_patterns::Value;
use log::{debug, info};

use crate::config;
use crate::hooks::ScenarioHooks;
use crate::model::{ScenarioRef, Step};
use crate::registry::{StepDefinition, StepRegistry, registry};
use crate::resolver::{resolve_bound_arguments, step_bindings};

pub use context::{ExecutionContext, StepOutcome, StepReport};
pub use error::ExecutionError;

/// Drives scenario invocations.
pub struct ScenarioRunner<'h> {
    hooks: &'h dyn ScenarioHooks,
    registry: Arc<StepRegistry>,
}

impl<'h> ScenarioRunner<'h> {
    /// A runner over the process-wide registry.
    #[must_use]
    pub fn new(hooks: &'h dyn ScenarioHooks) -> Self {
        Self::with_registry(hooks, registry())
    }

    /// A runner over an explicit registry.
    #[must_use]
    pub fn with_registry(hooks: &'h dyn ScenarioHooks, registry: Arc<StepRegistry>) -> Self {
        Self { hooks, registry }
    }

    /// Run every effective step of `scenario` in order.
    ///
    /// The scenario is validated first while [`config::validate_on_bind`]
    /// is on. `before_scenario` and `after_scenario` bracket the steps even
    /// when a step fails.
    ///
    /// # Errors
    /// Returns the first [`ExecutionError`]: a validation failure, a missing
    /// implementation, an unresolved argument, or a failing implementation.
    pub fn run(
        &self,
        scenario: ScenarioRef<'_>,
        ctx: &mut ExecutionContext,
    ) -> Result<(), ExecutionError> {
        if config::validate_on_bind() {
            scenario.validate()?;
        }
        debug!(
            "running scenario {:?} from {}",
            scenario.name(),
            scenario.feature().path_label()
        );
        self.hooks.before_scenario(scenario);
        let result = scenario
            .effective_steps()
            .enumerate()
            .try_for_each(|(index, step)| self.run_step(scenario, index, step, ctx));
        self.hooks.after_scenario(scenario);
        if result.is_ok() {
            info!("scenario {:?} passed", scenario.name());
        }
        result
    }

    fn run_step(
        &self,
        scenario: ScenarioRef<'_>,
        index: usize,
        step: &Step,
        ctx: &mut ExecutionContext,
    ) -> Result<(), ExecutionError> {
        self.hooks.before_step(scenario, step);
        let name = step.canonical().trim().to_string();
        let Some(found) = self.registry.find(step.step_type(), &name) else {
            let err = ExecutionError::StepNotFound {
                index,
                step_type: step.step_type(),
                text: name.clone(),
                feature_path: scenario.feature().path_label(),
                scenario_name: scenario.name().to_string(),
            };
            ctx.record(report(index, step, name, StepOutcome::NotFound, Duration::ZERO));
            self.hooks.step_lookup_error(scenario, step, &err);
            return Err(err);
        };

        let definition = found.definition;
        let resolved = step_bindings(step, &found.captures)
            .and_then(|bound| resolve_bound_arguments(step, definition.args, &bound, &*ctx));
        let args = match resolved {
            Ok(args) => args,
            Err(error) => {
                let err = ExecutionError::Resolve {
                    index,
                    step_type: step.step_type(),
                    text: name.clone(),
                    error,
                    feature_path: scenario.feature().path_label(),
                    scenario_name: scenario.name().to_string(),
                };
                let outcome = StepOutcome::Failed(err.to_string());
                ctx.record(report(index, step, name, outcome, Duration::ZERO));
                self.hooks.step_error(scenario, step, &err);
                return Err(err);
            }
        };

        self.hooks.before_step_call(scenario, step, definition, &args);
        let started = Instant::now();
        let result = (definition.run)(&args);
        let elapsed = started.elapsed();
        match result {
            Ok(output) => {
                inject_output(definition, output, ctx);
                ctx.record(report(index, step, name, StepOutcome::Passed, elapsed));
                self.hooks.after_step(scenario, step, definition, &args);
                Ok(())
            }
            Err(error) => {
                let err = ExecutionError::HandlerFailed {
                    index,
                    step_type: step.step_type(),
                    text: name.clone(),
                    error: Arc::new(error),
                    feature_path: scenario.feature().path_label(),
                    scenario_name: scenario.name().to_string(),
                };
                let outcome = StepOutcome::Failed(err.to_string());
                ctx.record(report(index, step, name, outcome, elapsed));
                self.hooks.step_error(scenario, step, &err);
                Err(err)
            }
        }
    }
}

fn inject_output(
    definition: &StepDefinition,
    output: Option<Value>,
    ctx: &mut ExecutionContext,
) {
    if let (Some(target), Some(value)) = (definition.target, output) {
        ctx.inject(target, value);
    }
}

fn report(
    index: usize,
    step: &Step,
    name: String,
    outcome: StepOutcome,
    duration: Duration,
) -> StepReport {
    StepReport {
        index,
        step_type: step.step_type(),
        name,
        line: step.line(),
        outcome,
        duration,
    }
}

#[cfg(test)]
mod tests;
