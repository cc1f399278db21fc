//! Per-invocation execution state.
//!
//! The parsed tree is shared and immutable; everything one scenario run
//! produces lives here instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bdd_outline_patterns::{StepType, Value};

use crate::combinator::{ExampleRow, ParametrizeOptions};
use crate::error::ParametrizeError;
use crate::model::ScenarioRef;
use crate::source::{LookupError, ValueSource};

/// How a single step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The implementation returned successfully.
    Passed,
    /// Argument resolution or the implementation failed.
    Failed(String),
    /// No implementation was registered.
    NotFound,
}

/// Record of one executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// Zero-based index among the effective steps.
    pub index: usize,
    /// Step type.
    pub step_type: StepType,
    /// Step name used for lookup.
    pub name: String,
    /// Line of the step in the document.
    pub line: usize,
    /// Outcome of the step.
    pub outcome: StepOutcome,
    /// Time spent in the implementation; zero when it never ran.
    pub duration: Duration,
}

/// Mutable state of one scenario invocation.
///
/// Implements [`ValueSource`]: the example row is the current example and
/// injected values answer [`resolve`](ValueSource::resolve).
///
/// # Examples
/// ```
/// use bdd_outline::{ExecutionContext, Value, ValueSource, parse_feature_str};
///
/// let feature = parse_feature_str("Feature: F\nScenario: S\nGiven x\n").unwrap();
/// let mut ctx = ExecutionContext::new(feature.scenario("S").unwrap());
/// ctx.inject("db", "sqlite");
/// assert_eq!(ctx.resolve("db"), Ok(Value::from("sqlite")));
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    feature_path: PathBuf,
    scenario: String,
    example: Option<ExampleRow>,
    values: HashMap<String, Value>,
    reports: Vec<StepReport>,
}

impl ExecutionContext {
    /// A fresh context for `scenario` without an example row.
    #[must_use]
    pub fn new(scenario: ScenarioRef<'_>) -> Self {
        Self {
            feature_path: scenario.feature().path().to_path_buf(),
            scenario: scenario.name().to_string(),
            example: None,
            values: HashMap::new(),
            reports: Vec::new(),
        }
    }

    /// One context per execution instance of `scenario`.
    ///
    /// A scenario without examples yields a single context with an empty
    /// example row.
    ///
    /// # Errors
    /// Returns [`ParametrizeError`] when a converter rejects a cell.
    pub fn instances(
        scenario: ScenarioRef<'_>,
        options: &ParametrizeOptions,
    ) -> Result<Vec<Self>, ParametrizeError> {
        let instances = scenario.parametrization(options)?.instances();
        Ok(instances
            .into_iter()
            .map(|row| Self::new(scenario).with_example(row))
            .collect())
    }

    /// Set the example row.
    #[must_use]
    pub fn with_example(mut self, example: ExampleRow) -> Self {
        self.example = Some(example);
        self
    }

    /// Key of the scenario this context belongs to.
    #[must_use]
    pub fn key(&self) -> (&Path, &str) {
        (self.feature_path.as_path(), self.scenario.as_str())
    }

    /// The example row, if any.
    #[must_use]
    pub fn example(&self) -> Option<&ExampleRow> {
        self.example.as_ref()
    }

    /// Make `value` available under `name` to later steps.
    pub fn inject(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Injected value under `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Steps executed so far, in order.
    #[must_use]
    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    /// Whether every executed step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.reports
            .iter()
            .all(|report| report.outcome == StepOutcome::Passed)
    }

    pub(crate) fn record(&mut self, report: StepReport) {
        self.reports.push(report);
    }
}

impl ValueSource for ExecutionContext {
    fn current_example(&self) -> Option<&ExampleRow> {
        self.example.as_ref()
    }

    fn resolve(&self, name: &str) -> Result<Value, LookupError> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}
