//! Error types for step execution failures.

use std::sync::Arc;

use bdd_outline_patterns::StepType;
use thiserror::Error;

use crate::error::{ResolveError, StepError, ValidationError};

/// Error type for scenario execution failures.
///
/// A missing implementation ([`StepNotFound`](Self::StepNotFound)) is kept
/// apart from failures of a found implementation so runners can report the
/// two differently.
///
/// # Examples
///
/// ```
/// use bdd_outline::{StepType, execution::ExecutionError};
///
/// let error = ExecutionError::StepNotFound {
///     index: 0,
///     step_type: StepType::Given,
///     text: "a missing step".into(),
///     feature_path: "cart.feature".into(),
///     scenario_name: "Add".into(),
/// };
/// assert!(error.is_lookup_failure());
/// assert_eq!(error.step_index(), Some(0));
/// ```
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// No implementation registered for the step.
    #[error(
        "step not found at index {index}: {step_type} \"{text}\" \
         (scenario \"{scenario_name}\" in {feature_path})"
    )]
    StepNotFound {
        /// Zero-based index among the effective steps.
        index: usize,
        /// The step type.
        step_type: StepType,
        /// The step name that was not found.
        text: String,
        /// Path to the feature file.
        feature_path: String,
        /// Name of the scenario.
        scenario_name: String,
    },
    /// The step's arguments could not be resolved.
    #[error(
        "cannot resolve arguments of step {index}: {step_type} \"{text}\" \
         (scenario \"{scenario_name}\" in {feature_path}): {error}"
    )]
    Resolve {
        /// Zero-based index among the effective steps.
        index: usize,
        /// The step type.
        step_type: StepType,
        /// The step name.
        text: String,
        /// Resolution failure.
        #[source]
        error: ResolveError,
        /// Path to the feature file.
        feature_path: String,
        /// Name of the scenario.
        scenario_name: String,
    },
    /// Step handler returned an error.
    #[error(
        "step failed at index {index}: {step_type} \"{text}\" \
         (scenario \"{scenario_name}\" in {feature_path}): {error}"
    )]
    HandlerFailed {
        /// Zero-based index among the effective steps.
        index: usize,
        /// The step type.
        step_type: StepType,
        /// The step name.
        text: String,
        /// The error returned by the handler, wrapped in Arc for Clone.
        #[source]
        error: Arc<StepError>,
        /// Path to the feature file.
        feature_path: String,
        /// Name of the scenario.
        scenario_name: String,
    },
    /// The scenario's examples do not cover its step parameters.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ExecutionError {
    /// Returns `true` when no implementation was found for a step.
    #[must_use]
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::StepNotFound { .. })
    }

    /// Index of the failing step, if the failure belongs to one.
    #[must_use]
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::StepNotFound { index, .. }
            | Self::Resolve { index, .. }
            | Self::HandlerFailed { index, .. } => Some(*index),
            Self::Validation(_) => None,
        }
    }
}
