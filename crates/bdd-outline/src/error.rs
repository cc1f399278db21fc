//! Error types raised while parsing, validating, and resolving scenarios.

use std::collections::BTreeSet;
use std::path::PathBuf;

use bdd_outline_patterns::{ConversionError, ParamError, PatternError, StepType};
use thiserror::Error;

/// Structural problem in a feature document.
///
/// Carries the offending line so the message points at the exact place in
/// the file.
///
/// # Examples
/// ```
/// use bdd_outline::StructuralError;
///
/// let err = StructuralError {
///     message: "step definition outside of a Scenario or a Background".into(),
///     line: 3,
///     line_text: "Given a stray step".into(),
///     path: "billing.feature".into(),
/// };
/// assert_eq!(
///     err.to_string(),
///     "step definition outside of a Scenario or a Background\n\
///      line number: 3\nline: Given a stray step\nfile: billing.feature",
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}\nline number: {line}\nline: {line_text}\nfile: {path}")]
pub struct StructuralError {
    /// What went wrong.
    pub message: String,
    /// One-based line number.
    pub line: usize,
    /// Comment-stripped text of the line.
    pub line_text: String,
    /// Path the document was read from (or a placeholder for in-memory text).
    pub path: String,
}

/// Invalid example table or step parameter literal.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExampleTableError {
    /// A vertical examples block repeats a parameter name.
    #[error(
        "example rows should contain unique parameters: `{name}` appeared more than once (line {line} in {path})"
    )]
    DuplicateVerticalName {
        /// Repeated name.
        name: String,
        /// Line of the repeated row.
        line: usize,
        /// Document path.
        path: String,
    },
    /// A horizontal row does not match the header width.
    #[error(
        "example row has {found} cells but the header declares {expected} (line {line}: `{line_text}` in {path})"
    )]
    RaggedRow {
        /// Header width.
        expected: usize,
        /// Cells in the row.
        found: usize,
        /// Line of the row.
        line: usize,
        /// Raw row text.
        line_text: String,
        /// Document path.
        path: String,
    },
    /// A vertical row has no cells, so no parameter name.
    #[error("vertical example row has no parameter name (line {line}: `{line_text}` in {path})")]
    MissingVerticalName {
        /// Line of the row.
        line: usize,
        /// Raw row text.
        line_text: String,
        /// Document path.
        path: String,
    },
    /// A vertical block has value lists of differing lengths.
    #[error(
        "vertical example `{name}` has {found} values but `{first}` has {expected} (examples at line {line} in {path})"
    )]
    RaggedVertical {
        /// First parameter name, defining the row count.
        first: String,
        /// Offending parameter.
        name: String,
        /// Value count of the first parameter.
        expected: usize,
        /// Value count of the offending parameter.
        found: usize,
        /// Declaration line of the block.
        line: usize,
        /// Document path.
        path: String,
    },
    /// A step parameter uses an unknown code or an invalid literal.
    #[error("{source}\nline number: {line}\nname: {step}\nfile: {path}")]
    Param {
        /// Underlying scanner failure.
        #[source]
        source: ParamError,
        /// Raw step text.
        step: String,
        /// Line of the step.
        line: usize,
        /// Document path.
        path: String,
    },
}

/// Failure to turn a document into a [`Feature`](crate::Feature).
///
/// Any variant aborts the whole document; no partial tree is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document structure is invalid.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// An examples block or step parameter is invalid.
    #[error(transparent)]
    Examples(#[from] ExampleTableError),
    /// The document could not be read.
    #[error("cannot read feature file {}: {source}", .path.display())]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Step parameters not covered by example columns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "scenario \"{scenario}\" in the feature \"{feature_path}\" has invalid examples: \
     set of step parameters {step_params:?} should match set of example values {example_params:?}"
)]
pub struct ValidationError {
    /// Scenario name.
    pub scenario: String,
    /// Absolute path of the owning feature.
    pub feature_path: String,
    /// Parameters used by the effective steps, sorted.
    pub step_params: Vec<String>,
    /// Parameters provided by example blocks, sorted.
    pub example_params: Vec<String>,
}

impl ValidationError {
    pub(crate) fn new(
        scenario: &str,
        feature_path: &str,
        step_params: &BTreeSet<&str>,
        example_params: &BTreeSet<&str>,
    ) -> Self {
        Self {
            scenario: scenario.to_string(),
            feature_path: feature_path.to_string(),
            step_params: step_params.iter().map(ToString::to_string).collect(),
            example_params: example_params.iter().map(ToString::to_string).collect(),
        }
    }

    /// Step parameters with no matching example column.
    #[must_use]
    pub fn missing(&self) -> Vec<&str> {
        self.step_params
            .iter()
            .filter(|p| !self.example_params.contains(p))
            .map(String::as_str)
            .collect()
    }
}

/// A caller-supplied example converter rejected a cell.
#[derive(Debug, Error)]
#[error("cannot convert example value `{raw}` for parameter `{name}`: {source}")]
pub struct ParametrizeError {
    /// Parameter (column) name.
    pub name: String,
    /// Raw cell text.
    pub raw: String,
    /// Failure reported by the converter.
    #[source]
    pub source: crate::combinator::ConverterError,
}

/// Failure to compute the arguments of a step invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// No constant, alias, example value, source value, or default exists.
    #[error("unresolved parameter `{name}` for step `{step}`")]
    Unresolved {
        /// Formal argument name.
        name: String,
        /// Canonical step name.
        step: String,
    },
    /// The value source failed while looking up a name.
    #[error("lookup of `{target}` for parameter `{name}` failed: {reason}")]
    Lookup {
        /// Formal argument name.
        name: String,
        /// Name passed to the value source.
        target: String,
        /// Failure reported by the source.
        reason: String,
    },
    /// A value captured by a step pattern does not fit its type hint.
    #[error("captured value `{raw}` for parameter `{name}` could not convert: {source}")]
    Capture {
        /// Placeholder name.
        name: String,
        /// Captured text.
        raw: String,
        /// Conversion failure.
        #[source]
        source: ConversionError,
    },
    /// An alias post-processing code rejected the resolved value.
    #[error("alias parameter `{name}` could not convert `{target}`: {source}")]
    AliasConversion {
        /// Formal argument name.
        name: String,
        /// Alias target.
        target: String,
        /// Conversion failure.
        #[source]
        source: ConversionError,
    },
}

/// Failure reported by a step implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StepError {
    /// A formal argument was not resolved.
    #[error("missing argument `{0}`")]
    MissingArgument(String),
    /// An argument has a value the step cannot use.
    #[error("argument `{name}` has unexpected value `{value}`")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Rendered value.
        value: String,
    },
    /// The step body failed.
    #[error("{0}")]
    Failed(String),
}

/// Problem found while collecting step definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two definitions share a step type and name; the first one is kept.
    #[error("duplicate {step_type} step \"{name}\" at {duplicate}; keeping the one at {kept}")]
    Duplicate {
        /// Step type of both definitions.
        step_type: StepType,
        /// Shared step name.
        name: String,
        /// `file:line` of the definition that is used.
        kept: String,
        /// `file:line` of the ignored definition.
        duplicate: String,
    },
    /// A definition name does not compile as a step pattern.
    #[error("invalid {step_type} step pattern \"{name}\" at {location}: {source}")]
    InvalidPattern {
        /// Step type of the definition.
        step_type: StepType,
        /// Pattern as written.
        name: String,
        /// `file:line` of the definition.
        location: String,
        /// Compilation failure.
        #[source]
        source: PatternError,
    },
}
