//! Computing the arguments of one step invocation.
//!
//! Each formal argument is resolved in a fixed order: a constant embedded in
//! the step text, then an alias, then a value bound by the matched
//! definition (pattern captures and the step's multi-line content), then
//! the current example row, then the value source, and finally the declared
//! default.

use bdd_outline_patterns::{Capture, ConstantParam, Value, apply_code};
use log::trace;

use crate::error::{ResolveError, StepError};
use crate::model::Step;
use crate::source::{LookupError, ValueSource};

/// Argument name under which a step's multi-line content is bound.
pub const DOCSTRING_ARG: &str = "docstring";

/// A formal argument declared by a step implementation.
#[derive(Debug, Clone, Copy)]
pub struct StepArg {
    /// Argument name as used in the step text and example columns.
    pub name: &'static str,
    /// Value used when nothing else provides one.
    pub default: Option<fn() -> Value>,
}

impl StepArg {
    /// An argument without a default.
    #[must_use]
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
        }
    }

    /// An argument falling back to `default()`.
    #[must_use]
    pub const fn with_default(name: &'static str, default: fn() -> Value) -> Self {
        Self {
            name,
            default: Some(default),
        }
    }
}

/// Resolved arguments in declaration order.
///
/// Arguments skipped through an `S` code and without a default are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepArguments(Vec<(&'static str, Value)>);

impl StepArguments {
    /// Value of `name`, if resolved.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Whether `name` was resolved.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Resolved names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(name, _)| *name)
    }

    /// Resolved arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(name, value)| (*name, value))
    }

    /// Number of resolved arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of `name`, or [`StepError::MissingArgument`].
    ///
    /// # Errors
    /// Returns [`StepError::MissingArgument`] when `name` was not resolved.
    pub fn require(&self, name: &str) -> Result<&Value, StepError> {
        self.get(name)
            .ok_or_else(|| StepError::MissingArgument(name.to_string()))
    }

    /// Append a resolved argument.
    pub fn push(&mut self, name: &'static str, value: impl Into<Value>) {
        self.0.push((name, value.into()));
    }
}

impl IntoIterator for StepArguments {
    type Item = (&'static str, Value);
    type IntoIter = std::vec::IntoIter<(&'static str, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Resolve every formal argument of `step`.
///
/// # Errors
/// Returns [`ResolveError`] when an argument has no value and no default,
/// when the value source fails, or when an alias conversion code rejects
/// the resolved value.
///
/// # Examples
/// ```
/// use bdd_outline::{MapValueSource, Step, StepArg, StepType, Value, resolve_arguments};
///
/// let step = Step::new(StepType::Given, "Given", "<count.i:3> items for <user.A:admin>", 0, 1)
///     .unwrap();
/// let source = MapValueSource::new().with_value("admin", "root");
/// let args = resolve_arguments(
///     &step,
///     &[StepArg::required("count"), StepArg::required("user")],
///     &source,
/// )
/// .unwrap();
/// assert_eq!(args.get("count"), Some(&Value::Int(3)));
/// assert_eq!(args.get("user"), Some(&Value::from("root")));
/// ```
pub fn resolve_arguments(
    step: &Step,
    args: &[StepArg],
    source: &dyn ValueSource,
) -> Result<StepArguments, ResolveError> {
    resolve_bound_arguments(step, args, &StepArguments::default(), source)
}

/// Values a matched definition binds for `step`: converted pattern
/// captures, plus the multi-line content as [`DOCSTRING_ARG`].
///
/// # Errors
/// Returns [`ResolveError::Capture`] when a captured value does not fit its
/// placeholder type hint.
///
/// # Examples
/// ```
/// use bdd_outline::{Step, StepType, step_bindings};
///
/// let step = Step::new(StepType::Given, "Given", "a note", 0, 1).unwrap();
/// assert!(step_bindings(&step, &[]).unwrap().is_empty());
/// ```
pub fn step_bindings(
    step: &Step,
    captures: &[Capture<'static>],
) -> Result<StepArguments, ResolveError> {
    let mut bound = StepArguments::default();
    for capture in captures {
        let value = capture.value().map_err(|source| ResolveError::Capture {
            name: capture.name.to_string(),
            raw: capture.raw.clone(),
            source,
        })?;
        bound.push(capture.name, value);
    }
    if let Some(content) = step.content() {
        bound.push(DOCSTRING_ARG, content);
    }
    Ok(bound)
}

/// Resolve every formal argument of `step`, consulting `bound` after the
/// step's constants and aliases.
///
/// # Errors
/// As [`resolve_arguments`].
pub fn resolve_bound_arguments(
    step: &Step,
    args: &[StepArg],
    bound: &StepArguments,
    source: &dyn ValueSource,
) -> Result<StepArguments, ResolveError> {
    let mut resolved = StepArguments::default();
    for arg in args {
        if let Some(value) = resolve_one(step, arg, bound, source)? {
            trace!("resolved `{}` for step {step}", arg.name);
            resolved.push(arg.name, value);
        }
    }
    Ok(resolved)
}

fn resolve_one(
    step: &Step,
    arg: &StepArg,
    bound: &StepArguments,
    source: &dyn ValueSource,
) -> Result<Option<Value>, ResolveError> {
    if let Some(constant) = step.constants().get(arg.name) {
        return Ok(match constant {
            ConstantParam::Value(value) => Some(value.clone()),
            ConstantParam::Skip => arg.default.map(|default| default()),
        });
    }
    if let Some(alias) = step.aliases().get(arg.name) {
        let Some(value) = lookup(source, arg.name, &alias.target)? else {
            return fallback(step, arg).map(Some);
        };
        let Some(code) = alias.post else {
            return Ok(Some(value));
        };
        return apply_code(code, value)
            .map(Some)
            .map_err(|source| ResolveError::AliasConversion {
                name: arg.name.to_string(),
                target: alias.target.clone(),
                source,
            });
    }
    if let Some(value) = bound.get(arg.name) {
        return Ok(Some(value.clone()));
    }
    match lookup(source, arg.name, arg.name)? {
        Some(value) => Ok(Some(value)),
        None => fallback(step, arg).map(Some),
    }
}

/// Current example first, then the value source.
fn lookup(
    source: &dyn ValueSource,
    name: &str,
    target: &str,
) -> Result<Option<Value>, ResolveError> {
    if let Some(value) = source.current_example().and_then(|row| row.get(target)) {
        return Ok(Some(value.clone()));
    }
    match source.resolve(target) {
        Ok(value) => Ok(Some(value)),
        Err(LookupError::NotFound(_)) => Ok(None),
        Err(LookupError::Failed(reason)) => Err(ResolveError::Lookup {
            name: name.to_string(),
            target: target.to_string(),
            reason,
        }),
    }
}

fn fallback(step: &Step, arg: &StepArg) -> Result<Value, ResolveError> {
    arg.default
        .map(|default| default())
        .ok_or_else(|| ResolveError::Unresolved {
            name: arg.name.to_string(),
            step: step.name(),
        })
}
