//! Where step arguments come from at execution time.
//!
//! The resolver never looks up fixtures itself. A host runner implements
//! [`ValueSource`] over whatever it uses for named values.

use std::collections::HashMap;

use bdd_outline_patterns::Value;
use thiserror::Error;

use crate::combinator::ExampleRow;

/// Failure reported by a [`ValueSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The source has no value under that name.
    #[error("no value named `{0}`")]
    NotFound(String),
    /// The source knows the name but could not produce a value.
    #[error("{0}")]
    Failed(String),
}

/// Named values available to one scenario invocation.
pub trait ValueSource {
    /// Example row the scenario is currently running with, if any.
    fn current_example(&self) -> Option<&ExampleRow>;

    /// Look up a named value such as a fixture.
    ///
    /// # Errors
    /// [`LookupError::NotFound`] when the name is unknown, or
    /// [`LookupError::Failed`] when producing the value failed.
    fn resolve(&self, name: &str) -> Result<Value, LookupError>;
}

/// A [`ValueSource`] backed by a map, with an optional current example.
///
/// # Examples
/// ```
/// use bdd_outline::{MapValueSource, Value, ValueSource};
///
/// let source = MapValueSource::new().with_value("admin", "root");
/// assert_eq!(source.resolve("admin"), Ok(Value::from("root")));
/// assert!(source.resolve("guest").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapValueSource {
    example: Option<ExampleRow>,
    values: HashMap<String, Value>,
}

impl MapValueSource {
    /// An empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set the current example row.
    #[must_use]
    pub fn with_example(mut self, example: ExampleRow) -> Self {
        self.example = Some(example);
        self
    }

    /// Add or replace a named value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }
}

impl ValueSource for MapValueSource {
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
