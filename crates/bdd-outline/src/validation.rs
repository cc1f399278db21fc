//! Checking that step parameters are covered by example columns.

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::model::{ExampleSet, ScenarioRef};

impl<'a> ScenarioRef<'a> {
    /// Parameters used by the effective steps: general `<name>` tokens plus
    /// alias targets.
    #[must_use]
    pub fn step_params(&self) -> BTreeSet<&'a str> {
        self.effective_steps().flat_map(|step| step.params()).collect()
    }

    /// Column names of the scenario's own and the feature's example blocks.
    ///
    /// Alias targets are not included, so an alias resolved from a fixture
    /// still needs a column once the scenario has examples.
    #[must_use]
    pub fn example_params(&self) -> BTreeSet<&'a str> {
        self.scenario()
            .examples()
            .iter()
            .chain(self.feature().examples())
            .flat_map(ExampleSet::names)
            .map(String::as_str)
            .collect()
    }

    /// Check that every step parameter has an example column.
    ///
    /// Scenarios without parameters or without examples always validate;
    /// extra example columns are allowed.
    ///
    /// # Errors
    /// Returns [`ValidationError`] listing both parameter sets when a step
    /// parameter is not provided by any example block.
    ///
    /// # Examples
    /// ```
    /// use bdd_outline::parse_feature_str;
    ///
    /// let feature = parse_feature_str(
    ///     "Feature: F\nScenario: S\nGiven <a> and <b>\nExamples:\n| a |\n| 1 |\n",
    /// )
    /// .unwrap();
    /// let err = feature.scenario("S").unwrap().validate().unwrap_err();
    /// assert_eq!(err.missing(), vec!["b"]);
    /// ```
    pub fn validate(&self) -> Result<(), ValidationError> {
        let step_params = self.step_params();
        let example_params = self.example_params();
        if step_params.is_empty()
            || example_params.is_empty()
            || step_params.is_subset(&example_params)
        {
            return Ok(());
        }
        Err(ValidationError::new(
            self.name(),
            &self.feature().path_label(),
            &step_params,
            &example_params,
        ))
    }
}
