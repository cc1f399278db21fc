//! Scenario and background entities.

use std::collections::BTreeSet;

use super::{ExampleSet, Feature, Step, Tags};

/// A scenario as written in the document.
///
/// The owning [`Feature`] is not stored; use [`ScenarioRef`] to reach the
/// background steps and feature tags.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Scenario {
    pub(crate) name: String,
    pub(crate) line: usize,
    pub(crate) keyword: String,
    pub(crate) tags: Tags,
    pub(crate) description: String,
    pub(crate) steps: Vec<Step>,
    pub(crate) examples: Vec<ExampleSet>,
}

impl Scenario {
    pub(crate) fn new(name: &str, keyword: &str, line: usize, tags: Tags) -> Self {
        Self {
            name: name.to_string(),
            line,
            keyword: keyword.to_string(),
            tags,
            description: String::new(),
            steps: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Scenario name; unique within the feature.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line of the declaration.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// `Scenario` or `Scenario Outline`.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Tags written directly above the declaration.
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Free text between the declaration and the first step.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Steps declared by the scenario itself, without background steps.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Example blocks at scenario scope.
    #[must_use]
    pub fn examples(&self) -> &[ExampleSet] {
        &self.examples
    }
}

/// Steps shared by every scenario of a feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Background {
    pub(crate) line: usize,
    pub(crate) description: String,
    pub(crate) steps: Vec<Step>,
}

impl Background {
    pub(crate) fn new(line: usize) -> Self {
        Self {
            line,
            description: String::new(),
            steps: Vec::new(),
        }
    }

    /// Line of the declaration.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Free text between the declaration and the first step.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Background steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// A scenario together with the feature it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioRef<'a> {
    pub(crate) feature: &'a Feature,
    pub(crate) scenario: &'a Scenario,
}

impl<'a> ScenarioRef<'a> {
    /// Owning feature.
    #[must_use]
    pub fn feature(&self) -> &'a Feature {
        self.feature
    }

    /// The scenario itself.
    #[must_use]
    pub fn scenario(&self) -> &'a Scenario {
        self.scenario
    }

    /// Scenario name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.scenario.name
    }

    /// Background steps followed by the scenario's own steps.
    pub fn effective_steps(&self) -> impl Iterator<Item = &'a Step> + use<'a> {
        self.feature
            .background()
            .map(Background::steps)
            .unwrap_or_default()
            .iter()
            .chain(self.scenario.steps.iter())
    }

    /// Union of the scenario's own tags and the feature tags.
    ///
    /// # Examples
    /// ```
    /// use bdd_outline::parse_feature_str;
    ///
    /// let feature = parse_feature_str(
    ///     "@billing\nFeature: F\n@smoke\nScenario: S\nGiven x\n",
    /// )
    /// .unwrap();
    /// let tags = feature.scenario("S").unwrap().effective_tags();
    /// assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["billing", "smoke"]);
    /// ```
    #[must_use]
    pub fn effective_tags(&self) -> BTreeSet<&'a str> {
        self.scenario
            .tags
            .iter()
            .chain(self.feature.tags().iter())
            .map(String::as_str)
            .collect()
    }
}
