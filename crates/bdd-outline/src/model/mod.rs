//! Parsed document tree.
//!
//! The tree is built once by the parser and is read-only afterwards. Lookups
//! that need both a scenario and its feature go through [`ScenarioRef`].

mod examples;
mod scenario;
mod step;

use std::collections::{BTreeSet, HashMap};
use std::ops::Deref;
use std::path::{Path, PathBuf};

pub use examples::{ExampleSet, Orientation};
pub use scenario::{Background, Scenario, ScenarioRef};
pub use step::Step;

/// Set of tag names, `@` stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// Whether the set contains `tag`.
    #[must_use]
    pub fn has(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }
}

impl Deref for Tags {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BTreeSet<String>> for Tags {
    fn from(value: BTreeSet<String>) -> Self {
        Self(value)
    }
}

impl IntoIterator for Tags {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Insertion-ordered scenarios keyed by name.
///
/// Inserting a name that already exists replaces the earlier scenario in
/// place, keeping its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMap {
    scenarios: Vec<Scenario>,
    index: HashMap<String, usize>,
}

impl ScenarioMap {
    pub(crate) fn insert(&mut self, scenario: Scenario) -> Option<Scenario> {
        if let Some(slot) = self
            .index
            .get(&scenario.name)
            .and_then(|idx| self.scenarios.get_mut(*idx))
        {
            return Some(std::mem::replace(slot, scenario));
        }
        self.index
            .insert(scenario.name.clone(), self.scenarios.len());
        self.scenarios.push(scenario);
        None
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Scenario> {
        let idx = *self.index.get(name)?;
        self.scenarios.get_mut(idx)
    }

    /// Scenario by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.index
            .get(name)
            .and_then(|idx| self.scenarios.get(*idx))
    }

    /// Scenarios in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the feature has no scenarios.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl<'a> IntoIterator for &'a ScenarioMap {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ScenarioMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.scenarios)
    }
}

/// A parsed feature document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Feature {
    pub(crate) name: Option<String>,
    pub(crate) tags: Tags,
    pub(crate) description: String,
    pub(crate) path: PathBuf,
    pub(crate) rel_path: PathBuf,
    pub(crate) line: usize,
    pub(crate) scenarios: ScenarioMap,
    pub(crate) background: Option<Background>,
    pub(crate) examples: Vec<ExampleSet>,
}

impl Feature {
    /// Feature name, if a `Feature:` line was present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Tags written directly above the `Feature:` line.
    #[must_use]
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Lines following the `Feature:` line, joined and trimmed.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Absolute path of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the parent of the base directory.
    #[must_use]
    pub fn rel_path(&self) -> &Path {
        &self.rel_path
    }

    /// Line of the `Feature:` declaration.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Every scenario in declaration order.
    #[must_use]
    pub fn scenarios(&self) -> &ScenarioMap {
        &self.scenarios
    }

    /// Look up a scenario by name.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<ScenarioRef<'_>> {
        self.scenarios.get(name).map(|scenario| ScenarioRef {
            feature: self,
            scenario,
        })
    }

    /// Iterate scenarios paired with this feature.
    pub fn scenario_refs(&self) -> impl Iterator<Item = ScenarioRef<'_>> {
        self.scenarios.iter().map(|scenario| ScenarioRef {
            feature: self,
            scenario,
        })
    }

    /// The background, if declared.
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Example blocks at feature scope.
    #[must_use]
    pub fn examples(&self) -> &[ExampleSet] {
        &self.examples
    }

    /// Path as shown in diagnostics; a placeholder for in-memory documents.
    pub(crate) fn path_label(&self) -> String {
        if self.path.as_os_str().is_empty() {
            crate::parser::IN_MEMORY_PATH.to_string()
        } else {
            self.path.display().to_string()
        }
    }

    /// Render the feature as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns the serializer error; the model itself always serializes.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
