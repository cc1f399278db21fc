//! Combining example blocks into execution instances.
//!
//! Each example block becomes one [`ParamGroup`]. Scenario blocks come first
//! and are used as written; feature blocks follow with any column that the
//! scenario's own blocks already define removed. Running a scenario means
//! running it once per row of the cross product of its groups.

use std::collections::{HashMap, HashSet};

use bdd_outline_patterns::Value;

use crate::error::ParametrizeError;
use crate::model::{ExampleSet, ScenarioRef};

/// Error type returned by example converters.
pub type ConverterError = Box<dyn std::error::Error + Send + Sync>;

type Converter = Box<dyn Fn(&str) -> Result<Value, ConverterError> + Send + Sync>;

/// Per-parameter converters applied to raw example cells.
///
/// # Examples
/// ```
/// use bdd_outline::{ParametrizeOptions, Value};
///
/// let options = ParametrizeOptions::new()
///     .converter("count", |raw| Ok(Value::Int(raw.parse()?)));
/// assert!(options.has_converter("count"));
/// ```
#[derive(Default)]
pub struct ParametrizeOptions {
    converters: HashMap<String, Converter>,
    builtin_only: bool,
}

impl ParametrizeOptions {
    /// Options with no converters; every cell stays a string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `convert` for the parameter `name`, replacing any earlier one.
    #[must_use]
    pub fn converter<F>(mut self, name: impl Into<String>, convert: F) -> Self
    where
        F: Fn(&str) -> Result<Value, ConverterError> + Send + Sync + 'static,
    {
        self.converters.insert(name.into(), Box::new(convert));
        self
    }

    /// Keep the raw string whenever a converter produces an opaque value.
    #[must_use]
    pub fn builtin_only(mut self, enabled: bool) -> Self {
        self.builtin_only = enabled;
        self
    }

    /// Whether a converter is registered for `name`.
    #[must_use]
    pub fn has_converter(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    fn convert(&self, name: &str, raw: &str) -> Result<Value, ParametrizeError> {
        let Some(convert) = self.converters.get(name) else {
            return Ok(Value::from(raw));
        };
        let value = convert(raw).map_err(|source| ParametrizeError {
            name: name.to_string(),
            raw: raw.to_string(),
            source,
        })?;
        if self.builtin_only && !value.is_builtin() {
            return Ok(Value::from(raw));
        }
        Ok(value)
    }
}

impl std::fmt::Debug for ParametrizeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.converters.keys().collect();
        names.sort_unstable();
        f.debug_struct("ParametrizeOptions")
            .field("converters", &names)
            .field("builtin_only", &self.builtin_only)
            .finish()
    }
}

/// Where an example block was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExampleScope {
    /// Below the scenario.
    Scenario,
    /// At feature level, before the first scenario.
    Feature,
}

/// Converted rows of one example block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParamGroup {
    scope: ExampleScope,
    line: usize,
    names: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ParamGroup {
    /// Scope of the originating block.
    #[must_use]
    pub fn scope(&self) -> ExampleScope {
        self.scope
    }

    /// Line of the originating `Examples:` declaration.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Converted value rows aligned to [`names`](Self::names).
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

/// One execution instance: ordered parameter names with their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleRow(Vec<(String, Value)>);

impl ExampleRow {
    /// Value bound to `name`; the last binding wins if a name repeats.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Parameter names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Bindings in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a binding.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.push((name.into(), value.into()));
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for ExampleRow {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ExampleRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// The parameter groups of one scenario.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Parametrization {
    groups: Vec<ParamGroup>,
}

impl Parametrization {
    /// Groups in order: scenario blocks, then feature blocks.
    #[must_use]
    pub fn groups(&self) -> &[ParamGroup] {
        &self.groups
    }

    /// Whether the scenario has no example data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Cross product of all group rows.
    ///
    /// Earlier groups vary slowest. With no groups there is exactly one
    /// empty instance.
    ///
    /// # Examples
    /// ```
    /// use bdd_outline::{ParametrizeOptions, parse_feature_str};
    ///
    /// let feature = parse_feature_str(
    ///     "Feature: F\n\
    ///      Scenario: S\n\
    ///      Given <a> and <b>\n\
    ///      Examples:\n\
    ///      | a |\n\
    ///      | 1 |\n\
    ///      | 2 |\n\
    ///      Examples:\n\
    ///      | b |\n\
    ///      | x |\n\
    ///      | y |\n",
    /// )
    /// .unwrap();
    /// let scenario = feature.scenario("S").unwrap();
    /// let instances = scenario
    ///     .parametrization(&ParametrizeOptions::new())
    ///     .unwrap()
    ///     .instances();
    /// assert_eq!(instances.len(), 4);
    /// ```
    #[must_use]
    pub fn instances(&self) -> Vec<ExampleRow> {
        self.groups
            .iter()
            .fold(vec![ExampleRow::default()], |instances, group| {
                instances
                    .iter()
                    .flat_map(|prefix| {
                        group.rows.iter().map(move |row| {
                            let mut instance = prefix.clone();
                            for (name, value) in group.names.iter().zip(row) {
                                instance.push(name.clone(), value.clone());
                            }
                            instance
                        })
                    })
                    .collect()
            })
    }
}

impl ScenarioRef<'_> {
    /// Build the parameter groups for this scenario.
    ///
    /// # Errors
    /// Returns [`ParametrizeError`] when a registered converter rejects a
    /// cell.
    pub fn parametrization(
        &self,
        options: &ParametrizeOptions,
    ) -> Result<Parametrization, ParametrizeError> {
        let own = self.scenario().examples();
        let shadowed: HashSet<&str> = own
            .iter()
            .flat_map(|block| block.names().iter().map(String::as_str))
            .collect();
        let mut groups = Vec::new();
        for block in own {
            let keep: Vec<usize> = (0..block.names().len()).collect();
            groups.extend(convert_block(ExampleScope::Scenario, block, &keep, options)?);
        }
        for block in self.feature().examples() {
            let keep: Vec<usize> = block
                .names()
                .iter()
                .enumerate()
                .filter(|(_, name)| !shadowed.contains(name.as_str()))
                .map(|(idx, _)| idx)
                .collect();
            if keep.is_empty() {
                continue;
            }
            groups.extend(convert_block(ExampleScope::Feature, block, &keep, options)?);
        }
        Ok(Parametrization { groups })
    }
}

/// Convert the `keep` columns of `block`; blocks without rows yield nothing.
fn convert_block(
    scope: ExampleScope,
    block: &ExampleSet,
    keep: &[usize],
    options: &ParametrizeOptions,
) -> Result<Option<ParamGroup>, ParametrizeError> {
    let names: Vec<String> = keep
        .iter()
        .filter_map(|idx| block.names().get(*idx).cloned())
        .collect();
    let rows = block
        .rows()
        .iter()
        .map(|row| {
            keep.iter()
                .filter_map(|idx| row.get(*idx))
                .zip(&names)
                .map(|(raw, name)| options.convert(name, raw))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(ParamGroup {
        scope,
        line: block.line(),
        names,
        rows,
    }))
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests parse known-good documents")]
mod tests {
    use super::*;
    use crate::model::Feature;
    use crate::parse_feature_str;
    use rstest::{fixture, rstest};

    #[fixture]
    fn layered() -> Feature {
        parse_feature_str(
            "Feature: F\n\
             \x20 Examples:\n\
             \x20   | shared | extra |\n\
             \x20   | f1     | e1    |\n\
             \x20 Scenario: S\n\
             \x20   Given <shared> and <extra> and <own>\n\
             \x20   Examples:\n\
             \x20     | shared | own |\n\
             \x20     | s1     | o1  |\n\
             \x20     | s2     | o2  |\n",
        )
        .expect("document should parse")
    }

    #[rstest]
    fn scenario_columns_shadow_feature_columns(layered: Feature) {
        let scenario = layered.scenario("S").expect("scenario should exist");
        let params = scenario
            .parametrization(&ParametrizeOptions::new())
            .expect("no converters can fail");
        let groups = params.groups();
        assert_eq!(groups.len(), 2);
        let names: Vec<_> = groups.iter().map(ParamGroup::names).collect();
        assert_eq!(names, [&["shared", "own"][..], &["extra"][..]]);
        let scopes: Vec<_> = groups.iter().map(ParamGroup::scope).collect();
        assert_eq!(scopes, [ExampleScope::Scenario, ExampleScope::Feature]);
    }

    #[rstest]
    fn instances_vary_scenario_groups_slowest(layered: Feature) {
        let scenario = layered.scenario("S").expect("scenario should exist");
        let instances = scenario
            .parametrization(&ParametrizeOptions::new())
            .expect("no converters can fail")
            .instances();
        let rendered: Vec<Vec<(&str, String)>> = instances
            .iter()
            .map(|row| row.iter().map(|(k, v)| (k, v.to_string())).collect())
            .collect();
        assert_eq!(
            rendered,
            vec![
                vec![
                    ("shared", "s1".to_string()),
                    ("own", "o1".to_string()),
                    ("extra", "e1".to_string())
                ],
                vec![
                    ("shared", "s2".to_string()),
                    ("own", "o2".to_string()),
                    ("extra", "e1".to_string())
                ],
            ]
        );
    }

    #[test]
    fn fully_shadowed_feature_block_is_omitted() {
        let feature = parse_feature_str(
            "Feature: F\n\
             Examples:\n\
             | a |\n\
             | 1 |\n\
             Scenario: S\n\
             Given <a>\n\
             Examples:\n\
             | a |\n\
             | 2 |\n",
        )
        .expect("document should parse");
        let scenario = feature.scenario("S").expect("scenario should exist");
        let params = scenario
            .parametrization(&ParametrizeOptions::new())
            .expect("no converters can fail");
        assert_eq!(params.groups().len(), 1);
        let instances = params.instances();
        assert_eq!(instances.len(), 1);
        assert_eq!(
            instances.first().and_then(|row| row.get("a")),
            Some(&Value::from("2"))
        );
    }

    #[test]
    fn two_blocks_of_two_rows_yield_four_instances() {
        let feature = parse_feature_str(
            "Feature: F\n\
             Scenario: S\n\
             Given <v1> <v2> <v3> <v4>\n\
             Examples: Vertical\n\
             | v1 | a | b |\n\
             | v2 | c | d |\n\
             Examples: Vertical\n\
             | v3 | e | f |\n\
             | v4 | g | h |\n",
        )
        .expect("document should parse");
        let scenario = feature.scenario("S").expect("scenario should exist");
        let instances = scenario
            .parametrization(&ParametrizeOptions::new())
            .expect("no converters can fail")
            .instances();
        let firsts: Vec<_> = instances
            .iter()
            .map(|row| (row.get("v1").cloned(), row.get("v3").cloned()))
            .collect();
        assert_eq!(
            firsts,
            vec![
                (Some(Value::from("a")), Some(Value::from("e"))),
                (Some(Value::from("a")), Some(Value::from("f"))),
                (Some(Value::from("b")), Some(Value::from("e"))),
                (Some(Value::from("b")), Some(Value::from("f"))),
            ]
        );
    }

    #[test]
    fn scenario_without_examples_has_one_empty_instance() {
        let feature =
            parse_feature_str("Feature: F\nScenario: S\nGiven x\n").expect("document should parse");
        let scenario = feature.scenario("S").expect("scenario should exist");
        let params = scenario
            .parametrization(&ParametrizeOptions::new())
            .expect("no converters can fail");
        assert!(params.is_empty());
        assert_eq!(params.instances(), vec![ExampleRow::default()]);
    }

    #[test]
    fn vertical_block_without_values_is_omitted() {
        let feature = parse_feature_str(
            "Feature: F\nScenario: S\nGiven <a>\nExamples: Vertical\n| a |\n",
        )
        .expect("document should parse");
        let scenario = feature.scenario("S").expect("scenario should exist");
        let params = scenario
            .parametrization(&ParametrizeOptions::new())
            .expect("no converters can fail");
        assert!(params.is_empty());
    }

    #[fixture]
    fn counted() -> Feature {
        parse_feature_str(
            "Feature: F\nScenario: S\nGiven <n>\nExamples:\n| n | label |\n| 3 | x |\n",
        )
        .expect("document should parse")
    }

    #[rstest]
    fn converters_apply_per_column(counted: Feature) {
        let options =
            ParametrizeOptions::new().converter("n", |raw| Ok(Value::Int(raw.parse()?)));
        let scenario = counted.scenario("S").expect("scenario should exist");
        let instances = scenario
            .parametrization(&options)
            .expect("converter accepts the cell")
            .instances();
        let row = instances.first().expect("one instance");
        assert_eq!(row.get("n"), Some(&Value::Int(3)));
        assert_eq!(row.get("label"), Some(&Value::from("x")));
    }

    #[rstest]
    fn converter_failure_names_the_column(counted: Feature) {
        let options =
            ParametrizeOptions::new().converter("label", |raw| Ok(Value::Int(raw.parse()?)));
        let scenario = counted.scenario("S").expect("scenario should exist");
        let err = scenario
            .parametrization(&options)
            .expect_err("`x` is not an integer");
        assert_eq!(err.name, "label");
        assert_eq!(err.raw, "x");
    }

    #[rstest]
    #[case::builtin_only(true, None)]
    #[case::opaque_allowed(false, Some(3))]
    fn builtin_only_discards_opaque_values(
        counted: Feature,
        #[case] builtin_only: bool,
        #[case] opaque: Option<u8>,
    ) {
        let options = ParametrizeOptions::new()
            .converter("n", |_| Ok(Value::opaque(3_u8)))
            .builtin_only(builtin_only);
        let scenario = counted.scenario("S").expect("scenario should exist");
        let instances = scenario
            .parametrization(&options)
            .expect("converter accepts the cell")
            .instances();
        let value = instances
            .first()
            .and_then(|row| row.get("n"))
            .expect("n is bound");
        assert_eq!(value.downcast_ref::<u8>().copied(), opaque);
        assert_eq!(value.is_builtin(), builtin_only);
    }
}
