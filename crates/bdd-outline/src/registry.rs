//! Step registration and lookup.
//!
//! Definitions are submitted at link time with [`step!`](crate::step) and
//! collected into a process-wide registry on first access. The registry is
//! rebuilt lazily after [`reset_registry`].
//!
//! A definition name without braces matches step text verbatim. A name with
//! `{name}` placeholders is compiled into a [`StepPattern`] whose captures
//! become step arguments.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use bdd_outline_patterns::{Capture, StepPattern, StepType, Value};
use inventory::iter;
use log::{debug, warn};

use crate::error::{RegistryError, StepError};
use crate::resolver::{StepArg, StepArguments};

/// Function pointer executed for a step.
///
/// The returned value, if any, is injected under the definition's
/// [`target`](StepDefinition::target) name.
pub type StepFn = fn(&StepArguments) -> Result<Option<Value>, StepError>;

/// A step implementation registered with the framework.
#[derive(Debug)]
pub struct StepDefinition {
    /// Semantic step type.
    pub step_type: StepType,
    /// Canonical step text, e.g. `I have <count> items`, or a pattern such
    /// as `I have {count:u32} items`.
    pub name: &'static str,
    /// Formal arguments in the order the implementation reads them.
    pub args: &'static [StepArg],
    /// Implementation.
    pub run: StepFn,
    /// Name under which a returned value is injected for later steps.
    pub target: Option<&'static str>,
    /// Source file of the definition.
    pub file: &'static str,
    /// Line within the source file.
    pub line: u32,
}

impl StepDefinition {
    /// `file:line` of the definition.
    #[must_use]
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

/// Register a step definition with the global registry.
///
/// # Forms
///
/// ```ignore
/// step!(StepType::Given, "a cart", handler);
/// step!(StepType::Given, "<count> items", handler, &[StepArg::required("count")]);
/// step!(StepType::When, "checking out", handler, &[], target = "receipt");
/// ```
#[macro_export]
macro_rules! step {
    ($step_type:expr, $name:expr, $handler:path, $args:expr, target = $target:expr $(,)?) => {
        $crate::step!(@submit $step_type, $name, $handler, $args, ::core::option::Option::Some($target));
    };
    ($step_type:expr, $name:expr, $handler:path, $args:expr $(,)?) => {
        $crate::step!(@submit $step_type, $name, $handler, $args, ::core::option::Option::None);
    };
    ($step_type:expr, $name:expr, $handler:path $(,)?) => {
        $crate::step!(@submit $step_type, $name, $handler, &[], ::core::option::Option::None);
    };
    (@submit $step_type:expr, $name:expr, $handler:path, $args:expr, $target:expr) => {
        const _: () = {
            $crate::submit! {
                $crate::StepDefinition {
                    step_type: $step_type,
                    name: $name,
                    args: $args,
                    run: $handler,
                    target: $target,
                    file: file!(),
                    line: line!(),
                }
            }
        };
    };
}

inventory::collect!(StepDefinition);

type StepKey = (StepType, &'static str);

/// A definition matched against step text.
#[derive(Debug, Clone)]
pub struct StepMatch {
    /// The matching definition.
    pub definition: &'static StepDefinition,
    /// Values captured by pattern placeholders; empty for verbatim names.
    pub captures: Vec<Capture<'static>>,
}

/// Snapshot of every submitted definition, keyed by step type and name.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: HashMap<StepKey, &'static StepDefinition>,
    patterns: Vec<(StepPattern<'static>, &'static StepDefinition)>,
    duplicates: Vec<RegistryError>,
    invalid: Vec<RegistryError>,
}

impl StepRegistry {
    /// Collect all submitted definitions.
    ///
    /// When two definitions share a key the first one collected is kept
    /// and the clash is recorded in [`duplicates`](Self::duplicates).
    /// Definitions whose pattern fails to compile are left out and listed
    /// in [`invalid_patterns`](Self::invalid_patterns).
    #[must_use]
    pub fn collect() -> Self {
        Self::from_definitions(iter::<StepDefinition>)
    }

    /// Build a registry from explicit definitions.
    #[must_use]
    pub fn from_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = &'static StepDefinition>,
    {
        let mut registry = Self::default();
        for definition in definitions {
            let key = (definition.step_type, definition.name);
            if let Some(kept) = registry.steps.get(&key) {
                let err = RegistryError::Duplicate {
                    step_type: definition.step_type,
                    name: definition.name.to_string(),
                    kept: kept.location(),
                    duplicate: definition.location(),
                };
                warn!("{err}");
                registry.duplicates.push(err);
                continue;
            }
            if StepPattern::is_pattern(definition.name) {
                match StepPattern::compile(definition.name) {
                    Ok(pattern) => registry.patterns.push((pattern, definition)),
                    Err(source) => {
                        let err = RegistryError::InvalidPattern {
                            step_type: definition.step_type,
                            name: definition.name.to_string(),
                            location: definition.location(),
                            source,
                        };
                        warn!("{err}");
                        registry.invalid.push(err);
                        continue;
                    }
                }
            }
            registry.steps.insert(key, definition);
        }
        registry
            .patterns
            .sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.specificity()));
        debug!(
            "step registry holds {} definition(s), {} of them patterns",
            registry.steps.len(),
            registry.patterns.len()
        );
        registry
    }

    /// Definition registered under exactly `name` for `step_type`.
    #[must_use]
    pub fn get(&self, step_type: StepType, name: &str) -> Option<&'static StepDefinition> {
        self.steps.get(&(step_type, name)).copied()
    }

    /// Definition matching step `text`.
    ///
    /// A verbatim name equal to `text` wins. Otherwise patterns are tried
    /// from most to least specific; among equally specific patterns the
    /// first one collected wins.
    #[must_use]
    pub fn find(&self, step_type: StepType, text: &str) -> Option<StepMatch> {
        if let Some(definition) = self
            .get(step_type, text)
            .filter(|definition| !StepPattern::is_pattern(definition.name))
        {
            return Some(StepMatch {
                definition,
                captures: Vec::new(),
            });
        }
        self.patterns
            .iter()
            .filter(|(_, definition)| definition.step_type == step_type)
            .find_map(|(pattern, definition)| {
                pattern.captures(text).map(|captures| StepMatch {
                    definition,
                    captures,
                })
            })
    }

    /// Every definition, in no particular order.
    pub fn definitions(&self) -> impl Iterator<Item = &'static StepDefinition> + '_ {
        self.steps.values().copied()
    }

    /// Number of distinct definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Clashes found while collecting.
    #[must_use]
    pub fn duplicates(&self) -> &[RegistryError] {
        &self.duplicates
    }

    /// Definitions dropped because their pattern does not compile.
    #[must_use]
    pub fn invalid_patterns(&self) -> &[RegistryError] {
        &self.invalid
    }
}

static REGISTRY: RwLock<Option<Arc<StepRegistry>>> = RwLock::new(None);

/// The process-wide registry, built on first access.
#[must_use]
pub fn registry() -> Arc<StepRegistry> {
    if let Some(registry) = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Arc::clone(registry);
    }
    let mut slot = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slot.get_or_insert_with(|| Arc::new(StepRegistry::collect())))
}

/// Look up a step implementation by its registered name in the
/// process-wide registry.
#[must_use]
pub fn lookup(step_type: StepType, name: &str) -> Option<&'static StepDefinition> {
    registry().get(step_type, name)
}

/// Match step `text` against the process-wide registry.
#[must_use]
pub fn find_step(step_type: StepType, text: &str) -> Option<StepMatch> {
    registry().find(step_type, text)
}

/// Drop the process-wide registry so the next access rebuilds it.
pub fn reset_registry() {
    let previous = REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if previous.is_some() {
        debug!("step registry reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdd_outline_patterns::PatternError;
    use rstest::rstest;
    use serial_test::serial;

    fn noop(args: &StepArguments) -> Result<Option<Value>, StepError> {
        match args.names().next() {
            None => Ok(None),
            Some(name) => Err(StepError::Failed(format!("unexpected argument `{name}`"))),
        }
    }

    fn other_noop(args: &StepArguments) -> Result<Option<Value>, StepError> {
        noop(args).map(|_| Some(Value::Null))
    }

    crate::step!(StepType::Given, "a registered step", noop);

    static FIRST: StepDefinition = StepDefinition {
        step_type: StepType::When,
        name: "clashing",
        args: &[],
        run: noop,
        target: None,
        file: "first.rs",
        line: 1,
    };

    static SECOND: StepDefinition = StepDefinition {
        step_type: StepType::When,
        name: "clashing",
        args: &[],
        run: other_noop,
        target: None,
        file: "second.rs",
        line: 2,
    };

    static THEN: StepDefinition = StepDefinition {
        step_type: StepType::Then,
        name: "clashing",
        args: &[],
        run: noop,
        target: None,
        file: "third.rs",
        line: 3,
    };

    #[test]
    fn first_definition_wins_on_clash() {
        let registry = StepRegistry::from_definitions([&FIRST, &SECOND, &THEN]);
        assert_eq!(registry.len(), 2);
        let kept = registry
            .get(StepType::When, "clashing")
            .map(StepDefinition::location);
        assert_eq!(kept.as_deref(), Some("first.rs:1"));
        assert_eq!(
            registry.duplicates(),
            [RegistryError::Duplicate {
                step_type: StepType::When,
                name: "clashing".into(),
                kept: "first.rs:1".into(),
                duplicate: "second.rs:2".into(),
            }]
        );
    }

    const fn pattern_step(step_type: StepType, name: &'static str, line: u32) -> StepDefinition {
        StepDefinition {
            step_type,
            name,
            args: &[],
            run: noop,
            target: None,
            file: "patterns.rs",
            line,
        }
    }

    static GENERIC: StepDefinition = pattern_step(StepType::Given, "I have {count} {things}", 10);
    static TYPED: StepDefinition = pattern_step(StepType::Given, "I have {count:u32} apples", 11);
    static VERBATIM: StepDefinition = pattern_step(StepType::Given, "I have 3 apples", 12);
    static BROKEN: StepDefinition = pattern_step(StepType::Given, "I have {count apples", 13);

    fn pattern_registry() -> StepRegistry {
        StepRegistry::from_definitions([&GENERIC, &TYPED, &VERBATIM, &BROKEN])
    }

    #[rstest]
    #[case::verbatim_name_wins("I have 3 apples", 12, &[])]
    #[case::most_specific_pattern("I have 4 apples", 11, &[("count", "4")])]
    #[case::generic_pattern("I have 4 pears", 10, &[("count", "4"), ("things", "pears")])]
    fn find_prefers_verbatim_then_specific_patterns(
        #[case] text: &str,
        #[case] line: u32,
        #[case] captured: &[(&str, &str)],
    ) {
        let found = pattern_registry()
            .find(StepType::Given, text)
            .map(|found| {
                let captures: Vec<_> = found
                    .captures
                    .iter()
                    .map(|capture| (capture.name, capture.raw.clone()))
                    .collect();
                (found.definition.line, captures)
            });
        let expected: Vec<_> = captured
            .iter()
            .map(|(name, raw)| (*name, (*raw).to_owned()))
            .collect();
        assert_eq!(found, Some((line, expected)));
    }

    #[test]
    fn patterns_only_match_their_step_type() {
        assert!(pattern_registry().find(StepType::Then, "I have 4 pears").is_none());
    }

    #[test]
    fn invalid_patterns_are_reported_and_skipped() {
        let registry = pattern_registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.invalid_patterns(),
            [RegistryError::InvalidPattern {
                step_type: StepType::Given,
                name: "I have {count apples".into(),
                location: "patterns.rs:13".into(),
                source: PatternError::Unclosed { position: 7 },
            }]
        );
    }

    #[test]
    fn lookup_is_keyed_by_step_type() {
        let registry = StepRegistry::from_definitions([&FIRST]);
        assert!(registry.get(StepType::Given, "clashing").is_none());
        assert!(registry.get(StepType::When, "missing").is_none());
    }

    #[test]
    #[serial]
    fn macro_submissions_reach_the_global_registry() {
        reset_registry();
        let found = lookup(StepType::Given, "a registered step");
        assert!(found.is_some_and(|definition| definition.file.ends_with("registry.rs")));
    }

    #[test]
    #[serial]
    fn reset_rebuilds_on_next_access() {
        let before = registry();
        reset_registry();
        let after = registry();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(&after, &registry()));
    }
}
