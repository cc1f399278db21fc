//! Outline-style feature documents with typed example parameters.
//!
//! `bdd-outline` parses Gherkin-flavoured feature files into an immutable
//! tree of features, scenarios and steps. Step text may embed parameters
//! (`<name>`, `<name.codes:literal>`) whose values come from example
//! tables, conversion codes or injected fixtures. Example tables are
//! combined into execution instances, validated against the parameters
//! their steps use, and fed through a step registry that resolves each
//! step's arguments before calling it. Step definitions are named either by
//! their exact step text or by a pattern with `{name}` placeholders whose
//! captures become arguments.
//!
//! ```
//! use bdd_outline::{ParametrizeOptions, parse_feature_str};
//!
//! let feature = parse_feature_str(
//!     "Feature: Cart\n\
//!      Scenario: Add\n\
//!      Given a cart with <count> items\n\
//!      Examples:\n\
//!      | count |\n\
//!      | 1     |\n\
//!      | 2     |\n",
//! )
//! .unwrap();
//! let scenario = feature.scenario("Add").unwrap();
//! scenario.validate().unwrap();
//! let instances = scenario
//!     .parametrization(&ParametrizeOptions::new())
//!     .unwrap()
//!     .instances();
//! assert_eq!(instances.len(), 2);
//! ```

pub use inventory::submit;

mod cache;
mod combinator;
pub mod config;
mod error;
pub mod execution;
mod hooks;
mod model;
mod parser;
mod registry;
mod resolver;
mod source;
mod validation;

pub use bdd_outline_patterns::{
    AliasParam, Capture, ConstantParam, ConversionError, ParamError, PatternError, StepPattern,
    StepType, Value,
};
pub use cache::{FeatureCache, feature_cache};
pub use combinator::{
    ConverterError, ExampleRow, ExampleScope, ParamGroup, ParametrizeOptions, Parametrization,
};
pub use error::{
    ExampleTableError, ParametrizeError, ParseError, RegistryError, ResolveError, StepError,
    StructuralError, ValidationError,
};
pub use execution::{ExecutionContext, ExecutionError, ScenarioRunner, StepOutcome, StepReport};
pub use hooks::{NoHooks, ScenarioHooks};
pub use model::{
    Background, ExampleSet, Feature, Orientation, Scenario, ScenarioMap, ScenarioRef, Step, Tags,
};
pub use parser::{IN_MEMORY_PATH, parse_feature, parse_feature_str};
pub use registry::{
    StepDefinition, StepFn, StepMatch, StepRegistry, find_step, lookup, registry, reset_registry,
};
pub use resolver::{
    DOCSTRING_ARG, StepArg, StepArguments, resolve_arguments, resolve_bound_arguments,
    step_bindings,
};
pub use source::{LookupError, MapValueSource, ValueSource};
