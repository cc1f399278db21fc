//! Unit tests for the scenario runner.

#![expect(clippy::expect_used, reason = "tests parse known-good documents")]

use std::sync::Mutex;

use super::*;
use crate::combinator::ParametrizeOptions;
use crate::error::StepError;
use crate::model::Feature;
use crate::resolver::{DOCSTRING_ARG, StepArg, StepArguments};
use crate::{config, parse_feature_str};
use bdd_outline_patterns::StepType;
use rstest::{fixture, rstest};
use serial_test::serial;

fn add_items(args: &StepArguments) -> Result<Option<Value>, StepError> {
    let count = args
        .require("count")?
        .as_int()
        .ok_or_else(|| StepError::InvalidArgument {
            name: "count".into(),
            value: format!("{:?}", args.get("count")),
        })?;
    Ok(Some(Value::Int(count)))
}

fn check_total(args: &StepArguments) -> Result<Option<Value>, StepError> {
    let total = args.require("total")?;
    let expected = args.require("expected")?;
    if total.to_string() == expected.to_string() {
        Ok(None)
    } else {
        Err(StepError::Failed(format!("total {total} != {expected}")))
    }
}

fn open_shop(args: &StepArguments) -> Result<Option<Value>, StepError> {
    if args.is_empty() {
        Ok(None)
    } else {
        Err(StepError::Failed("the shop takes no arguments".into()))
    }
}

fn keep_docstring(args: &StepArguments) -> Result<Option<Value>, StepError> {
    args.require(DOCSTRING_ARG).cloned().map(Some)
}

fn deposit_coins(args: &StepArguments) -> Result<Option<Value>, StepError> {
    let total = args.require("total")?.as_int().unwrap_or_default();
    let amount = args
        .require("amount")?
        .as_int()
        .ok_or_else(|| StepError::InvalidArgument {
            name: "amount".into(),
            value: format!("{:?}", args.get("amount")),
        })?;
    Ok(Some(Value::Int(total + amount)))
}

static NOTE: StepDefinition = StepDefinition {
    step_type: StepType::Given,
    name: "a step has a docstring",
    args: &[StepArg::required(DOCSTRING_ARG)],
    run: keep_docstring,
    target: Some("note"),
    file: file!(),
    line: line!(),
};

static DEPOSIT: StepDefinition = StepDefinition {
    step_type: StepType::When,
    name: "I deposit {amount:u32} coins",
    args: &[StepArg::required("total"), StepArg::required("amount")],
    run: deposit_coins,
    target: Some("total"),
    file: file!(),
    line: line!(),
};

static ADD: StepDefinition = StepDefinition {
    step_type: StepType::Given,
    name: "a cart with <count> items",
    args: &[StepArg::required("count")],
    run: add_items,
    target: Some("total"),
    file: file!(),
    line: line!(),
};

static CHECK: StepDefinition = StepDefinition {
    step_type: StepType::Then,
    name: "the total is <expected>",
    args: &[StepArg::required("total"), StepArg::required("expected")],
    run: check_total,
    target: None,
    file: file!(),
    line: line!(),
};

static OPEN: StepDefinition = StepDefinition {
    step_type: StepType::Given,
    name: "an open shop",
    args: &[],
    run: open_shop,
    target: None,
    file: file!(),
    line: line!(),
};

#[fixture]
fn registry() -> Arc<StepRegistry> {
    Arc::new(StepRegistry::from_definitions([
        &ADD, &CHECK, &OPEN, &NOTE, &DEPOSIT,
    ]))
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn push(&self, event: String) {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }

    fn events(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl ScenarioHooks for Recorder {
    fn before_scenario(&self, scenario: ScenarioRef<'_>) {
        self.push(format!("before_scenario {}", scenario.name()));
    }

    fn before_step(&self, _scenario: ScenarioRef<'_>, step: &Step) {
        self.push(format!("before_step {}", step.name()));
    }

    fn before_step_call(
        &self,
        _scenario: ScenarioRef<'_>,
        step: &Step,
        _definition: &StepDefinition,
        args: &StepArguments,
    ) {
        self.push(format!("call {} with {}", step.name(), args.len()));
    }

    fn after_step(
        &self,
        _scenario: ScenarioRef<'_>,
        step: &Step,
        _definition: &StepDefinition,
        _args: &StepArguments,
    ) {
        self.push(format!("after_step {}", step.name()));
    }

    fn after_scenario(&self, scenario: ScenarioRef<'_>) {
        self.push(format!("after_scenario {}", scenario.name()));
    }

    fn step_error(&self, _scenario: ScenarioRef<'_>, step: &Step, _error: &ExecutionError) {
        self.push(format!("step_error {}", step.name()));
    }

    fn step_lookup_error(&self, _scenario: ScenarioRef<'_>, step: &Step, _error: &ExecutionError) {
        self.push(format!("step_lookup_error {}", step.name()));
    }
}

fn parse(text: &str) -> Feature {
    parse_feature_str(text).expect("document should parse")
}

#[rstest]
#[serial]
fn passing_scenario_runs_every_step_with_hooks(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse(
        "Feature: Shop\n\
         Background:\n\
         Given an open shop\n\
         Scenario: Buy\n\
         Given a cart with <count.i:3> items\n\
         Then the total is <expected.i:3>\n",
    );
    let scenario = feature.scenario("Buy").expect("scenario should exist");
    let hooks = Recorder::default();
    let runner = ScenarioRunner::with_registry(&hooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    runner.run(scenario, &mut ctx).expect("scenario passes");

    assert!(ctx.passed());
    assert_eq!(ctx.value("total"), Some(&Value::Int(3)));
    let lines: Vec<_> = ctx.reports().iter().map(|r| r.line).collect();
    assert_eq!(lines, [3, 5, 6]);
    assert_eq!(
        hooks.events(),
        [
            "before_scenario Buy",
            "before_step an open shop",
            "call an open shop with 0",
            "after_step an open shop",
            "before_step a cart with <count> items",
            "call a cart with <count> items with 1",
            "after_step a cart with <count> items",
            "before_step the total is <expected>",
            "call the total is <expected> with 2",
            "after_step the total is <expected>",
            "after_scenario Buy",
        ]
    );
}

#[rstest]
#[serial]
fn missing_step_is_reported_as_lookup_failure(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse("Feature: F\nScenario: S\nGiven an open shop\nWhen nobody knows me\n");
    let scenario = feature.scenario("S").expect("scenario should exist");
    let hooks = Recorder::default();
    let runner = ScenarioRunner::with_registry(&hooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    let err = runner.run(scenario, &mut ctx).expect_err("step is missing");

    assert!(err.is_lookup_failure());
    assert_eq!(err.step_index(), Some(1));
    let outcomes: Vec<_> = ctx.reports().iter().map(|r| r.outcome.clone()).collect();
    assert_eq!(outcomes, [StepOutcome::Passed, StepOutcome::NotFound]);
    let events = hooks.events();
    assert!(events.contains(&"step_lookup_error nobody knows me".to_string()));
    assert!(!events.iter().any(|e| e.starts_with("step_error")));
    assert_eq!(events.last().map(String::as_str), Some("after_scenario S"));
}

#[rstest]
#[serial]
fn failing_handler_stops_the_scenario(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse(
        "Feature: F\n\
         Scenario: S\n\
         Given a cart with <count.i:2> items\n\
         Then the total is <expected.i:5>\n\
         Then the total is <expected.i:2>\n",
    );
    let scenario = feature.scenario("S").expect("scenario should exist");
    let hooks = Recorder::default();
    let runner = ScenarioRunner::with_registry(&hooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    let err = runner.run(scenario, &mut ctx).expect_err("totals differ");

    assert!(matches!(err, ExecutionError::HandlerFailed { index: 1, .. }));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(ctx.reports().len(), 2);
    assert!(hooks.events().contains(&"step_error the total is <expected>".to_string()));
}

#[rstest]
#[serial]
fn unresolved_argument_is_a_step_error(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse("Feature: F\nScenario: S\nGiven a cart with <count> items\n");
    let scenario = feature.scenario("S").expect("scenario should exist");
    let hooks = Recorder::default();
    let runner = ScenarioRunner::with_registry(&hooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    let err = runner.run(scenario, &mut ctx).expect_err("count is unresolved");

    assert!(matches!(err, ExecutionError::Resolve { index: 0, .. }));
    assert!(hooks.events().contains(&"step_error a cart with <count> items".to_string()));
}

#[rstest]
#[serial]
fn example_rows_drive_each_instance(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse(
        "Feature: F\n\
         Scenario Outline: S\n\
         Given a cart with <count> items\n\
         Then the total is <expected>\n\
         Examples:\n\
         | count | expected |\n\
         | 1     | 1        |\n\
         | 4     | 4        |\n",
    );
    let scenario = feature.scenario("S").expect("scenario should exist");
    let options = ParametrizeOptions::new()
        .converter("count", |raw| Ok(Value::Int(raw.parse()?)));
    let runner = ScenarioRunner::with_registry(&crate::hooks::NoHooks, registry);
    let contexts = ExecutionContext::instances(scenario, &options).expect("cells convert");
    assert_eq!(contexts.len(), 2);
    for mut ctx in contexts {
        runner.run(scenario, &mut ctx).expect("instance passes");
        assert_eq!(ctx.value("total"), ctx.example().and_then(|row| row.get("count")));
    }
}

#[rstest]
#[serial]
fn validation_runs_before_any_step(registry: Arc<StepRegistry>) {
    let feature = parse(
        "Feature: F\n\
         Scenario: S\n\
         Given a cart with <count> items\n\
         Then the total is <expected>\n\
         Examples:\n\
         | count |\n\
         | 1     |\n",
    );
    let scenario = feature.scenario("S").expect("scenario should exist");
    let hooks = Recorder::default();
    let runner = ScenarioRunner::with_registry(&hooks, Arc::clone(&registry));

    config::set_validate_on_bind(true);
    let mut ctx = ExecutionContext::new(scenario);
    let err = runner.run(scenario, &mut ctx).expect_err("expected has no column");
    assert!(matches!(err, ExecutionError::Validation(_)));
    assert!(hooks.events().is_empty());

    config::set_validate_on_bind(false);
    let mut ctx = ExecutionContext::new(scenario);
    let err = runner.run(scenario, &mut ctx).expect_err("count is unresolved");
    assert!(matches!(err, ExecutionError::Resolve { .. }));
    config::clear_validate_on_bind_override();
}

#[rstest]
#[serial]
fn docstring_steps_match_on_their_first_line(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse(
        "Feature: F\n\
         Scenario: S\n\
         \x20 Given a step has a docstring\n\
         \x20   \"\"\"\n\
         \x20   This is a given docstring\n\
         \x20   \"\"\"\n\
         \x20 And a cart with <count.i:3> items\n",
    );
    let scenario = feature.scenario("S").expect("scenario should exist");
    let runner = ScenarioRunner::with_registry(&crate::hooks::NoHooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    runner.run(scenario, &mut ctx).expect("docstring step binds");

    assert_eq!(
        ctx.value("note"),
        Some(&Value::from("This is a given docstring"))
    );
    let names: Vec<_> = ctx.reports().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["a step has a docstring", "a cart with <count> items"]);
}

#[rstest]
#[serial]
fn pattern_placeholders_become_arguments(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse(
        "Feature: F\n\
         Scenario: S\n\
         Given a cart with <count.i:3> items\n\
         When I deposit 4 coins\n\
         Then the total is <expected.i:7>\n",
    );
    let scenario = feature.scenario("S").expect("scenario should exist");
    let runner = ScenarioRunner::with_registry(&crate::hooks::NoHooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    runner.run(scenario, &mut ctx).expect("deposit matches its pattern");
    assert_eq!(ctx.value("total"), Some(&Value::Int(7)));
}

#[rstest]
#[serial]
fn oversized_captures_fail_resolution(registry: Arc<StepRegistry>) {
    config::clear_validate_on_bind_override();
    let feature = parse(
        "Feature: F\n\
         Scenario: S\n\
         Given a cart with <count.i:3> items\n\
         When I deposit 99999999999999999999 coins\n",
    );
    let scenario = feature.scenario("S").expect("scenario should exist");
    let runner = ScenarioRunner::with_registry(&crate::hooks::NoHooks, registry);
    let mut ctx = ExecutionContext::new(scenario);
    let err = runner.run(scenario, &mut ctx).expect_err("amount overflows");
    assert!(matches!(
        err,
        ExecutionError::Resolve {
            index: 1,
            error: crate::error::ResolveError::Capture { .. },
            ..
        }
    ));
}
