//! Command dispatch for the `cargo outline` entrypoint.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use bdd_outline::{Feature, ParametrizeOptions, parse_feature};
use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result, bail};
use regex::Regex;
use tracing::{info, warn};

use crate::config::LogLevel;
use crate::discovery::{feature_files, split};
use crate::output::{
    ScenarioInstances, write_check_failure, write_check_ok, write_check_summary, write_features,
    write_instances, write_json,
};

/// Parse, validate and inspect bdd-outline feature documents.
#[derive(Parser, Debug)]
#[command(name = "cargo-outline", bin_name = "cargo outline", author, version, about)]
pub(crate) struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported commands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Parse feature documents and print them as JSON.
    Parse(PathsArgs),
    /// Parse feature documents and validate the examples of every scenario.
    Check(PathsArgs),
    /// Print the execution instances of the scenarios in one document.
    Params(ParamsArgs),
}

#[derive(Args, Debug)]
pub(crate) struct PathsArgs {
    /// Feature files, or directories searched for `*.feature` files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ParamsArgs {
    /// Feature file to inspect.
    pub file: PathBuf,
    /// Only scenarios whose name matches this regular expression.
    #[arg(long)]
    pub scenario: Option<Regex>,
    /// Emit JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,
}

/// Whether a command found problems in its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Success,
    Failed,
}

/// Drop the subcommand name cargo passes when invoked as `cargo outline`.
pub(crate) fn cargo_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().collect();
    if args.get(1).is_some_and(|arg| arg == "outline") {
        args.remove(1);
    }
    args
}

pub(crate) fn run(command: Commands, out: &mut dyn Write) -> Result<Status> {
    let status = match command {
        Commands::Parse(args) => handle_parse(&args, out)?,
        Commands::Check(args) => handle_check(&args, out)?,
        Commands::Params(args) => handle_params(&args, out)?,
    };
    out.flush().wrap_err("failed to flush command output")?;
    Ok(status)
}

fn load(path: &Path) -> Result<Feature> {
    let (base_dir, filename) = split(path);
    parse_feature(base_dir, filename).wrap_err_with(|| format!("failed to parse {}", path.display()))
}

fn handle_parse(args: &PathsArgs, out: &mut dyn Write) -> Result<Status> {
    let features = feature_files(&args.paths)?
        .iter()
        .map(|path| load(path))
        .collect::<Result<Vec<_>>>()?;
    info!(count = features.len(), "parsed feature documents");
    write_features(out, &features)?;
    Ok(Status::Success)
}

fn handle_check(args: &PathsArgs, out: &mut dyn Write) -> Result<Status> {
    let files = feature_files(&args.paths)?;
    let mut failed = 0_usize;
    for path in &files {
        let (base_dir, filename) = split(path);
        let feature = match parse_feature(base_dir, filename) {
            Ok(feature) => feature,
            Err(err) => {
                failed += 1;
                write_check_failure(out, path, &err)?;
                continue;
            }
        };
        let invalid: Vec<_> = feature
            .scenario_refs()
            .filter_map(|scenario| scenario.validate().err())
            .collect();
        if invalid.is_empty() {
            write_check_ok(out, path, feature.scenarios().len())?;
        } else {
            failed += 1;
            for err in &invalid {
                write_check_failure(out, path, err)?;
            }
        }
    }
    write_check_summary(out, files.len(), failed)?;
    Ok(if failed == 0 {
        Status::Success
    } else {
        Status::Failed
    })
}

fn handle_params(args: &ParamsArgs, out: &mut dyn Write) -> Result<Status> {
    let feature = load(&args.file)?;
    let options = ParametrizeOptions::new();
    let mut reports = Vec::new();
    for scenario in feature.scenario_refs() {
        if args
            .scenario
            .as_ref()
            .is_some_and(|filter| !filter.is_match(scenario.name()))
        {
            continue;
        }
        if let Err(err) = scenario.validate() {
            warn!(scenario = scenario.name(), "{err}");
        }
        let instances = scenario
            .parametrization(&options)
            .wrap_err_with(|| format!("failed to parametrize {:?}", scenario.name()))?
            .instances();
        reports.push(ScenarioInstances {
            scenario: scenario.name(),
            line: scenario.scenario().line(),
            instances,
        });
    }
    if reports.is_empty() {
        bail!("no scenario in {} matches the filter", args.file.display());
    }
    if args.json {
        write_json(out, &reports)?;
    } else {
        reports
            .iter()
            .try_for_each(|report| write_instances(out, report))?;
    }
    Ok(Status::Success)
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests write fixture documents")]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn docs() -> TempDir {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            dir.path().join("good.feature"),
            "Feature: Good\n  Scenario: Add <n>\n    Given <n> items\n    Examples:\n    | n |\n    | 1 |\n    | 2 |\n",
        )
        .expect("write good feature");
        std::fs::write(
            dir.path().join("bad.feature"),
            "Feature: Bad\n  Scenario: Mismatch\n    Given <n> items\n    Examples:\n    | m |\n    | 1 |\n",
        )
        .expect("write bad feature");
        dir
    }

    fn run_to_string(command: Commands) -> (Status, String) {
        let mut out = Vec::new();
        let status = run(command, &mut out).expect("command runs");
        (status, String::from_utf8(out).expect("utf8 output"))
    }

    #[rstest]
    #[case(&["cargo-outline", "outline", "check", "x"], &["cargo-outline", "check", "x"])]
    #[case(&["cargo-outline", "check", "x"], &["cargo-outline", "check", "x"])]
    fn strips_cargo_subcommand_name(#[case] raw: &[&str], #[case] expected: &[&str]) {
        let args = cargo_args(raw.iter().map(OsString::from));
        let expected: Vec<OsString> = expected.iter().map(OsString::from).collect();
        assert_eq!(args, expected);
    }

    #[rstest]
    fn check_reports_each_file(docs: TempDir) {
        let (status, text) = run_to_string(Commands::Check(PathsArgs {
            paths: vec![docs.path().to_path_buf()],
        }));
        assert_eq!(status, Status::Failed);
        assert!(text.contains("FAILED"));
        assert!(text.contains("bad.feature"));
        assert!(text.contains("good.feature (1 scenario(s))"));
        assert!(text.ends_with("2 feature file(s) checked, 1 failed\n"));
    }

    #[rstest]
    fn params_filters_scenarios(docs: TempDir) {
        let (status, text) = run_to_string(Commands::Params(ParamsArgs {
            file: docs.path().join("good.feature"),
            scenario: Some(Regex::new("^Add").expect("valid regex")),
            json: false,
        }));
        assert_eq!(status, Status::Success);
        assert_eq!(text, "Add <n> (line 2): 2 instance(s)\n  n=1\n  n=2\n");
    }

    #[rstest]
    fn params_without_matches_is_an_error(docs: TempDir) {
        let err = run(
            Commands::Params(ParamsArgs {
                file: docs.path().join("good.feature"),
                scenario: Some(Regex::new("^Remove").expect("valid regex")),
                json: false,
            }),
            &mut Vec::new(),
        )
        .expect_err("nothing matches");
        assert!(err.to_string().starts_with("no scenario in"));
    }

    #[rstest]
    fn parse_prints_a_json_array(docs: TempDir) {
        let (status, text) = run_to_string(Commands::Parse(PathsArgs {
            paths: vec![docs.path().join("good.feature")],
        }));
        assert_eq!(status, Status::Success);
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert_eq!(
            parsed.pointer("/0/name"),
            Some(&serde_json::Value::from("Good"))
        );
    }
}
