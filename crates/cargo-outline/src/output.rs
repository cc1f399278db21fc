//! Helpers for rendering command output.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use bdd_outline::{ExampleRow, Feature};
use eyre::{Context, Result};
use serde::Serialize;

/// Instances of one scenario, as printed by `params --json`.
#[derive(Serialize)]
pub(crate) struct ScenarioInstances<'a> {
    pub scenario: &'a str,
    pub line: usize,
    pub instances: Vec<ExampleRow>,
}

pub(crate) fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).wrap_err("failed to serialize JSON output")?;
    writeln!(writer).wrap_err("failed to terminate JSON output with newline")
}

pub(crate) fn write_features(writer: &mut dyn Write, features: &[Feature]) -> Result<()> {
    write_json(writer, features)
}

pub(crate) fn write_check_ok(writer: &mut dyn Write, path: &Path, scenarios: usize) -> Result<()> {
    writeln!(writer, "ok {} ({scenarios} scenario(s))", path.display())
        .wrap_err_with(|| format!("failed to write status for {}", path.display()))
}

pub(crate) fn write_check_failure(
    writer: &mut dyn Write,
    path: &Path,
    error: &dyn Display,
) -> Result<()> {
    let indented = error.to_string().replace('\n', "\n    ");
    writeln!(writer, "FAILED {}\n    {indented}", path.display())
        .wrap_err_with(|| format!("failed to write status for {}", path.display()))
}

pub(crate) fn write_check_summary(writer: &mut dyn Write, checked: usize, failed: usize) -> Result<()> {
    writeln!(writer, "{checked} feature file(s) checked, {failed} failed")
        .wrap_err("failed to write check summary")
}

pub(crate) fn write_instances(writer: &mut dyn Write, scenario: &ScenarioInstances<'_>) -> Result<()> {
    writeln!(
        writer,
        "{} (line {}): {} instance(s)",
        scenario.scenario,
        scenario.line,
        scenario.instances.len()
    )
    .wrap_err_with(|| format!("failed to write instances of {}", scenario.scenario))?;
    for row in &scenario.instances {
        writeln!(writer, "  {}", format_row(row))
            .wrap_err_with(|| format!("failed to write instances of {}", scenario.scenario))?;
    }
    Ok(())
}

fn format_row(row: &ExampleRow) -> String {
    if row.is_empty() {
        return "(no parameters)".to_string();
    }
    row.iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdd_outline::Value;

    fn rendered(write: impl FnOnce(&mut dyn Write) -> Result<()>) -> eyre::Result<String> {
        let mut buffer = Vec::new();
        write(&mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn instances_list_bindings_in_column_order() -> eyre::Result<()> {
        let mut row = ExampleRow::default();
        row.push("plan", "pro");
        row.push("seats", Value::Int(3));
        let scenario = ScenarioInstances {
            scenario: "Upgrade",
            line: 4,
            instances: vec![row, ExampleRow::default()],
        };
        let text = rendered(|w| write_instances(w, &scenario))?;
        assert_eq!(
            text,
            "Upgrade (line 4): 2 instance(s)\n  plan=pro, seats=3\n  (no parameters)\n"
        );
        Ok(())
    }

    #[test]
    fn failures_indent_multi_line_messages() -> eyre::Result<()> {
        let text = rendered(|w| write_check_failure(w, Path::new("a.feature"), &"first\nsecond"))?;
        assert_eq!(text, "FAILED a.feature\n    first\n    second\n");
        Ok(())
    }

    #[test]
    fn json_rows_are_objects() -> eyre::Result<()> {
        let mut row = ExampleRow::default();
        row.push("n", Value::Int(1));
        let scenario = ScenarioInstances {
            scenario: "S",
            line: 2,
            instances: vec![row],
        };
        let text = rendered(|w| write_json(w, &[scenario]))?;
        let parsed: serde_json::Value = serde_json::from_str(&text)?;
        let n = parsed
            .pointer("/0/instances/0/n")
            .ok_or_else(|| eyre::eyre!("missing binding"))?;
        assert_eq!(n, &serde_json::Value::from(1));
        Ok(())
    }
}
