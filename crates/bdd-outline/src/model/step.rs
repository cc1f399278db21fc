//! Step entity and its multi-line content handling.

use std::collections::{BTreeMap, BTreeSet};

use bdd_outline_patterns::{
    AliasParam, ConstantParam, ParamError, StepType, dedent, general_params, scan_step,
};

const DOCSTRING_MARKER: &str = "\"\"\"";

/// A single step of a scenario or background.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Step {
    pub(crate) step_type: StepType,
    pub(crate) keyword: String,
    pub(crate) text: String,
    pub(crate) lines: Vec<String>,
    pub(crate) canonical: String,
    pub(crate) indent: usize,
    pub(crate) constants: BTreeMap<String, ConstantParam>,
    pub(crate) aliases: BTreeMap<String, AliasParam>,
    pub(crate) line: usize,
}

impl Step {
    /// Build a step from its first line, scanning embedded parameters.
    ///
    /// # Errors
    /// Returns [`ParamError`] when a parameter token is invalid.
    ///
    /// # Examples
    /// ```
    /// use bdd_outline::{Step, StepType};
    ///
    /// let step = Step::new(StepType::Given, "Given", "I have <n.i:3> items", 4, 7).unwrap();
    /// assert_eq!(step.name(), "I have <n> items");
    /// assert_eq!(step.line(), 7);
    /// ```
    pub fn new(
        step_type: StepType,
        keyword: &str,
        text: &str,
        indent: usize,
        line: usize,
    ) -> Result<Self, ParamError> {
        let scanned = scan_step(text)?;
        Ok(Self {
            step_type,
            keyword: keyword.to_string(),
            text: text.to_string(),
            lines: Vec::new(),
            canonical: scanned.canonical,
            indent,
            constants: scanned.constants,
            aliases: scanned.aliases,
            line,
        })
    }

    pub(crate) fn add_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    /// Semantic type of the step.
    #[must_use]
    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    /// Keyword as written (`Given`, `And`, ...); empty for a bare line.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Raw first-line text, parameters unexpanded.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First-line text with variant tokens rewritten to `<name>`.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Raw continuation lines captured after the first line.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Leading whitespace width of the first line, in characters.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// One-based line number of the first line.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Constant parameters by name.
    #[must_use]
    pub fn constants(&self) -> &BTreeMap<String, ConstantParam> {
        &self.constants
    }

    /// Alias parameters by name.
    #[must_use]
    pub fn aliases(&self) -> &BTreeMap<String, AliasParam> {
        &self.aliases
    }

    /// Processed multi-line content, if any lines were captured.
    ///
    /// Lines are dedented, trailing blank lines dropped, and a surrounding
    /// pair of `"""` marker lines removed.
    #[must_use]
    pub fn content(&self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        let dedented = dedent(&self.lines.join("\n"));
        let mut lines: Vec<&str> = dedented.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if let [first, inner @ .., last] = lines.as_slice() {
            if first.trim_end() == DOCSTRING_MARKER && last.trim_end() == DOCSTRING_MARKER {
                return Some(inner.join("\n"));
            }
        }
        Some(lines.join("\n"))
    }

    /// Canonical name identifying the step in messages and reports.
    ///
    /// The canonical first line, followed by the processed multi-line
    /// content when present, trimmed. Definitions are matched against the
    /// first line alone.
    #[must_use]
    pub fn name(&self) -> String {
        match self.content() {
            Some(content) => format!("{}\n{content}", self.canonical)
                .trim()
                .to_string(),
            None => self.canonical.trim().to_string(),
        }
    }

    /// Parameter names the step expects from examples or fixtures.
    ///
    /// General `<name>` tokens in the raw first line plus alias targets.
    #[must_use]
    pub fn params(&self) -> BTreeSet<&str> {
        general_params(&self.text)
            .into_iter()
            .chain(self.aliases.values().map(|alias| alias.target.as_str()))
            .collect()
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} \"{}\"", self.step_type, self.name())
    }
}
