//! Keyword classification of a single document line.

use crate::keyword::StepType;

/// Kind of a classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// `Feature: `
    Feature,
    /// `Scenario Outline: `
    ScenarioOutline,
    /// `Examples: Vertical`
    ExamplesVertical,
    /// `Examples:`
    Examples,
    /// `Scenario: `
    Scenario,
    /// `Background:`
    Background,
    /// `Given `
    Given,
    /// `When `
    When,
    /// `Then `
    Then,
    /// A line starting with `@`.
    Tag,
    /// `And ` or `But `; inherits the current step type.
    Continue,
}

impl LineKind {
    /// Step type introduced by this kind, if it is a primary step keyword.
    #[must_use]
    pub const fn step_type(self) -> Option<StepType> {
        match self {
            Self::Given => Some(StepType::Given),
            Self::When => Some(StepType::When),
            Self::Then => Some(StepType::Then),
            _ => None,
        }
    }

    /// Whether the kind opens a scenario.
    #[must_use]
    pub const fn is_scenario(self) -> bool {
        matches!(self, Self::Scenario | Self::ScenarioOutline)
    }
}

/// Ordered prefix rules; the first match wins.
const PREFIX_RULES: &[(&str, LineKind)] = &[
    ("Feature: ", LineKind::Feature),
    ("Scenario Outline: ", LineKind::ScenarioOutline),
    ("Examples: Vertical", LineKind::ExamplesVertical),
    ("Examples:", LineKind::Examples),
    ("Scenario: ", LineKind::Scenario),
    ("Background:", LineKind::Background),
    ("Given ", LineKind::Given),
    ("When ", LineKind::When),
    ("Then ", LineKind::Then),
    ("@", LineKind::Tag),
    ("And ", LineKind::Continue),
    ("But ", LineKind::Continue),
];

/// Result of [`classify_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// Matched kind, or `None` for a plain line.
    pub kind: Option<LineKind>,
    /// Matched prefix without trailing whitespace; empty for a plain line.
    pub keyword: &'a str,
    /// Remainder after the prefix, trimmed. For a plain line this is the
    /// whole line, trimmed.
    pub text: &'a str,
}

/// Return the kind of `line`, or `None` when no prefix matches.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{LineKind, classify};
///
/// assert_eq!(classify("Scenario Outline: x"), Some(LineKind::ScenarioOutline));
/// assert_eq!(classify("Examples: Vertical"), Some(LineKind::ExamplesVertical));
/// assert_eq!(classify("Givenx"), None);
/// ```
#[must_use]
pub fn classify(line: &str) -> Option<LineKind> {
    classify_line(line).kind
}

/// Classify `line` and split it into keyword and remainder.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{LineKind, classify_line};
///
/// let line = classify_line("And there is <count> item");
/// assert_eq!(line.kind, Some(LineKind::Continue));
/// assert_eq!(line.keyword, "And");
/// assert_eq!(line.text, "there is <count> item");
/// ```
#[must_use]
pub fn classify_line(line: &str) -> ClassifiedLine<'_> {
    PREFIX_RULES
        .iter()
        .find_map(|(prefix, kind)| {
            line.strip_prefix(prefix).map(|rest| ClassifiedLine {
                kind: Some(*kind),
                keyword: line_keyword(line, prefix),
                text: rest.trim(),
            })
        })
        .unwrap_or(ClassifiedLine {
            kind: None,
            keyword: "",
            text: line.trim(),
        })
}

fn line_keyword<'a>(line: &'a str, prefix: &str) -> &'a str {
    line.get(..prefix.len()).unwrap_or_default().trim_end()
}
