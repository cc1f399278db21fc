//! Step type shared by the document builder and the step registry.
//!
//! Conjunction keywords (`And`, `But`) never produce their own type: the
//! builder assigns them the type of the block they continue, so only the
//! three semantic types exist here.

use std::fmt;
use std::str::FromStr;

/// Semantic type of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform an action when testing behaviour.
    When,
    /// Assert the expected outcome of a scenario.
    Then,
}

impl StepType {
    /// Return the type as its lowercase name, as used in registry keys and
    /// diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use bdd_outline_patterns::StepType;
    ///
    /// assert_eq!(StepType::Given.as_str(), "given");
    /// assert_eq!(StepType::Then.as_str(), "then");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "given",
            Self::When => "when",
            Self::Then => "then",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`StepType`] from a string fails.
///
/// Contains the unrecognised text for diagnostic purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTypeParseError(pub String);

impl fmt::Display for StepTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid step type: {}", self.0)
    }
}

impl std::error::Error for StepTypeParseError {}

impl FromStr for StepType {
    type Err = StepTypeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("given") {
            Ok(Self::Given)
        } else if trimmed.eq_ignore_ascii_case("when") {
            Ok(Self::When)
        } else if trimmed.eq_ignore_ascii_case("then") {
            Ok(Self::Then)
        } else {
            Err(StepTypeParseError(trimmed.to_string()))
        }
    }
}

impl TryFrom<&str> for StepType {
    type Error = StepTypeParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[expect(clippy::expect_used, reason = "test helper with descriptive failures")]
    fn parse_ty(input: &str) -> StepType {
        input
            .parse()
            .expect("test input should parse to a valid step type")
    }

    #[rstest]
    #[case("Given", StepType::Given)]
    #[case("given", StepType::Given)]
    #[case(" WhEn ", StepType::When)]
    #[case("THEN", StepType::Then)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: StepType) {
        assert_eq!(parse_ty(input), expected);
    }

    #[rstest]
    #[case("and")]
    #[case("but")]
    #[case("invalid")]
    fn rejects_non_semantic_keywords(#[case] input: &str) {
        assert_eq!(
            input.parse::<StepType>(),
            Err(StepTypeParseError(input.to_string()))
        );
    }

    #[test]
    fn display_matches_as_str() {
        for ty in [StepType::Given, StepType::When, StepType::Then] {
            assert_eq!(ty.to_string(), ty.as_str());
        }
    }
}
