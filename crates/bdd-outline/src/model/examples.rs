//! Example tables attached to a scenario or to the whole feature.

/// Layout of an examples block in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Header row of names followed by value rows.
    Horizontal,
    /// One row per name: `| name | value | value |`.
    Vertical,
}

/// A completed examples block.
///
/// Values are kept as raw cell text; converters are applied when the
/// parametrization is built. Vertical blocks are stored column-wise and
/// transposed by [`ExampleSet::rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSet {
    pub(crate) orientation: Orientation,
    pub(crate) line: usize,
    pub(crate) names: Vec<String>,
    pub(crate) values: Vec<Vec<String>>,
}

impl ExampleSet {
    pub(crate) fn new(orientation: Orientation, line: usize) -> Self {
        Self {
            orientation,
            line,
            names: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Layout the block was written in.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Line of the `Examples:` declaration.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Parameter names in declaration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether the block holds no values; empty blocks are never flushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value rows aligned to [`names`](Self::names).
    ///
    /// # Examples
    /// ```
    /// use bdd_outline::{Orientation, parse_feature_str};
    ///
    /// let feature = parse_feature_str(
    ///     "Feature: F\n\
    ///      Scenario: S\n\
    ///      Given <v1> and <v2>\n\
    ///      Examples: Vertical\n\
    ///      | v1 | k11 | k12 |\n\
    ///      | v2 | k21 | k22 |\n",
    /// )
    /// .unwrap();
    /// let scenario = feature.scenario("S").unwrap();
    /// let block = &scenario.scenario().examples()[0];
    /// assert_eq!(block.orientation(), Orientation::Vertical);
    /// assert_eq!(block.names(), ["v1", "v2"]);
    /// assert_eq!(block.rows(), vec![vec!["k11", "k21"], vec!["k12", "k22"]]);
    /// ```
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<&str>> {
        match self.orientation {
            Orientation::Horizontal => self
                .values
                .iter()
                .map(|row| row.iter().map(String::as_str).collect())
                .collect(),
            Orientation::Vertical => {
                let count = self.values.first().map_or(0, Vec::len);
                (0..count)
                    .map(|idx| {
                        self.values
                            .iter()
                            .filter_map(|column| column.get(idx).map(String::as_str))
                            .collect()
                    })
                    .collect()
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ExampleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ExampleSet", 4)?;
        state.serialize_field("orientation", &self.orientation)?;
        state.serialize_field("line", &self.line)?;
        state.serialize_field("names", &self.names)?;
        state.serialize_field("rows", &self.rows())?;
        state.end()
    }
}
