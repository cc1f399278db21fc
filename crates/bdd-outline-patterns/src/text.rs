//! Whitespace, comment, and tag helpers applied to raw document lines.

use std::collections::BTreeSet;

/// Remove a trailing comment and trim the result.
///
/// A `#` starts a comment when it begins the line or follows whitespace, so
/// `issue#12` keeps its hash.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::strip_comment;
///
/// assert_eq!(strip_comment("  Given a cart # note"), "Given a cart");
/// assert_eq!(strip_comment("# whole line"), "");
/// assert_eq!(strip_comment("see issue#12"), "see issue#12");
/// ```
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    let mut prev: Option<char> = None;
    for (idx, ch) in line.char_indices() {
        if ch == '#' && prev.is_none_or(char::is_whitespace) {
            return line.get(..idx).unwrap_or_default().trim();
        }
        prev = Some(ch);
    }
    line.trim()
}

/// Width of the leading whitespace of `line`, in characters.
#[must_use]
pub fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Remove the whitespace prefix common to every non-blank line.
///
/// Whitespace-only lines do not contribute to the margin and come out
/// empty.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::dedent;
///
/// assert_eq!(dedent("    a\n      b\n\n    c"), "a\n  b\n\nc");
/// ```
#[must_use]
pub fn dedent(text: &str) -> String {
    let margin = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .reduce(common_prefix)
        .unwrap_or_default();
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn leading_whitespace(line: &str) -> &str {
    let rest = line.trim_start();
    line.get(..line.len() - rest.len()).unwrap_or_default()
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((idx, ch), _)| idx + ch.len_utf8());
    a.get(..len).unwrap_or_default()
}

/// Parse a tag line into its tag names.
///
/// The line is split on ` @`; each piece loses its leading `@` and empty
/// pieces are dropped.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::parse_tags;
///
/// let tags = parse_tags("@smoke @slow @");
/// assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["slow", "smoke"]);
/// ```
#[must_use]
pub fn parse_tags(line: &str) -> BTreeSet<String> {
    line.split(" @")
        .map(|piece| piece.trim_start_matches('@').trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
