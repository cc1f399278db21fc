//! Lexer recognising `<name>` and `<name.codes:literal>` tokens in step text.

use std::ops::Range;

/// A parameter token found in step text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamToken<'a> {
    /// `<name>`
    General {
        /// Parameter name.
        name: &'a str,
        /// Byte range of the whole token.
        span: Range<usize>,
    },
    /// `<name:literal>` or `<name.codes:literal>`
    Variant {
        /// Parameter name.
        name: &'a str,
        /// Conversion codes, when a `.` follows the name.
        codes: Option<&'a str>,
        /// Text between `:` and the first following `>`.
        literal: &'a str,
        /// Byte range of the whole token.
        span: Range<usize>,
    },
}

impl<'a> ParamToken<'a> {
    /// Parameter name of the token.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Self::General { name, .. } | Self::Variant { name, .. } => name,
        }
    }

    /// Byte range of the token within the scanned text.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        match self {
            Self::General { span, .. } | Self::Variant { span, .. } => span.clone(),
        }
    }
}

pub(crate) fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte index one past the run of word characters starting at `start`.
fn word_end(text: &str, start: usize) -> usize {
    let rest = text.get(start..).unwrap_or_default();
    start
        + rest
            .char_indices()
            .find(|(_, c)| !is_word(*c))
            .map_or(rest.len(), |(idx, _)| idx)
}

fn is_escaped(bytes: &[u8], pos: usize) -> bool {
    pos > 0 && bytes.get(pos - 1) == Some(&b'\\')
}

/// Scan `text` left to right, resuming after each recognised token.
pub(crate) fn lex_params(text: &str) -> Vec<ParamToken<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(&b) = bytes.get(pos) {
        if b == b'<' && !is_escaped(bytes, pos) {
            if let Some(token) = lex_token(text, pos) {
                pos = token.span().end;
                tokens.push(token);
                continue;
            }
        }
        pos += 1;
    }
    tokens
}

/// Scan `text` for `<name>` tokens only.
///
/// This is independent of [`lex_params`]: a `<name>` inside a variant literal
/// is still reported.
pub(crate) fn lex_general(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut names = Vec::new();
    let mut pos = 0;
    while let Some(&b) = bytes.get(pos) {
        if b == b'<' && !is_escaped(bytes, pos) {
            let name_end = word_end(text, pos + 1);
            if name_end > pos + 1 && bytes.get(name_end) == Some(&b'>') {
                if let Some(name) = text.get(pos + 1..name_end) {
                    names.push(name);
                }
                pos = name_end + 1;
                continue;
            }
        }
        pos += 1;
    }
    names
}

fn lex_token(text: &str, start: usize) -> Option<ParamToken<'_>> {
    let bytes = text.as_bytes();
    let name_start = start + 1;
    let name_end = word_end(text, name_start);
    if name_end == name_start {
        return None;
    }
    let name = text.get(name_start..name_end)?;
    match bytes.get(name_end)? {
        b'>' => Some(ParamToken::General {
            name,
            span: start..name_end + 1,
        }),
        b':' => lex_variant(text, start, name, None, name_end + 1),
        b'.' => {
            let codes_end = word_end(text, name_end + 1);
            if bytes.get(codes_end) != Some(&b':') {
                return None;
            }
            let codes = text.get(name_end + 1..codes_end)?;
            lex_variant(text, start, name, Some(codes), codes_end + 1)
        }
        _ => None,
    }
}

fn lex_variant<'a>(
    text: &'a str,
    start: usize,
    name: &'a str,
    codes: Option<&'a str>,
    literal_start: usize,
) -> Option<ParamToken<'a>> {
    let close = literal_start + text.get(literal_start..)?.find('>')?;
    let literal = text.get(literal_start..close)?;
    Some(ParamToken::Variant {
        name,
        codes,
        literal,
        span: start..close + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenises_general_and_variant_tokens() {
        let tokens = lex_params("have <count> of <size.i:4> and <tag:x>");
        assert_eq!(
            tokens,
            vec![
                ParamToken::General {
                    name: "count",
                    span: 5..12,
                },
                ParamToken::Variant {
                    name: "size",
                    codes: Some("i"),
                    literal: "4",
                    span: 16..26,
                },
                ParamToken::Variant {
                    name: "tag",
                    codes: None,
                    literal: "x",
                    span: 31..38,
                },
            ]
        );
    }

    #[test]
    fn skips_escaped_openers() {
        assert!(lex_params(r"literal \<count> here").is_empty());
        assert!(lex_general(r"literal \<count> here").is_empty());
    }

    #[test]
    fn literal_runs_to_first_closer() {
        let tokens = lex_params("<a:x>y>");
        assert_eq!(
            tokens,
            vec![ParamToken::Variant {
                name: "a",
                codes: None,
                literal: "x",
                span: 0..5,
            }]
        );
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(lex_params("< a> <a b> <> <a.b.c:x> <a:unterminated").is_empty());
    }

    #[test]
    fn resumes_after_failed_opener() {
        let tokens = lex_params("<<a>");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens.first().map(ParamToken::name), Some("a"));
    }

    #[test]
    fn accepts_unicode_word_characters() {
        let tokens = lex_params("<内存.i:4> GB");
        assert_eq!(tokens.first().map(ParamToken::name), Some("内存"));
    }

    #[test]
    fn general_scan_sees_inside_variant_literals() {
        assert_eq!(lex_general("<a:<b>> <c>"), vec!["b", "c"]);
    }

    #[test]
    fn empty_codes_are_kept_as_empty() {
        let tokens = lex_params("<a.:x>");
        assert!(matches!(
            tokens.first(),
            Some(ParamToken::Variant { codes: Some(""), .. })
        ));
    }
}
