//! Step-definition patterns with `{name}` and `{name:hint}` placeholders.
//!
//! A pattern compiles to an anchored regular expression with one group per
//! placeholder. The hint picks the group's shape and the conversion code
//! applied to the captured text; hints live in a table like the
//! conversion codes do.

mod lexer;

use std::cmp::Reverse;
use std::collections::BTreeSet;

use regex::Regex;

use crate::codes::apply_code;
use crate::errors::{ConversionError, PatternError};
use crate::value::Value;

use lexer::{Token, lex_pattern};

const LAZY_TEXT: &str = ".+?";
const FLOAT: &str = r"(?i:[+-]?(?:\d+\.\d*|\.\d+|\d+)(?:e[+-]?\d+)?|nan|inf|infinity)";

struct TypeHint {
    names: &'static [&'static str],
    regex: &'static str,
    code: Option<char>,
}

const HINTS: &[TypeHint] = &[
    TypeHint {
        names: &["i8", "i16", "i32", "i64", "isize", "int"],
        regex: r"[+-]?\d+",
        code: Some('i'),
    },
    TypeHint {
        names: &["u8", "u16", "u32", "u64", "usize"],
        regex: r"\d+",
        code: Some('i'),
    },
    TypeHint {
        names: &["f32", "f64", "float"],
        regex: FLOAT,
        code: Some('f'),
    },
    TypeHint {
        names: &["word"],
        regex: r"\S+",
        code: None,
    },
    TypeHint {
        names: &["string", "String"],
        regex: LAZY_TEXT,
        code: None,
    },
];

fn type_hint(name: &str) -> Option<&'static TypeHint> {
    HINTS.iter().find(|hint| hint.names.contains(&name))
}

/// Every accepted type hint, in table order.
pub fn type_hints() -> impl Iterator<Item = &'static str> {
    HINTS.iter().flat_map(|hint| hint.names.iter().copied())
}

/// A placeholder declared in a [`StepPattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Name the captured value is bound to.
    pub name: &'a str,
    /// Type hint as written, if any.
    pub hint: Option<&'a str>,
    code: Option<char>,
}

/// Ranking used when several patterns match the same text.
///
/// More literal characters rank higher, then fewer placeholders, then more
/// typed placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    literal_chars: usize,
    placeholders: Reverse<usize>,
    typed: usize,
}

/// A value captured by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture<'a> {
    /// Placeholder name.
    pub name: &'a str,
    /// Matched text.
    pub raw: String,
    code: Option<char>,
}

impl Capture<'_> {
    /// The captured text converted according to the placeholder hint.
    ///
    /// # Errors
    /// Returns [`ConversionError`] when the text does not fit the hinted
    /// type, for example an integer wider than 64 bits.
    pub fn value(&self) -> Result<Value, ConversionError> {
        let raw = Value::Str(self.raw.clone());
        match self.code {
            Some(code) => apply_code(code, raw),
            None => Ok(raw),
        }
    }
}

/// A compiled step-definition pattern.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{StepPattern, Value};
///
/// let pattern = StepPattern::compile("I deposit {amount:u32} into {account}").unwrap();
/// let captures = pattern.captures("I deposit 40 into savings").unwrap();
/// assert_eq!(captures[0].value(), Ok(Value::Int(40)));
/// assert_eq!(captures[1].raw, "savings");
/// assert!(pattern.captures("I withdraw 40 from savings").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct StepPattern<'a> {
    text: &'a str,
    placeholders: Vec<Placeholder<'a>>,
    specificity: Specificity,
    regex: Regex,
}

impl<'a> StepPattern<'a> {
    /// Whether `text` must be compiled as a pattern rather than compared
    /// verbatim.
    #[must_use]
    pub fn is_pattern(text: &str) -> bool {
        text.contains(['{', '}'])
    }

    /// Compile `text` into an anchored matcher.
    ///
    /// # Errors
    /// Returns [`PatternError`] for unbalanced braces, invalid or repeated
    /// placeholder names, unknown type hints, or a regular expression that
    /// fails to build.
    pub fn compile(text: &'a str) -> Result<Self, PatternError> {
        let tokens = lex_pattern(text)?;
        let mut source = String::with_capacity(text.len() * 2 + 2);
        source.push('^');
        let mut placeholders = Vec::new();
        let mut seen = BTreeSet::new();
        let mut literal_chars = 0;
        for token in tokens {
            match token {
                Token::Literal(literal) => {
                    literal_chars += literal.chars().count();
                    source.push_str(&regex::escape(&literal));
                }
                Token::Placeholder { name, hint } => {
                    if !seen.insert(name) {
                        return Err(PatternError::DuplicateName(name.to_string()));
                    }
                    let (regex, code) = match hint {
                        None => (LAZY_TEXT, None),
                        Some(hint) => type_hint(hint)
                            .map(|found| (found.regex, found.code))
                            .ok_or_else(|| PatternError::UnknownHint {
                                name: name.to_string(),
                                hint: hint.to_string(),
                            })?,
                    };
                    source.push('(');
                    source.push_str(regex);
                    source.push(')');
                    placeholders.push(Placeholder { name, hint, code });
                }
            }
        }
        source.push('$');
        let regex = Regex::new(&source).map_err(|err| PatternError::Regex(err.to_string()))?;
        let specificity = Specificity {
            literal_chars,
            placeholders: Reverse(placeholders.len()),
            typed: placeholders.iter().filter(|p| p.hint.is_some()).count(),
        };
        Ok(Self {
            text,
            placeholders,
            specificity,
            regex,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Placeholders in declaration order.
    #[must_use]
    pub fn placeholders(&self) -> &[Placeholder<'a>] {
        &self.placeholders
    }

    /// Ranking against other patterns matching the same text.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Match the whole of `text`, returning one capture per placeholder.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<Capture<'a>>> {
        let found = self.regex.captures(text)?;
        self.placeholders
            .iter()
            .zip(found.iter().skip(1))
            .map(|(placeholder, group)| {
                group.map(|group| Capture {
                    name: placeholder.name,
                    raw: group.as_str().to_string(),
                    code: placeholder.code,
                })
            })
            .collect()
    }
}
