//! Step-parameter scanning: canonical names, constant and alias tables.

mod lexer;

use std::collections::BTreeMap;

use crate::codes::{CodeAction, apply_codes, conversion_code, valid_codes};
use crate::errors::ParamError;
use crate::value::Value;

pub use lexer::ParamToken;

/// Value recorded for a constant (non-alias) variant parameter.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantParam {
    /// Pass this value as the argument.
    Value(Value),
    /// Omit the argument so the implementation default applies.
    Skip,
}

/// Alias parameter: the argument is resolved from another name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AliasParam {
    /// Name to resolve through the value source.
    pub target: String,
    /// Code applied to the resolved value.
    pub post: Option<char>,
}

/// Outcome of scanning a step's first line.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ScannedStep {
    /// Text with every variant token rewritten to `<name>`.
    pub canonical: String,
    /// Constant parameters by name.
    pub constants: BTreeMap<String, ConstantParam>,
    /// Alias parameters by name.
    pub aliases: BTreeMap<String, AliasParam>,
}

/// Tokenise `text` into general and variant parameter tokens.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{ParamToken, tokenize};
///
/// let tokens = tokenize("I have <count.i:3> items");
/// assert!(matches!(
///     tokens.as_slice(),
///     [ParamToken::Variant { name: "count", codes: Some("i"), literal: "3", .. }]
/// ));
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<ParamToken<'_>> {
    lexer::lex_params(text)
}

/// Names of the `<name>` tokens in `text`, in order of appearance.
#[must_use]
pub fn general_params(text: &str) -> Vec<&str> {
    lexer::lex_general(text)
}

/// Rewrite every variant token to its `<name>` form.
///
/// Applying the function to its own output returns the same text.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::canonicalize;
///
/// assert_eq!(
///     canonicalize("return field: <field:k19> should has value: <value.li:1,2,3>"),
///     "return field: <field> should has value: <value>",
/// );
/// ```
#[must_use]
pub fn canonicalize(text: &str) -> String {
    let mut canonical = String::with_capacity(text.len());
    let mut last = 0;
    for token in lexer::lex_params(text) {
        let ParamToken::Variant { name, span, .. } = token else {
            continue;
        };
        canonical.push_str(text.get(last..span.start).unwrap_or_default());
        canonical.push('<');
        canonical.push_str(name);
        canonical.push('>');
        last = span.end;
    }
    canonical.push_str(text.get(last..).unwrap_or_default());
    canonical
}

/// Scan a step's first line into its canonical form and parameter tables.
///
/// # Errors
/// Returns [`ParamError`] when a token uses an unknown code, an alias is
/// post-processed by a code that does not convert values, or a constant
/// literal fails to convert.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{AliasParam, ConstantParam, Value, scan_step};
///
/// let scanned = scan_step("I use <size.i:4> and <user.A:admin>").unwrap();
/// assert_eq!(scanned.canonical, "I use <size> and <user>");
/// assert_eq!(scanned.constants.get("size"), Some(&ConstantParam::Value(Value::Int(4))));
/// assert_eq!(
///     scanned.aliases.get("user"),
///     Some(&AliasParam { target: "admin".into(), post: None }),
/// );
/// ```
pub fn scan_step(text: &str) -> Result<ScannedStep, ParamError> {
    let mut scanned = ScannedStep {
        canonical: canonicalize(text),
        ..ScannedStep::default()
    };
    for token in lexer::lex_params(text) {
        let ParamToken::Variant {
            name,
            codes,
            literal,
            ..
        } = token
        else {
            continue;
        };
        let codes = codes.filter(|c| !c.is_empty());
        if let Some(codes) = codes {
            check_codes(name, codes)?;
        }
        match codes.and_then(|c| c.split_once('A')) {
            Some((_, after)) => {
                let alias = alias_param(name, literal, after)?;
                scanned.constants.remove(name);
                scanned.aliases.insert(name.to_string(), alias);
            }
            None => {
                let constant = constant_param(name, codes, literal)?;
                scanned.aliases.remove(name);
                scanned.constants.insert(name.to_string(), constant);
            }
        }
    }
    Ok(scanned)
}

fn check_codes(name: &str, codes: &str) -> Result<(), ParamError> {
    match codes.chars().find(|c| conversion_code(*c).is_none()) {
        Some(code) => Err(ParamError::UnknownCode {
            name: name.to_string(),
            code,
            valid: valid_codes()
                .map(String::from)
                .collect::<Vec<_>>()
                .join(","),
        }),
        None => Ok(()),
    }
}

fn alias_param(name: &str, literal: &str, after: &str) -> Result<AliasParam, ParamError> {
    let post = after.chars().last();
    if let Some(code) = post {
        if !matches!(
            conversion_code(code).map(|c| c.action),
            Some(CodeAction::Convert(_))
        ) {
            return Err(ParamError::InvalidAliasCode {
                name: name.to_string(),
                code,
            });
        }
    }
    Ok(AliasParam {
        target: literal.to_string(),
        post,
    })
}

fn constant_param(
    name: &str,
    codes: Option<&str>,
    literal: &str,
) -> Result<ConstantParam, ParamError> {
    let Some(codes) = codes else {
        return Ok(if literal.is_empty() {
            ConstantParam::Skip
        } else {
            ConstantParam::Value(Value::from(literal))
        });
    };
    if codes
        .chars()
        .any(|c| matches!(conversion_code(c).map(|e| e.action), Some(CodeAction::Skip)))
    {
        return Ok(ConstantParam::Skip);
    }
    apply_codes(codes, Value::from(literal))
        .map(ConstantParam::Value)
        .map_err(|source| ParamError::Conversion {
            name: name.to_string(),
            source,
        })
}
