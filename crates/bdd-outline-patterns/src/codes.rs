//! Conversion-code registry for variant step parameters.
//!
//! Each code is a single character that either transforms a value, marks
//! the parameter as skipped, or turns the parameter into an alias. The
//! table is the only place codes are defined; the scanner looks codes up
//! here and never matches on individual characters.

use std::num::IntErrorKind;

use crate::errors::ConversionError;
use crate::value::Value;

/// What a conversion code does.
#[derive(Debug, Clone, Copy)]
pub enum CodeAction {
    /// Transform a single (non-list) value.
    Convert(fn(Value) -> Result<Value, ConversionError>),
    /// Omit the argument so the implementation default applies.
    Skip,
    /// Treat the literal as the name of another value to resolve.
    Alias,
}

/// One registry entry.
#[derive(Debug, Clone, Copy)]
pub struct ConversionCode {
    /// The code character.
    pub code: char,
    /// Behaviour of the code.
    pub action: CodeAction,
    /// Short human-readable summary.
    pub summary: &'static str,
}

const CODES: &[ConversionCode] = &[
    ConversionCode {
        code: 'i',
        action: CodeAction::Convert(to_int),
        summary: "64-bit integer",
    },
    ConversionCode {
        code: 'f',
        action: CodeAction::Convert(to_float),
        summary: "floating point",
    },
    ConversionCode {
        code: 'I',
        action: CodeAction::Convert(to_int),
        summary: "64-bit integer",
    },
    ConversionCode {
        code: 'd',
        action: CodeAction::Convert(to_float),
        summary: "floating point",
    },
    ConversionCode {
        code: 'b',
        action: CodeAction::Convert(to_bool),
        summary: "boolean",
    },
    ConversionCode {
        code: 'N',
        action: CodeAction::Convert(|_| Ok(Value::Null)),
        summary: "null",
    },
    ConversionCode {
        code: 'E',
        action: CodeAction::Convert(|_| Ok(Value::Str(String::new()))),
        summary: "empty string",
    },
    ConversionCode {
        code: 'S',
        action: CodeAction::Skip,
        summary: "skip, use the step default",
    },
    ConversionCode {
        code: 'A',
        action: CodeAction::Alias,
        summary: "alias to another value",
    },
    ConversionCode {
        code: 'l',
        action: CodeAction::Convert(to_list),
        summary: "comma separated list",
    },
    ConversionCode {
        code: 'j',
        action: CodeAction::Convert(to_json),
        summary: "JSON document",
    },
];

/// Look up a code in the registry.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{CodeAction, conversion_code};
///
/// assert!(matches!(conversion_code('A').map(|c| c.action), Some(CodeAction::Alias)));
/// assert!(conversion_code('z').is_none());
/// ```
#[must_use]
pub fn conversion_code(code: char) -> Option<&'static ConversionCode> {
    CODES.iter().find(|entry| entry.code == code)
}

/// Every registered code, in registry order.
pub fn valid_codes() -> impl Iterator<Item = char> {
    CODES.iter().map(|entry| entry.code)
}

/// Apply a single code, mapping over list elements.
///
/// # Errors
/// Returns [`ConversionError`] when the code is unknown, is not a value
/// conversion, or rejects the input.
pub fn apply_code(code: char, value: Value) -> Result<Value, ConversionError> {
    let entry = conversion_code(code).ok_or(ConversionError::UnknownCode(code))?;
    let CodeAction::Convert(convert) = entry.action else {
        return Err(ConversionError::NotAConversion(code));
    };
    match value {
        Value::List(items) => items
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => convert(other),
    }
}

/// Apply a run of codes left to right.
///
/// Once a value becomes a list, later codes apply to each element.
///
/// # Errors
/// Returns the first [`ConversionError`] raised by any code.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{Value, apply_codes};
///
/// let value = apply_codes("li", Value::from("1, 2,3")).unwrap();
/// assert_eq!(value, Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
/// ```
pub fn apply_codes(codes: &str, value: Value) -> Result<Value, ConversionError> {
    codes.chars().try_fold(value, |acc, code| apply_code(code, acc))
}

/// Integers are 64-bit; wider literals are [`ConversionError::OutOfRange`].
fn to_int(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Int(i) => Ok(Value::Int(i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Str(ref s) => s
            .trim()
            .replace('_', "")
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| match e.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    ConversionError::OutOfRange {
                        code: 'i',
                        input: s.clone(),
                    }
                }
                _ => ConversionError::invalid('i', s, e),
            }),
        other => Err(ConversionError::invalid('i', &other, "expected text")),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integers widen to floating point on request"
)]
fn to_float(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Int(i) => Ok(Value::Float(i as f64)),
        Value::Str(ref s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| ConversionError::invalid('f', s, e)),
        other => Err(ConversionError::invalid('f', &other, "expected text")),
    }
}

fn to_bool(value: Value) -> Result<Value, ConversionError> {
    let Value::Str(text) = value else {
        return Ok(Value::Bool(value.truthy()));
    };
    let lowered = text.to_lowercase();
    let parsed = match lowered.as_str() {
        "true" => true,
        "false" => false,
        other => other
            .trim()
            .parse::<i64>()
            .map_or_else(|_| !other.is_empty(), |i| i != 0),
    };
    Ok(Value::Bool(parsed))
}

fn to_list(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Str(s) => Ok(Value::List(
            s.split(',').map(|piece| Value::from(piece.trim())).collect(),
        )),
        other => Err(ConversionError::invalid('l', &other, "expected text")),
    }
}

fn to_json(value: Value) -> Result<Value, ConversionError> {
    match value {
        Value::Str(ref s) => serde_json::from_str::<serde_json::Value>(s)
            .map(Value::Json)
            .map_err(|e| ConversionError::invalid('j', s, e)),
        other => Err(ConversionError::invalid('j', &other, "expected text")),
    }
}
