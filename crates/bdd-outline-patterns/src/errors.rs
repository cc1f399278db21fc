//! Error types shared by the scanning and conversion modules.

use thiserror::Error;

/// Failure while applying a conversion code to a value.
///
/// # Examples
/// ```
/// use bdd_outline_patterns::{ConversionError, apply_codes, Value};
///
/// let err = apply_codes("i", Value::from("ten")).unwrap_err();
/// assert!(matches!(err, ConversionError::Invalid { code: 'i', .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The code is not part of the registry.
    #[error("unknown conversion code `{0}`")]
    UnknownCode(char),
    /// The code exists but does not transform values (`S`, `A`).
    #[error("conversion code `{0}` does not transform values")]
    NotAConversion(char),
    /// The input could not be converted.
    #[error("cannot convert `{input}` with code `{code}`: {reason}")]
    Invalid {
        /// Code that failed.
        code: char,
        /// Display form of the rejected input.
        input: String,
        /// Why the conversion failed.
        reason: String,
    },
    /// An integer literal does not fit in an `i64`.
    #[error("`{input}` does not fit a 64-bit integer (code `{code}`)")]
    OutOfRange {
        /// Code that failed.
        code: char,
        /// Rejected literal.
        input: String,
    },
}

impl ConversionError {
    pub(crate) fn invalid(code: char, input: impl ToString, reason: impl ToString) -> Self {
        Self::Invalid {
            code,
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Failure while scanning the embedded parameters of a step line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// A variant token uses a code outside the registry.
    #[error("unknown conversion code `{code}` in parameter `{name}` (valid: [{valid}])")]
    UnknownCode {
        /// Parameter whose codes were rejected.
        name: String,
        /// Offending code.
        code: char,
        /// Comma separated list of valid codes.
        valid: String,
    },
    /// An alias post-processing code is not a value conversion.
    #[error("code `{code}` cannot post-process alias parameter `{name}`")]
    InvalidAliasCode {
        /// Alias parameter.
        name: String,
        /// Offending code.
        code: char,
    },
    /// The literal of a constant parameter failed to convert.
    #[error("invalid literal for parameter `{name}`: {source}")]
    Conversion {
        /// Parameter whose literal was rejected.
        name: String,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },
}

/// Failure while compiling a step-definition pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `{` opens a placeholder that is never closed.
    #[error("missing closing '}}' for placeholder at byte {position}")]
    Unclosed {
        /// Byte offset of the opening brace.
        position: usize,
    },
    /// A `}` closes nothing; literal braces are written `}}`.
    #[error("unmatched closing brace '}}' at byte {position}")]
    StrayBrace {
        /// Byte offset of the brace.
        position: usize,
    },
    /// The placeholder name is empty or contains non-word characters.
    #[error("invalid placeholder name `{name}` at byte {position}")]
    InvalidName {
        /// Text between the braces, before any `:`.
        name: String,
        /// Byte offset of the opening brace.
        position: usize,
    },
    /// The placeholder type hint is not recognised.
    #[error("unknown type hint `{hint}` for placeholder `{name}`")]
    UnknownHint {
        /// Placeholder name.
        name: String,
        /// Rejected hint.
        hint: String,
    },
    /// Two placeholders share a name.
    #[error("placeholder `{0}` appears more than once")]
    DuplicateName(String),
    /// The generated regular expression does not compile.
    #[error("step pattern does not compile: {0}")]
    Regex(String),
}
