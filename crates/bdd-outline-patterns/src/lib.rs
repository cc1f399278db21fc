//! Lexical building blocks for bdd-outline feature documents.
//!
//! The crate holds everything that works on a single line of text and never
//! needs to know about the surrounding document: keyword classification,
//! comment stripping, table-cell splitting, tag parsing, and the embedded
//! step-parameter micro-grammar with its conversion codes. The document
//! builder in `bdd-outline` drives these helpers line by line. Step
//! definitions use [`StepPattern`] to match step text and capture
//! `{name}` placeholders.

mod codes;
mod errors;
mod keyword;
mod line;
mod params;
mod pattern;
mod table;
mod text;
mod value;

pub use codes::{CodeAction, ConversionCode, apply_code, apply_codes, conversion_code, valid_codes};
pub use errors::{ConversionError, ParamError, PatternError};
pub use keyword::{StepType, StepTypeParseError};
pub use line::{ClassifiedLine, LineKind, classify, classify_line};
pub use params::{
    AliasParam, ConstantParam, ParamToken, ScannedStep, canonicalize, general_params, scan_step,
    tokenize,
};
pub use pattern::{Capture, Placeholder, Specificity, StepPattern, type_hints};
pub use table::split_cells;
pub use text::{dedent, indent_width, parse_tags, strip_comment};
pub use value::Value;
