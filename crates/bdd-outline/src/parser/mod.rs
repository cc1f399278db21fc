//! Parsing feature documents from disk or from memory.
//!
//! Parsing is a single synchronous pass over the document. Any structural
//! or example-table error aborts the whole document.

mod builder;

use std::path::{Path, PathBuf};

use crate::error::ParseError;
use crate::model::Feature;

use builder::FeatureBuilder;

/// Path reported in errors for documents parsed from memory.
pub const IN_MEMORY_PATH: &str = "<memory>";

/// Parse `filename` relative to `base_dir`.
///
/// The feature records the absolute path of the document and a relative
/// path made of the base directory's last component joined with
/// `filename`.
///
/// # Errors
/// Returns [`ParseError::Io`] when the file cannot be read, and the
/// structural or example-table variants when the document is invalid.
pub fn parse_feature(
    base_dir: impl AsRef<Path>,
    filename: impl AsRef<Path>,
) -> Result<Feature, ParseError> {
    let base_dir = base_dir.as_ref();
    let filename = filename.as_ref();
    let joined = base_dir.join(filename);
    let path = std::path::absolute(&joined).map_err(|source| ParseError::Io {
        path: joined.clone(),
        source,
    })?;
    let text = std::fs::read_to_string(&path).map_err(|source| ParseError::Io {
        path: path.clone(),
        source,
    })?;
    let rel_path = base_dir
        .file_name()
        .map_or_else(|| filename.to_path_buf(), |base| Path::new(base).join(filename));
    parse_document(&text, path, rel_path)
}

/// Parse a document held in memory.
///
/// # Errors
/// Returns the structural or example-table variants of [`ParseError`] when
/// the document is invalid.
///
/// # Examples
/// ```
/// use bdd_outline::parse_feature_str;
///
/// let feature = parse_feature_str(
///     "Feature: Billing\n  Scenario: Pay\n    Given a cart\n    Then it is paid\n",
/// )
/// .unwrap();
/// assert_eq!(feature.name(), Some("Billing"));
/// assert_eq!(feature.scenario("Pay").unwrap().effective_steps().count(), 2);
/// ```
pub fn parse_feature_str(text: &str) -> Result<Feature, ParseError> {
    parse_document(text, PathBuf::new(), PathBuf::new())
}

fn parse_document(text: &str, path: PathBuf, rel_path: PathBuf) -> Result<Feature, ParseError> {
    let feature = Feature {
        path,
        rel_path,
        line: 1,
        ..Feature::default()
    };
    let label = feature.path_label();
    FeatureBuilder::new(feature, label).build(text)
}
