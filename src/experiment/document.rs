//! Structured document codec (YAML)
//!
//! Documents are read and rewritten whole. Rewrites go through a sibling
//! temp file and a rename, so readers see either the old or the new
//! document.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::value::{Map, Value};
use crate::Result;

/// Metadata document name.
pub const META_FILE: &str = "meta.yaml";
/// Parameter document name.
pub const PARAMS_FILE: &str = "params.yaml";
/// Snapshot document name.
pub const VALUES_FILE: &str = "values.yaml";
/// Snapshot document name used by older layouts.
pub const LEGACY_METRICS_FILE: &str = "metrics.yaml";

/// Read a document, returning `None` if the file does not exist or is empty.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read or parsed.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_yaml::from_str(&text)?))
}

/// Write a document, replacing any previous content.
///
/// # Errors
///
/// Returns error if serialization or any filesystem step fails.
pub fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let text = serde_yaml::to_string(doc)?;
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

/// Merge entries into a mapping document, last write wins per key.
///
/// Keys already in the document and not named by `entries` are kept, in
/// their original order. Returns the merged document.
///
/// # Errors
///
/// Returns error if the existing document cannot be read or the merged one
/// cannot be written.
pub fn merge_document<I>(path: &Path, entries: I) -> Result<Map>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut doc: Map = read_document(path)?.unwrap_or_default();
    for (key, value) in entries {
        doc.insert(key, value);
    }
    write_document(path, &doc)?;
    Ok(doc)
}
