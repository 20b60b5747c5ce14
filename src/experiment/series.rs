//! Append-only value series (CSV)
//!
//! Each key owns one table, `values/<key>.csv`, with the header
//! `step,value`. Rows are only ever appended; the file is the authoritative
//! history for the key.
//!
//! An interrupted append can leave a trailing partial row. Readers skip rows
//! that do not have exactly two fields rather than failing the whole read,
//! and the next append starts on a fresh line so the torn bytes stay isolated.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::value::Value;
use crate::{Error, Result};

/// Directory holding one series table per key.
pub const SERIES_DIR: &str = "values";
/// Series directory used by older layouts.
pub const LEGACY_SERIES_DIR: &str = "metrics";
/// Header row of every series table.
pub const SERIES_HEADER: [&str; 2] = ["step", "value"];

/// One `(step, value)` row of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    /// Caller-supplied step, if any
    pub step: Option<i64>,
    /// Logged value
    pub value: Value,
}

impl SeriesRow {
    /// Create a new row.
    #[must_use]
    pub fn new(step: Option<i64>, value: impl Into<Value>) -> Self {
        Self {
            step,
            value: value.into(),
        }
    }
}

/// Path of the series table for `key` inside `experiment_dir`.
#[must_use]
pub fn series_path(experiment_dir: &Path, key: &str) -> PathBuf {
    experiment_dir.join(SERIES_DIR).join(format!("{key}.csv"))
}

/// Append one row, creating the table (and its header) on first use.
///
/// # Errors
///
/// Returns error if the directory or file cannot be created or written.
pub fn append_row(path: &Path, step: Option<i64>, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    let len = file.metadata()?.len();
    let is_new = len == 0;
    if !is_new && !ends_with_newline(&mut file, len)? {
        warn!(path = %path.display(), "series ends in a partial row, starting a new line");
        file.write_all(b"\n")?;
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    if is_new {
        writer.write_record(SERIES_HEADER)?;
    }
    let step_cell = step.map(|s| s.to_string()).unwrap_or_default();
    writer.write_record([step_cell, value.to_cell()])?;
    writer.flush()?;
    Ok(())
}

fn ends_with_newline(file: &mut File, len: u64) -> Result<bool> {
    let mut last = [0_u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Read every well-formed row of a series table, in file order.
///
/// # Errors
///
/// Returns error if the file cannot be opened or an I/O error occurs while
/// reading. Malformed rows are skipped with a warning.
pub fn read_series(path: &Path) -> Result<Vec<SeriesRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(Error::Table(e)),
            Err(e) => {
                warn!(path = %path.display(), row = index, error = %e, "skipping unreadable row");
                continue;
            }
        };
        if record.len() != SERIES_HEADER.len() {
            warn!(path = %path.display(), row = index, fields = record.len(), "skipping malformed row");
            continue;
        }
        let step = match &record[0] {
            "" => None,
            cell => match cell.parse::<i64>() {
                Ok(step) => Some(step),
                Err(_) => {
                    warn!(path = %path.display(), row = index, step = cell, "skipping row with bad step");
                    continue;
                }
            },
        };
        rows.push(SeriesRow {
            step,
            value: Value::from_cell(&record[1]),
        });
    }
    debug!(path = %path.display(), rows = rows.len(), "read series");
    Ok(rows)
}
