//! Summary table - one row per experiment, grouped columns
//!
//! Column groups are `meta`, `params`, `values` and (for older layouts)
//! `metrics`. Within a group the columns are the union of keys seen across
//! all experiments, in first-seen order. A cell an experiment never wrote
//! reads as [`Value::Null`].

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::warn;

use super::scan::ExperimentEntry;
use crate::experiment::document::{self, LEGACY_METRICS_FILE, PARAMS_FILE, VALUES_FILE};
use crate::value::{Map, Value};

/// Metadata column group.
pub const META_GROUP: &str = "meta";
/// Parameter column group.
pub const PARAMS_GROUP: &str = "params";
/// Snapshot column group.
pub const VALUES_GROUP: &str = "values";
/// Legacy snapshot column group.
pub const METRICS_GROUP: &str = "metrics";

static NULL: Value = Value::Null;

/// A named group of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    name: String,
    columns: Vec<String>,
}

impl ColumnGroup {
    /// Get the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column names, in first-seen order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// One experiment's row.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    path: PathBuf,
    experiment_id: String,
    groups: IndexMap<String, Map>,
}

impl SummaryRow {
    /// Get the experiment directory this row was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get a cell; absent cells read as null.
    #[must_use]
    pub fn get(&self, group: &str, column: &str) -> &Value {
        self.groups
            .get(group)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&NULL)
    }
}

/// Joined view over every experiment under a log root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    groups: Vec<ColumnGroup>,
    rows: Vec<SummaryRow>,
}

fn read_optional(entry: &ExperimentEntry, file: &str) -> Option<Map> {
    let path = entry.path().join(file);
    match document::read_document::<Map>(&path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable document, treating as absent");
            None
        }
    }
}

fn meta_cells(entry: &ExperimentEntry) -> Map {
    let meta = entry.meta();
    let mut cells = Map::new();
    cells.insert("experiment_id".into(), meta.experiment_id().into());
    cells.insert("experiment_name".into(), meta.experiment_name().into());
    if let Some(created_at) = meta.created_at() {
        cells.insert("created_at".into(), created_at.to_rfc3339().into());
    }
    cells
}

impl SummaryTable {
    /// Build the table from scanned experiments, reading their optional
    /// documents. Unreadable documents count as absent.
    #[must_use]
    pub fn from_experiments(experiments: &[ExperimentEntry]) -> Self {
        let sources = [
            (PARAMS_GROUP, PARAMS_FILE),
            (VALUES_GROUP, VALUES_FILE),
            (METRICS_GROUP, LEGACY_METRICS_FILE),
        ];

        let mut columns: IndexMap<&str, IndexSet<String>> = IndexMap::new();
        columns.insert(META_GROUP, IndexSet::new());
        for (group, _) in sources {
            columns.insert(group, IndexSet::new());
        }

        let mut rows = Vec::with_capacity(experiments.len());
        for entry in experiments {
            let mut groups = IndexMap::new();
            groups.insert(META_GROUP.to_string(), meta_cells(entry));
            for (group, file) in sources {
                if let Some(doc) = read_optional(entry, file) {
                    groups.insert(group.to_string(), doc);
                }
            }
            for (group, cells) in &groups {
                if let Some(seen) = columns.get_mut(group.as_str()) {
                    seen.extend(cells.keys().cloned());
                }
            }
            rows.push(SummaryRow {
                path: entry.path().to_path_buf(),
                experiment_id: entry.experiment_id().to_string(),
                groups,
            });
        }

        let groups = columns
            .into_iter()
            .filter(|(name, seen)| *name == META_GROUP || !seen.is_empty())
            .map(|(name, seen)| ColumnGroup {
                name: name.to_string(),
                columns: seen.into_iter().collect(),
            })
            .collect();

        Self { groups, rows }
    }

    /// Get the column groups.
    #[must_use]
    pub fn groups(&self) -> &[ColumnGroup] {
        &self.groups
    }

    /// Get a column group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ColumnGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Get the rows, ordered by experiment path.
    #[must_use]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Number of experiments in the table.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no experiment qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find the row for an experiment ID.
    #[must_use]
    pub fn row(&self, experiment_id: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.experiment_id == experiment_id)
    }

    /// Returns `true` if `group.column` is part of the table.
    #[must_use]
    pub fn has_column(&self, group: &str, column: &str) -> bool {
        self.group(group)
            .is_some_and(|g| g.columns.iter().any(|c| c == column))
    }

    /// Get one column across all rows, or `None` if it is not in the table.
    #[must_use]
    pub fn column(&self, group: &str, column: &str) -> Option<Vec<&Value>> {
        self.has_column(group, column)
            .then(|| self.rows.iter().map(|r| r.get(group, column)).collect())
    }
}
