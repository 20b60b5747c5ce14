//! Multi-experiment series for one key
//!
//! Each experiment's `(step, value)` rows are aligned by step and outer-joined:
//! the table holds the union of all steps, and an experiment that did not log
//! a step reads as [`Value::Null`] there.
//!
//! Rows logged without a step take their row position in the file as step,
//! unless that step was logged explicitly; explicit steps take precedence and
//! the shadowed row is dropped with a warning. When a step is logged
//! explicitly more than once, the last row wins.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::{debug, warn};

use super::scan::ExperimentEntry;
use crate::experiment::series::{self as codec, LEGACY_SERIES_DIR};
use crate::value::Value;
use crate::{Error, Result};

/// One experiment's column, aligned to [`SeriesTable::steps`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    experiment_id: String,
    values: Vec<Value>,
}

impl SeriesColumn {
    /// Column name: the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Values, one per step of the table.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Step-aligned series of one key across experiments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    key: String,
    steps: Vec<i64>,
    columns: Vec<SeriesColumn>,
}

fn read_aligned(entry: &ExperimentEntry, key: &str) -> Option<BTreeMap<i64, Value>> {
    let mut path = codec::series_path(entry.path(), key);
    if !path.is_file() {
        path = entry.path().join(LEGACY_SERIES_DIR).join(format!("{key}.csv"));
        if !path.is_file() {
            return None;
        }
    }
    let rows = match codec::read_series(&path) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable series, skipping");
            return None;
        }
    };
    let mut aligned = BTreeMap::new();
    let mut unstepped = Vec::new();
    for (position, row) in rows.into_iter().enumerate() {
        match row.step {
            Some(step) => {
                aligned.insert(step, row.value);
            }
            None => unstepped.push((i64::try_from(position).unwrap_or(i64::MAX), row.value)),
        }
    }
    for (step, value) in unstepped {
        if aligned.contains_key(&step) {
            warn!(path = %path.display(), step, "unstepped row collides with a logged step, dropping it");
            continue;
        }
        aligned.insert(step, value);
    }
    Some(aligned)
}

impl SeriesTable {
    /// Outer-join the series for `key` across experiments.
    ///
    /// Experiments without a series for `key` are left out.
    #[must_use]
    pub fn from_experiments(experiments: &[ExperimentEntry], key: &str) -> Self {
        let per_experiment: Vec<(&str, BTreeMap<i64, Value>)> = experiments
            .iter()
            .filter_map(|entry| read_aligned(entry, key).map(|s| (entry.experiment_id(), s)))
            .collect();

        let steps: Vec<i64> = per_experiment
            .iter()
            .flat_map(|(_, series)| series.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = per_experiment
            .into_iter()
            .map(|(experiment_id, mut series)| SeriesColumn {
                experiment_id: experiment_id.to_string(),
                values: steps
                    .iter()
                    .map(|step| series.remove(step).unwrap_or(Value::Null))
                    .collect(),
            })
            .collect::<Vec<_>>();

        debug!(key, experiments = columns.len(), steps = steps.len(), "joined series");
        Self {
            key: key.to_string(),
            steps,
            columns,
        }
    }

    /// Get the series key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the union of steps, ascending.
    #[must_use]
    pub fn steps(&self) -> &[i64] {
        &self.steps
    }

    /// Get one column per experiment that logged the key.
    #[must_use]
    pub fn columns(&self) -> &[SeriesColumn] {
        &self.columns
    }

    /// Number of step rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no experiment logged the key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the column for an experiment.
    #[must_use]
    pub fn column(&self, experiment_id: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.experiment_id == experiment_id)
            .map(|c| c.values.as_slice())
    }

    /// Get the value an experiment logged at `step` (null if it did not).
    #[must_use]
    pub fn value(&self, experiment_id: &str, step: i64) -> Option<&Value> {
        let row = self.steps.binary_search(&step).ok()?;
        self.column(experiment_id).map(|values| &values[row])
    }

    /// Export as an Arrow batch: `step: Int64` plus one nullable `Float64`
    /// column per experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonNumericCell`] if a non-null cell is not a number.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![Field::new("step", DataType::Int64, false)];
        let mut arrays: Vec<ArrayRef> = vec![Arc::new(Int64Array::from(self.steps.clone()))];

        for column in &self.columns {
            let numbers = column
                .values
                .iter()
                .zip(&self.steps)
                .map(|(value, step)| match value {
                    Value::Null => Ok(None),
                    other => other.as_f64().map(Some).ok_or_else(|| Error::NonNumericCell {
                        experiment_id: column.experiment_id.clone(),
                        step: *step,
                    }),
                })
                .collect::<Result<Vec<Option<f64>>>>()?;
            fields.push(Field::new(&column.experiment_id, DataType::Float64, true));
            arrays.push(Arc::new(Float64Array::from(numbers)));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }
}
