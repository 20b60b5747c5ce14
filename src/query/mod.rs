//! Aggregation Query Layer
//!
//! Read-only views over every experiment under a log root:
//! - [`Dashboard::summary_table`]: one row per experiment, grouped columns
//!   (`meta`, `params`, `values`, `metrics`), outer-joined over key names
//! - [`Dashboard::series_for_key`]: one key's history across experiments,
//!   outer-joined over steps
//!
//! Each call rescans the log root, so experiments that are still running
//! show their latest persisted state. Nothing here writes to disk.
//!
//! # Example
//!
//! ```rust
//! use exptrack::experiment::{RecordStore, Reduce};
//! use exptrack::query::Dashboard;
//!
//! # fn main() -> exptrack::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let mut store = RecordStore::new(dir.path());
//! store.start_experiment(Some("run1"))?;
//! store.log_param("lr", 0.1)?;
//! store.log_value("loss", 0.5, Some(0), Some(&Reduce::Minimum))?;
//! store.end_experiment()?;
//!
//! let dashboard = Dashboard::open(dir.path())?;
//! let summary = dashboard.summary_table()?;
//! assert_eq!(summary.num_rows(), 1);
//!
//! let loss = dashboard.series_for_key("loss")?;
//! assert_eq!(loss.steps(), &[0]);
//! # Ok(())
//! # }
//! ```

pub mod scan;
pub mod series;
pub mod summary;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use scan::{is_valid_experiment_dir, scan_experiments, ExperimentEntry};
pub use series::{SeriesColumn, SeriesTable};
pub use summary::{ColumnGroup, SummaryRow, SummaryTable};

use crate::config::StoreConfig;
use crate::experiment::naming::validate_value_key;
use crate::{Error, Result};

/// Read-only entry point over a log root.
#[derive(Debug, Clone)]
pub struct Dashboard {
    log_root: PathBuf,
}

impl Dashboard {
    /// Open a dashboard over an existing log root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogRoot`] if `log_root` is not a directory.
    pub fn open(log_root: impl Into<PathBuf>) -> Result<Self> {
        let log_root = log_root.into();
        if !log_root.is_dir() {
            return Err(Error::InvalidLogRoot(log_root));
        }
        debug!(log_root = %log_root.display(), "opened dashboard");
        Ok(Self { log_root })
    }

    /// Open a dashboard over the configured log root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogRoot`] if the log root is not a directory.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::open(config.log_root.clone())
    }

    /// Get the log root.
    #[must_use]
    pub fn log_root(&self) -> &Path {
        &self.log_root
    }

    /// List qualifying experiments, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogRoot`] if the log root can no longer be read.
    pub fn experiments(&self) -> Result<Vec<ExperimentEntry>> {
        scan_experiments(&self.log_root)
    }

    /// Build the cross-experiment summary table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLogRoot`] if the log root can no longer be read.
    pub fn summary_table(&self) -> Result<SummaryTable> {
        Ok(SummaryTable::from_experiments(&self.experiments()?))
    }

    /// Build the step-aligned series for `key` across experiments.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidKey`] if `key` cannot name a series file
    /// - [`Error::InvalidLogRoot`] if the log root can no longer be read
    pub fn series_for_key(&self, key: &str) -> Result<SeriesTable> {
        validate_value_key(key)?;
        Ok(SeriesTable::from_experiments(&self.experiments()?, key))
    }
}
