//! Experiment discovery under a log root

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::experiment::document::{self, META_FILE};
use crate::experiment::ExperimentMeta;
use crate::{Error, Result};

/// A directory that qualified as an experiment, with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentEntry {
    path: PathBuf,
    meta: ExperimentMeta,
}

impl ExperimentEntry {
    /// Get the experiment directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the metadata record.
    #[must_use]
    pub const fn meta(&self) -> &ExperimentMeta {
        &self.meta
    }

    /// Get the experiment ID recorded in the metadata.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        self.meta.experiment_id()
    }
}

fn load_meta(path: &Path) -> Option<ExperimentMeta> {
    if !path.is_dir() {
        return None;
    }
    match document::read_document(&path.join(META_FILE)) {
        Ok(meta) => meta,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable metadata");
            None
        }
    }
}

/// A directory is an experiment iff it holds a readable metadata record.
#[must_use]
pub fn is_valid_experiment_dir(path: &Path) -> bool {
    load_meta(path).is_some()
}

/// List every qualifying experiment directly under `log_root`, sorted by path.
///
/// Subdirectories without readable metadata, and plain files, are skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidLogRoot`] if `log_root` cannot be listed.
pub fn scan_experiments(log_root: &Path) -> Result<Vec<ExperimentEntry>> {
    let entries =
        fs::read_dir(log_root).map_err(|_| Error::InvalidLogRoot(log_root.to_path_buf()))?;

    let mut experiments = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!(log_root = %log_root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        match load_meta(&path) {
            Some(meta) => experiments.push(ExperimentEntry { path, meta }),
            None => debug!(path = %path.display(), "not an experiment, skipping"),
        }
    }
    experiments.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(experiments)
}
