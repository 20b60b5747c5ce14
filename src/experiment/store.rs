//! Record Store - lifecycle and logging for one experiment at a time
//!
//! A [`RecordStore`] owns at most one bound experiment. Every write goes to
//! that experiment's directory under the log root:
//!
//! ```text
//! <log_root>/<experiment_id>/
//!   meta.yaml          written once
//!   params.yaml        merge-updated
//!   values.yaml        best-so-far snapshot per key
//!   values/<key>.csv   append-only (step, value) history
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::document::{self, META_FILE, PARAMS_FILE, VALUES_FILE};
use super::naming::{validate_experiment_name, validate_value_key, IdGenerator, UuidGenerator};
use super::series;
use super::{ExperimentMeta, Reducer};
use crate::config::StoreConfig;
use crate::value::{Map, Value};
use crate::{Error, Result};

/// The experiment a [`RecordStore`] is currently bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveExperiment {
    experiment_id: String,
    experiment_name: Option<String>,
    path: PathBuf,
}

impl ActiveExperiment {
    /// Get the experiment ID.
    #[must_use]
    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    /// Get the experiment name, if one was given.
    #[must_use]
    pub fn experiment_name(&self) -> Option<&str> {
        self.experiment_name.as_deref()
    }

    /// Get the experiment directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writer for experiment records under a shared log root.
///
/// ## Example
///
/// ```rust
/// use exptrack::experiment::{Reduce, RecordStore};
///
/// # fn main() -> exptrack::Result<()> {
/// # let dir = tempfile::tempdir()?;
/// let mut store = RecordStore::builder().log_root(dir.path()).build();
///
/// store.start_experiment(Some("run1"))?;
/// store.log_param("lr", 0.1)?;
/// store.log_value("loss", 0.9, Some(0), Some(&Reduce::Minimum))?;
/// store.log_value("loss", 0.5, Some(1), Some(&Reduce::Minimum))?;
/// store.end_experiment()?;
/// # Ok(())
/// # }
/// ```
pub struct RecordStore {
    log_root: PathBuf,
    id_generator: Arc<dyn IdGenerator>,
    active: Option<ActiveExperiment>,
}

impl RecordStore {
    /// Create a store writing under `log_root` with the default id generator.
    #[must_use]
    pub fn new(log_root: impl Into<PathBuf>) -> Self {
        Self::builder().log_root(log_root).build()
    }

    /// Create a new store builder
    #[must_use]
    pub fn builder() -> RecordStoreBuilder {
        RecordStoreBuilder::default()
    }

    /// Get the log root.
    #[must_use]
    pub fn log_root(&self) -> &Path {
        &self.log_root
    }

    /// Get the bound experiment, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveExperiment> {
        self.active.as_ref()
    }

    fn require_active(&self) -> Result<&ActiveExperiment> {
        self.active.as_ref().ok_or(Error::NoActiveExperiment)
    }

    /// Create a new experiment and bind this store to it.
    ///
    /// The log root is created if it does not exist yet. Any previously
    /// bound experiment is replaced.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` fails the naming policy
    /// - [`Error::ExperimentExists`] if the generated id is already taken
    /// - [`Error::Io`] / [`Error::Document`] if the directory or metadata
    ///   cannot be written
    pub fn start_experiment(&mut self, name: Option<&str>) -> Result<&ActiveExperiment> {
        validate_experiment_name(name)?;
        let experiment_id = self.id_generator.generate();

        fs::create_dir_all(&self.log_root)?;
        let path = self.log_root.join(&experiment_id);
        if path.exists() {
            return Err(Error::ExperimentExists(path));
        }
        // create_dir (not _all) so a racing creator still surfaces as a collision
        fs::create_dir(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::ExperimentExists(path.clone()),
            _ => Error::Io(e),
        })?;

        let experiment_name = name.map(str::to_string);
        let meta = ExperimentMeta::new(experiment_id.clone(), experiment_name.clone());
        document::write_document(&path.join(META_FILE), &meta)?;

        info!(experiment_id = %experiment_id, name = ?experiment_name, "started experiment");
        Ok(&*self.active.insert(ActiveExperiment {
            experiment_id,
            experiment_name,
            path,
        }))
    }

    /// Bind this store to an existing experiment directory.
    ///
    /// Existing data is left untouched; id and name are restored from the
    /// metadata record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExperiment`] if `path` is not a directory
    /// holding a readable metadata record.
    pub fn resume_experiment(&mut self, path: impl AsRef<Path>) -> Result<&ActiveExperiment> {
        let path = path.as_ref();
        let invalid = || Error::InvalidExperiment(path.to_path_buf());
        if !path.is_dir() {
            return Err(invalid());
        }
        let meta: ExperimentMeta = document::read_document(&path.join(META_FILE))
            .ok()
            .flatten()
            .ok_or_else(invalid)?;

        info!(experiment_id = %meta.experiment_id(), path = %path.display(), "resumed experiment");
        Ok(&*self.active.insert(ActiveExperiment {
            experiment_id: meta.experiment_id().to_string(),
            experiment_name: meta.experiment_name().map(str::to_string),
            path: path.to_path_buf(),
        }))
    }

    /// Clear the binding. Data on disk is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveExperiment`] if nothing is bound.
    pub fn end_experiment(&mut self) -> Result<()> {
        let ended = self.active.take().ok_or(Error::NoActiveExperiment)?;
        info!(experiment_id = %ended.experiment_id, "ended experiment");
        Ok(())
    }

    /// Merge a single parameter into `params.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveExperiment`] if nothing is bound, or an I/O or
    /// document error if the merge fails.
    pub fn log_param(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.log_params([(key, value)])
    }

    /// Merge parameters into `params.yaml`; keys not named here are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveExperiment`] if nothing is bound, or an I/O or
    /// document error if the merge fails.
    pub fn log_params<I, K, V>(&mut self, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let active = self.require_active()?;
        let entries: Vec<(String, Value)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        debug!(experiment_id = %active.experiment_id, keys = ?keys, "logging params");
        document::merge_document(&active.path.join(PARAMS_FILE), entries)?;
        Ok(())
    }

    /// Append `(step, value)` to the series for `key`.
    ///
    /// If a reducer is given, the snapshot for `key` in `values.yaml` becomes
    /// `reducer.reduce(value, previous_snapshot)`. Without a reducer only the
    /// history is appended.
    ///
    /// # Errors
    ///
    /// - [`Error::NoActiveExperiment`] if nothing is bound
    /// - [`Error::InvalidKey`] if `key` cannot name a series file
    /// - I/O, table or document errors from the writes
    pub fn log_value(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        step: Option<i64>,
        reducer: Option<&dyn Reducer>,
    ) -> Result<()> {
        let active = self.require_active()?;
        validate_value_key(key)?;
        let value = value.into();

        series::append_row(&series::series_path(&active.path, key), step, &value)?;
        debug!(experiment_id = %active.experiment_id, key, step = ?step, "appended value");

        if let Some(reducer) = reducer {
            let path = active.path.join(VALUES_FILE);
            let mut snapshot: Map = document::read_document(&path)?.unwrap_or_default();
            let best = reducer.reduce(&value, snapshot.get(key));
            snapshot.insert(key.to_string(), best);
            document::write_document(&path, &snapshot)?;
        }
        Ok(())
    }

    /// Apply [`RecordStore::log_value`] to each pair, in iteration order.
    ///
    /// There is no cross-key atomicity: a failure leaves earlier keys logged.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`RecordStore::log_value`].
    pub fn log_values<I, K, V>(
        &mut self,
        values: I,
        step: Option<i64>,
        reducer: Option<&dyn Reducer>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.require_active()?;
        for (key, value) in values {
            self.log_value(key.as_ref(), value, step, reducer)?;
        }
        Ok(())
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("log_root", &self.log_root)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Record store builder
pub struct RecordStoreBuilder {
    config: StoreConfig,
    id_generator: Arc<dyn IdGenerator>,
}

impl Default for RecordStoreBuilder {
    fn default() -> Self {
        Self {
            config: StoreConfig::default(),
            id_generator: Arc::new(UuidGenerator),
        }
    }
}

impl RecordStoreBuilder {
    /// Use settings from a loaded configuration
    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the shared log root
    #[must_use]
    pub fn log_root(mut self, log_root: impl Into<PathBuf>) -> Self {
        self.config.log_root = log_root.into();
        self
    }

    /// Set the experiment id generator
    #[must_use]
    pub fn id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Build the store (no filesystem access until the first operation)
    #[must_use]
    pub fn build(self) -> RecordStore {
        RecordStore {
            log_root: self.config.log_root,
            id_generator: self.id_generator,
            active: None,
        }
    }
}
