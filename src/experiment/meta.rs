//! Experiment metadata - the immutable identity record of one experiment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata record written once, at creation, to `meta.yaml`.
///
/// `created_at` is optional on read so that directories written without it
/// still qualify as experiments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExperimentMeta {
    experiment_id: String,
    experiment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl ExperimentMeta {
    /// Create a new metadata record stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `experiment_id` - Opaque, globally unique identifier
    /// * `experiment_name` - Optional human-readable name
    #[must_use]
    pub fn new(experiment_id: impl Into<String>, experiment_name: Option<String>) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            experiment_name,
            created_at: Some(Utc::now()),
        }
    }

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

    /// Get the creation timestamp, if recorded.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
