//! # exptrack: Lightweight Experiment Tracking
//!
//! **Version**: 0.1.0
//!
//! exptrack persists, per experiment, a set of configuration parameters and
//! a set of step-indexed value series, and later reconstructs a
//! cross-experiment table and time series for comparison.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Jidoka**: Lifecycle guards stop logging without a bound experiment
//! - **Poka-Yoke safety**: Append-only history; reduced snapshots are derived
//! - **Genchi Genbutsu**: Plain YAML/CSV on disk, readable without the tool
//! - **Heijunka**: Aggregation tolerates experiments with differing schemas
//!
//! ## Example Usage
//!
//! ```rust
//! use exptrack::experiment::{RecordStore, Reduce};
//! use exptrack::query::Dashboard;
//! use exptrack::Value;
//!
//! # fn main() -> exptrack::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let mut store = RecordStore::builder().log_root(dir.path()).build();
//!
//! store.start_experiment(Some("run1"))?;
//! store.log_params([("lr", 0.1)])?;
//! store.log_value("loss", 0.9, Some(0), Some(&Reduce::Minimum))?;
//! store.log_value("loss", 0.5, Some(1), Some(&Reduce::Minimum))?;
//! store.end_experiment()?;
//!
//! let summary = Dashboard::open(dir.path())?.summary_table()?;
//! assert_eq!(summary.rows()[0].get("values", "loss"), &Value::Float(0.5));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod query;
pub mod value;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use value::{Map, Value};
