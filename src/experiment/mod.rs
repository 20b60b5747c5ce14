//! Experiment Record Store
//!
//! Owns the on-disk state of one experiment: metadata, merge-updated
//! parameters, append-only value series, and a reduced "best so far"
//! snapshot per key.
//!
//! ## Record Overview
//!
//! ```text
//! ExperimentMeta (1)  written once
//!   ├── params        key -> Value, last write wins per key
//!   ├── values        key -> reduced Value (only keys logged with a reducer)
//!   └── series (N)    key -> [(step, value)], append-only
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use exptrack::experiment::{RecordStore, Reduce};
//!
//! # fn main() -> exptrack::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let mut store = RecordStore::new(dir.path());
//! store.start_experiment(Some("baseline"))?;
//!
//! store.log_params([("lr", 0.001), ("momentum", 0.9)])?;
//! for step in 0..10_i32 {
//!     let loss = 1.0 / (f64::from(step) + 1.0);
//!     store.log_value("loss", loss, Some(i64::from(step)), Some(&Reduce::Minimum))?;
//! }
//!
//! store.end_experiment()?;
//! # Ok(())
//! # }
//! ```

pub mod document;
mod meta;
pub mod naming;
mod reducer;
pub mod series;
mod store;

pub use meta::ExperimentMeta;
pub use naming::{IdGenerator, UuidGenerator};
pub use reducer::{Reduce, Reducer};
pub use series::SeriesRow;
pub use store::{ActiveExperiment, RecordStore, RecordStoreBuilder};
