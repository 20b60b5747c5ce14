//! Snapshot reducers
//!
//! A reducer folds each newly logged value into the "best so far" value kept
//! in `values.yaml`: `best = reduce(new, previous_best)`. The first call for
//! a key sees no previous value.

use std::cmp::Ordering;

use crate::value::Value;

/// Strategy that chooses the snapshot value for a key.
///
/// Only left-to-right fold determinism is assumed; implementations need not
/// be associative or commutative.
pub trait Reducer {
    /// Combine a newly logged value with the previous snapshot, if any.
    fn reduce(&self, new: &Value, previous: Option<&Value>) -> Value;
}

/// Built-in reducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    /// Always keep the most recently logged value.
    Newest,
    /// Keep the smallest value seen (e.g. loss).
    Minimum,
    /// Keep the largest value seen (e.g. accuracy).
    Maximum,
}

impl Reduce {
    fn keep_new(self, new: &Value, previous: &Value) -> bool {
        match self {
            Self::Newest => true,
            Self::Minimum => new.scalar_cmp(previous) == Some(Ordering::Less),
            Self::Maximum => new.scalar_cmp(previous) == Some(Ordering::Greater),
        }
    }
}

impl Reducer for Reduce {
    // An absent or null previous value is always replaced. Incomparable
    // pairs (NaN, mixed kinds) keep the previous value.
    fn reduce(&self, new: &Value, previous: Option<&Value>) -> Value {
        match previous {
            Some(prev) if !prev.is_null() && !self.keep_new(new, prev) => prev.clone(),
            _ => new.clone(),
        }
    }
}

impl<F> Reducer for F
where
    F: Fn(&Value, Option<&Value>) -> Value,
{
    fn reduce(&self, new: &Value, previous: Option<&Value>) -> Value {
        self(new, previous)
    }
}
