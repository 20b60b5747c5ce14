//! Experiment naming policy and identifier generation

use uuid::Uuid;

use crate::{Error, Result};

/// Longest accepted experiment name.
pub const MAX_NAME_LEN: usize = 128;

/// Source of fresh experiment identifiers.
///
/// Identifiers name directories under the log root, so they must be
/// filesystem-safe and effectively collision-free.
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier.
    fn generate(&self) -> String;
}

/// Default generator: hyphen-less UUIDv4 strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Validate an optional experiment name.
///
/// An absent name is accepted. A present name must be non-empty, at most
/// [`MAX_NAME_LEN`] bytes, use only ASCII letters, digits, `-`, `_`, `.`,
/// and must not start with `.`.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] if the name fails the policy.
pub fn validate_experiment_name(name: Option<&str>) -> Result<()> {
    let Some(name) = name else {
        return Ok(());
    };
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

/// Validate a value key before it is used as a series file stem.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] for empty keys, `.`/`..`, or keys
/// containing path separators or NUL.
pub fn validate_value_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}
