//! Document values
//!
//! Parameters, snapshots and series cells are all [`Value`]s: a closed
//! tagged union over the shapes a structured document can hold.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered mapping of string keys to values.
pub type Map = IndexMap<String, Value>;

/// A structured document value.
///
/// Integers and floats are kept apart so that `batch: 32` round-trips as an
/// integer while `lr: 0.1` stays a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent / null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// String-keyed mapping
    Map(Map),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value, if it is a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// String view of the value, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two scalars of compatible kind.
    ///
    /// Numbers compare numerically (ints and floats mix), strings
    /// lexicographically, booleans `false < true`. Everything else, and NaN,
    /// is incomparable.
    #[must_use]
    pub fn scalar_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// Encodes the value as a single table cell.
    ///
    /// Null is the empty cell; scalars are written as plain text and
    /// containers as compact JSON. A string that would read back as some
    /// other value (`""`, `"42"`, `"true"`, ...) is written JSON-quoted.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::String(s) if Self::cell_is_plain_string(s) => s.clone(),
            Self::String(s) => serde_json::to_string(s).unwrap_or_default(),
            Self::List(_) | Self::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Decodes a table cell written by [`Value::to_cell`].
    #[must_use]
    pub fn from_cell(cell: &str) -> Self {
        if cell.is_empty() {
            return Self::Null;
        }
        if cell.len() >= 2 && cell.starts_with('"') && cell.ends_with('"') {
            if let Ok(s) = serde_json::from_str::<String>(cell) {
                return Self::String(s);
            }
        }
        if let Ok(i) = cell.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return Self::Float(f);
        }
        match cell {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if cell.starts_with('[') || cell.starts_with('{') {
            if let Ok(v) = serde_json::from_str::<Self>(cell) {
                return v;
            }
        }
        Self::String(cell.to_string())
    }

    fn cell_is_plain_string(s: &str) -> bool {
        matches!(Self::from_cell(s), Self::String(decoded) if decoded == s)
    }
}

// Integral floats must not read back as integers.
fn format_float(f: f64) -> String {
    if !f.is_finite() || f.fract() != 0.0 {
        f.to_string()
    } else if f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        format!("{f:e}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => f.write_str(s),
            other => f.write_str(&other.to_cell()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_keeps_int_and_float_apart() {
        let doc: Map = serde_yaml::from_str("batch: 32\nlr: 0.1\nname: resnet\nflag: true\nnone: ~\n")
            .unwrap();
        assert_eq!(doc["batch"], Value::Int(32));
        assert_eq!(doc["lr"], Value::Float(0.1));
        assert_eq!(doc["name"], Value::from("resnet"));
        assert_eq!(doc["flag"], Value::Bool(true));
        assert_eq!(doc["none"], Value::Null);
    }

    #[test]
    fn test_yaml_preserves_key_order() {
        let doc: Map = serde_yaml::from_str("z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_cell_encoding() {
        assert_eq!(Value::Null.to_cell(), "");
        assert_eq!(Value::Float(1.0).to_cell(), "1.0");
        assert_eq!(Value::from_cell("1.0"), Value::Float(1.0));
        assert_eq!(Value::from_cell(&Value::Float(1e16).to_cell()), Value::Float(1e16));
        assert_eq!(Value::from_cell("3"), Value::Int(3));
        assert_eq!(Value::from_cell("false"), Value::Bool(false));
        assert_eq!(Value::from_cell("hello"), Value::from("hello"));
        assert_eq!(Value::from_cell(""), Value::Null);

        let list = Value::from(vec![1, 2]);
        assert_eq!(Value::from_cell(&list.to_cell()), list);
    }

    #[test]
    fn test_ambiguous_strings_round_trip() {
        for s in ["", "42", "-7", "1.5", "inf", "NaN", "true", "false", "[1, 2]", "{\"a\": 1}", "\"x\"", "\""] {
            let value = Value::from(s);
            assert_eq!(Value::from_cell(&value.to_cell()), value, "{s:?}");
        }
        assert_eq!(Value::from("42").to_cell(), "\"42\"");
        assert_eq!(Value::from("").to_cell(), "\"\"");
        assert_eq!(Value::from("resnet").to_cell(), "resnet");
    }

    #[test]
    fn test_scalar_cmp() {
        assert_eq!(Value::Int(1).scalar_cmp(&Value::Float(1.5)), Some(Ordering::Less));
        assert_eq!(Value::from("b").scalar_cmp(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::Float(f64::NAN).scalar_cmp(&Value::Float(1.0)), None);
        assert_eq!(Value::from("a").scalar_cmp(&Value::Int(1)), None);
    }
}
