//! Typed file-level attribute values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A file attribute value: integer count, floating-point number, or text.
///
/// The metadata store and the matrix container are both loosely typed text
/// formats; values are narrowed to the most specific representation on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Non-negative integer (e.g. cell counts).
    Count(u64),
    /// Floating-point number.
    Number(f64),
    /// Free text.
    Text(String),
}

/// File-level attributes attached to a matrix file.
pub type FileAttrs = BTreeMap<String, AttrValue>;

impl AttrValue {
    /// Parse a raw text value, preferring the most specific type.
    pub fn parse(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<u64>() {
            return AttrValue::Count(n);
        }
        if let Ok(x) = raw.parse::<f64>() {
            return AttrValue::Number(x);
        }
        AttrValue::Text(raw.to_string())
    }

    /// Try to get as an integer count.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            AttrValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Count(n) => write!(f, "{}", n),
            AttrValue::Number(x) => write!(f, "{}", x),
            AttrValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<u64> for AttrValue {
    fn from(n: u64) -> Self {
        AttrValue::Count(n)
    }
}
