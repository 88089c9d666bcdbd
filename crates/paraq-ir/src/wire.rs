//! Logical wire labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-facing label for one logical wire.
///
/// Labels are either integers (`0`, `1`, ...) or names (`"q1"`, `"aux"`),
/// and deserialize untagged from JSON or YAML.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireLabel {
    /// Integer label.
    Index(i64),
    /// String label.
    Name(String),
}

impl fmt::Display for WireLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireLabel::Index(i) => write!(f, "{i}"),
            WireLabel::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for WireLabel {
    fn from(index: i64) -> Self {
        WireLabel::Index(index)
    }
}

impl From<i32> for WireLabel {
    fn from(index: i32) -> Self {
        WireLabel::Index(i64::from(index))
    }
}

impl From<u32> for WireLabel {
    fn from(index: u32) -> Self {
        WireLabel::Index(i64::from(index))
    }
}

impl From<&str> for WireLabel {
    fn from(name: &str) -> Self {
        WireLabel::Name(name.to_string())
    }
}

impl From<String> for WireLabel {
    fn from(name: String) -> Self {
        WireLabel::Name(name)
    }
}
