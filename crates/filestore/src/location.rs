//! Logical file locations

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Location of a file in storage
///
/// A "/"-joined relative path such as `reports/2024/jan.csv`. The value
/// never starts with a slash: exactly one leading "/" is stripped on
/// construction. Nothing else is normalized, so `a//b` and `a/../b` are
/// kept as written.
///
/// The normalized string is the literal key every backend uses, whether
/// as a map key, a path under the root directory, or an object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    value: String,
}

impl Location {
    /// Create a location from a single path string
    pub fn new(value: impl Into<String>) -> Self {
        let mut value = value.into();
        if value.starts_with('/') {
            value.remove(0);
        }
        Self { value }
    }

    /// Create a location by joining parts with "/"
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|part| part.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("/");
        Self::new(joined)
    }

    /// The normalized path string
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl FromStr for Location {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}
