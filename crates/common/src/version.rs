//! Optimistic concurrency token.

use serde::{Deserialize, Serialize};

/// Version number for a persisted record, used for optimistic concurrency
/// control.
///
/// Versions start at 1 when a record is first inserted and increment by 1 on
/// every successful write. A writer passes the version it read; the store
/// rejects the write if the stored version no longer matches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the first version (1) for a newly inserted record.
    pub const fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert!(Version::first() < Version::first().next());
        assert_eq!(Version::new(2), Version::first().next());
    }

    #[test]
    fn version_roundtrip() {
        let v = Version::new(7);
        assert_eq!(Version::from(v.as_i64()), v);
    }
}
