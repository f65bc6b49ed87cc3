//! Catalog path normalization.
//!
//! Index entries store paths relative to the repository root (`skills/...`),
//! while the document root is already mounted at `skills/`. The leading
//! segment is dropped once so the fetch target does not repeat it.

use std::fmt;

/// Segment the index prepends to every path it records.
pub const REDUNDANT_PREFIX: &str = "skills/";

/// A record path with the redundant leading segment removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    /// Normalize a raw index path.
    ///
    /// Only a leading `skills/` is stripped, and only once. A path that
    /// mentions `skills/` anywhere else passes through untouched.
    pub fn normalize(raw: &str) -> Self {
        let stripped = raw.strip_prefix(REDUNDANT_PREFIX).unwrap_or(raw);
        Self(stripped.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, ignoring empty ones from stray slashes.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
