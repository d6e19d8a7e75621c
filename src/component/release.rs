//! Releases, kept sorted by version descending per §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::LocalizedText;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseKind {
    Stable,
    Development,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    pub kind: String,
    pub platform: Option<String>,
    pub url: Option<String>,
    pub size_download: Option<u64>,
    pub size_installed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    pub kind: ReleaseKind,
    pub timestamp: Option<DateTime<Utc>>,
    pub urgency: Option<String>,
    #[serde(default)]
    pub description: LocalizedText,
    pub artifacts: Vec<ReleaseArtifact>,
}

impl Release {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            kind: ReleaseKind::Stable,
            timestamp: None,
            urgency: None,
            description: LocalizedText::new(),
            artifacts: Vec::new(),
        }
    }
}

/// Inserts `release` into `releases`, keeping the list sorted descending
/// by version. Used by both the parsers (as releases are appended) and the
/// merge engine's append operation.
pub fn insert_sorted(releases: &mut Vec<Release>, release: Release) {
    let pos = releases
        .binary_search_by(|existing| crate::version::compare_desc(&existing.version, &release.version))
        .unwrap_or_else(|pos| pos);
    releases.insert(pos, release);
}

pub fn sort_descending(releases: &mut [Release]) {
    releases.sort_by(|a, b| crate::version::compare_desc(&a.version, &b.version));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sorted_keeps_descending_order() {
        let mut releases = Vec::new();
        insert_sorted(&mut releases, Release::new("1.0"));
        insert_sorted(&mut releases, Release::new("2.0"));
        insert_sorted(&mut releases, Release::new("1.5"));
        let versions: Vec<_> = releases.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["2.0", "1.5", "1.0"]);
    }
}
