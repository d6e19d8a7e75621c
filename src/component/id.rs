//! Component identifier validation (§3 invariants).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// `label[.label]+`, each label ASCII alnum plus `-_`, no label starting
/// with a digit. The reverse-DNS prefix (TLD, vendor) is conventionally
/// lowercase but the final, human-facing segment commonly is not (e.g.
/// `org.inkscape.Inkscape`), so case itself isn't restricted — only the
/// shape is. Two or more segments are required; three or more recommended.
fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*(\.[A-Za-z0-9][A-Za-z0-9_-]*)+$").unwrap()
    })
}

pub fn is_valid(id: &str) -> bool {
    id_pattern().is_match(id)
}

pub fn segment_count(id: &str) -> usize {
    id.split('.').count()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Constructs without validating — used by merge targets and cache
    /// deserialization, where a previously-accepted id must round-trip
    /// even if validation rules tighten later.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        is_valid(&self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self::new_unchecked(s)
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self::new_unchecked(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reverse_dns() {
        assert!(is_valid("org.inkscape.Inkscape"));
        assert!(is_valid("org.fwupd.lvfs"));
    }

    #[test]
    fn accepts_legacy_desktop_style() {
        assert!(is_valid("kiki.desktop"));
    }

    #[test]
    fn rejects_single_segment() {
        assert!(!is_valid("inkscape"));
    }

    #[test]
    fn rejects_leading_digit_label() {
        assert!(!is_valid("org.2fwupd.lvfs"));
    }

    #[test]
    fn accepts_mixed_case_final_segment() {
        assert!(is_valid("org.inkscape.Inkscape"));
        assert!(is_valid("org.gnome.design.Contrast"));
    }
}
