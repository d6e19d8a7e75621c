//! Metadata parsers (§4.2, §4.3, §4.4): table-driven element handling
//! shared in spirit (if not in one literal jump table) between the XML and
//! YAML readers, since each maps a textual key — an element name or a
//! YAML mapping key — onto the same semantic fields of [`Component`].
//!
//! Per-format readers live in [`xml`], [`yaml`], [`desktop_entry`]. This
//! module holds what both readers need: the restricted description markup
//! subset, text normalization, and the category-name allowlist the
//! desktop-entry ingest also consumes.

pub mod desktop_entry;
pub mod xml;
pub mod yaml;

use crate::component::Component;
use crate::error::Issue;
use crate::merge::MergeOp;

/// One document/root-element read out of a metainfo or collection file:
/// either an ordinary Component, or a merge pseudo-component queued for the
/// merge engine (§4.5).
pub enum ParsedEntry {
    Component(Component),
    Merge(MergeOp),
}

/// Element/tag names accepted inside a `<description>` / YAML
/// `description` block (§4.2): `p`, `ul`/`ol` with `li`, `em`, `code`.
/// Anything else is reported as a warning but does not abort the file.
pub const DESCRIPTION_MARKUP_SUBSET: &[&str] = &["p", "ul", "ol", "li", "em", "code"];

pub fn is_allowed_description_tag(tag: &str) -> bool {
    DESCRIPTION_MARKUP_SUBSET.contains(&tag)
}

/// Trims and folds line breaks the way both parsers normalize text content
/// before storing it (§4.2).
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A parse result that carries along whatever non-fatal issues were
/// recorded while reading, per §7's propagation policy (a bad field
/// doesn't abort the file).
#[derive(Debug, Default)]
pub struct ParseOutcome<T> {
    pub value: T,
    pub issues: Vec<Issue>,
}

impl<T> ParseOutcome<T> {
    pub fn new(value: T) -> Self {
        Self { value, issues: Vec::new() }
    }

    pub fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }
}
