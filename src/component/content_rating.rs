//! Content rating: the component's self-declared attribute set, plus the
//! minimal CSM (Common Sense Media) minimum-age mapping the Pool needs to
//! answer "is this appropriate for age N" queries. Full per-region
//! formatting and the rest of the taxonomy are out of scope (§1, §10.5).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRating {
    pub kind: String,
    /// Attribute id (e.g. `violence-cartoon`) -> declared intensity
    /// (`none`, `mild`, `moderate`, `intense`).
    pub attributes: BTreeMap<String, String>,
}

/// The intersection of attributes this table knows about and the minimum
/// age each intensity level maps to. Attributes not listed here, or
/// intensities below `mild`, don't raise the minimum age.
///
/// Source-bug note (§9 open question): the original implementation this
/// crate's behavior is modeled on contains a loop bounded by a constant
/// instead of the array length, which makes it consider only the first
/// attribute's row. That is a defect, not a behavior to replicate — this
/// implementation iterates every attribute and every one of its rows.
const CSM_TABLE: &[(&str, &[(&str, u32)])] = &[
    (
        "violence-cartoon",
        &[("mild", 3), ("moderate", 4), ("intense", 6)],
    ),
    (
        "violence-fantasy",
        &[("mild", 6), ("moderate", 7), ("intense", 8)],
    ),
    (
        "violence-realistic",
        &[("mild", 7), ("moderate", 9), ("intense", 14)],
    ),
    ("language-profanity", &[("mild", 8), ("moderate", 11), ("intense", 14)]),
    ("drugs-alcohol", &[("mild", 9), ("moderate", 11), ("intense", 14)]),
    ("sex-nudity", &[("mild", 9), ("moderate", 12), ("intense", 18)]),
    ("money-gambling", &[("mild", 7), ("moderate", 10), ("intense", 18)]),
];

/// Minimum recommended age for a single `(attribute, intensity)` pair, or
/// `None` if the attribute is unknown to this table or the intensity is
/// `none`/unrecognized.
pub fn attribute_minimum_age(attribute: &str, intensity: &str) -> Option<u32> {
    for (known_attribute, rows) in CSM_TABLE {
        if *known_attribute != attribute {
            continue;
        }
        for (known_intensity, age) in *rows {
            if *known_intensity == intensity {
                return Some(*age);
            }
        }
        return None;
    }
    None
}

impl ContentRating {
    /// The overall minimum age: the maximum over every declared attribute
    /// that this table recognizes. Returns `None` if nothing rated raises
    /// the age (e.g. an empty rating, or one this table doesn't cover).
    pub fn minimum_age(&self) -> Option<u32> {
        self.attributes
            .iter()
            .filter_map(|(attr, intensity)| attribute_minimum_age(attr, intensity))
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn considers_every_attribute_not_just_the_first() {
        let mut rating = ContentRating::default();
        rating.attributes.insert("violence-cartoon".into(), "mild".into());
        rating.attributes.insert("sex-nudity".into(), "intense".into());
        assert_eq!(rating.minimum_age(), Some(18));
    }

    #[test]
    fn unknown_attribute_contributes_nothing() {
        let mut rating = ContentRating::default();
        rating.attributes.insert("made-up-attribute".into(), "intense".into());
        assert_eq!(rating.minimum_age(), None);
    }
}
