//! Locale canonicalization and the compatibility rule from the design
//! (§4.1): a stored locale is compatible with an active one if they're
//! equal, or one is the language-only prefix of the other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Suffixes stripped from a raw locale string before it's ever stored.
/// `de_DE.utf-8` and `de_DE.UTF-8@euro` both canonicalize to `de_DE`.
const CRUFT_ENCODINGS: &[&str] = &["utf-8", "utf8", "UTF-8", "UTF8", "ISO-8859-1", "iso-8859-1"];

/// Placeholder locales that real metadata sometimes carries by accident
/// and that never represent a real translation.
const CRUFT_PLACEHOLDERS: &[&str] = &["x-test", "xx", "C.UTF-8"];

pub const FALLBACK_LOCALE: &str = "C";

/// Strips an encoding suffix (`.utf-8`, `.UTF-8@euro`, ...) and a trailing
/// modifier, leaving `lang[_TERRITORY]`. Placeholder locales canonicalize
/// to `None`, meaning "drop this entry".
pub fn canonicalize(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if CRUFT_PLACEHOLDERS.contains(&raw) {
        return None;
    }

    // Strip `@modifier` first, then `.codeset`.
    let without_modifier = raw.split('@').next().unwrap_or(raw);
    let mut without_codeset = without_modifier;
    for enc in CRUFT_ENCODINGS {
        if let Some(stripped) = without_modifier.strip_suffix(&format!(".{enc}")) {
            without_codeset = stripped;
            break;
        }
    }

    if without_codeset.is_empty() {
        return None;
    }
    Some(without_codeset.to_string())
}

/// The language-only prefix of a canonical locale (`de_DE` -> `de`).
pub fn language_prefix(locale: &str) -> &str {
    locale.split('_').next().unwrap_or(locale)
}

/// Is `stored` usable for an active locale `active`, per §4.1:
/// exact match, `stored` is the language prefix of `active`, or `active`
/// is the language prefix of `stored` and there is no exact match for
/// `active` available (the caller passes `exact_available` for that last
/// case since it requires looking at the whole map).
pub fn compatible(stored: &str, active: &str, exact_available: bool) -> bool {
    if stored == active {
        return true;
    }
    if stored == language_prefix(active) {
        return true;
    }
    if active == language_prefix(stored) && !exact_available {
        return true;
    }
    false
}

/// A map from canonical locale to value, with the compatibility lookup
/// rule baked in. Cruft locales are stripped at insertion time so lookups
/// never have to special-case them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `raw_locale`, dropping cruft locales silently.
    /// Returns `true` if the value was kept.
    pub fn insert(&mut self, raw_locale: &str, value: impl Into<String>) -> bool {
        match canonicalize(raw_locale) {
            Some(locale) => {
                self.0.insert(locale, value.into());
                true
            }
            None => false,
        }
    }

    pub fn get_exact(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Resolves the best value for `active`, falling back to the
    /// language-only prefix, then to `C`, per §4.1.
    pub fn get(&self, active: &str) -> Option<&str> {
        if let Some(v) = self.0.get(active) {
            return Some(v);
        }
        let exact_available = self.0.contains_key(active);
        for (locale, value) in &self.0 {
            if compatible(locale, active, exact_available) {
                return Some(value);
            }
        }
        self.0.get(FALLBACK_LOCALE).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for LocalizedText {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (locale, value) in iter {
            map.insert(&locale, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_encoding_and_modifier() {
        assert_eq!(canonicalize("de_DE.UTF-8@euro").as_deref(), Some("de_DE"));
        assert_eq!(canonicalize("de_DE.utf-8").as_deref(), Some("de_DE"));
        assert_eq!(canonicalize("en_US").as_deref(), Some("en_US"));
    }

    #[test]
    fn drops_placeholders() {
        assert_eq!(canonicalize("x-test"), None);
        assert_eq!(canonicalize(""), None);
    }

    #[test]
    fn exact_match_wins() {
        let mut map = LocalizedText::new();
        map.insert("en", "Hello");
        map.insert("en_GB", "Hiya");
        assert_eq!(map.get("en_GB"), Some("Hiya"));
    }

    #[test]
    fn language_prefix_fallback() {
        let mut map = LocalizedText::new();
        map.insert("de", "Hallo");
        assert_eq!(map.get("de_DE"), Some("Hallo"));
    }

    #[test]
    fn reverse_prefix_fallback_only_without_exact() {
        let mut map = LocalizedText::new();
        map.insert("de_DE", "Hallo");
        map.insert("de_AT", "Servus");
        // Active "de" has no exact entry, so either territory-specific
        // value is an acceptable compatible match.
        assert!(map.get("de").is_some());
    }

    #[test]
    fn falls_back_to_c() {
        let mut map = LocalizedText::new();
        map.insert("C", "Default");
        assert_eq!(map.get("ja_JP"), Some("Default"));
    }
}
