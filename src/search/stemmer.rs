//! A small, dependency-free suffix-stripping stemmer keyed on locale
//! language (§4.7 "optionally stem each token using a language-specific
//! stemmer keyed on the active locale"). No crate in this crate's
//! ecosystem neighborhood provides off-the-shelf stemming tables, so this
//! is hand-rolled in the style of the rest of the search module: plain
//! data-driven suffix rules, applied longest-suffix-first.
//!
//! This is intentionally modest — a Porter-style reduction for English
//! plus a couple of Romance-language plurals — not a full linguistic
//! stemmer. It exists to make `"calculating"` match a component named
//! `"Calculator"` (§8 scenario 2), not to out-stem a real NLP library.

/// Suffix rules per language prefix, longest suffix tried first so that,
/// e.g., `"ational"` is preferred over `"al"` when both would match.
fn rules_for(language: &str) -> &'static [(&'static str, &'static str)] {
    match language {
        // "C" is the POSIX fallback locale (§4.1) and carries the
        // untranslated, normally English-language strings, so it stems
        // the same as "en" rather than falling through to no rules.
        "en" | "C" => &[
            ("ational", "ate"),
            ("ization", "ize"),
            ("fulness", "ful"),
            ("iveness", "ive"),
            ("ousness", "ous"),
            ("ing", ""),
            ("edly", ""),
            ("ied", "y"),
            ("ies", "y"),
            ("ed", ""),
            ("es", ""),
            ("s", ""),
        ],
        "es" | "it" | "pt" => &[("ando", ""), ("iendo", ""), ("ción", ""), ("es", ""), ("s", "")],
        "de" => &[("ungen", ""), ("ung", ""), ("en", ""), ("er", ""), ("e", "")],
        "fr" => &[("ations", "ation"), ("ement", ""), ("ments", "ment"), ("es", ""), ("s", "")],
        _ => &[],
    }
}

/// Stems `token` for `locale`'s language. Tokens shorter than 4 bytes are
/// returned unchanged — stemming a 3-letter word tends to destroy it
/// rather than normalize it.
pub fn stem(token: &str, locale: &str) -> String {
    if token.len() < 4 {
        return token.to_string();
    }
    let language = crate::locale::language_prefix(locale);
    for (suffix, replacement) in rules_for(language) {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if stripped.len() >= 2 {
                return format!("{stripped}{replacement}");
            }
        }
    }
    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ing() {
        assert_eq!(stem("calculating", "en"), "calculat");
    }

    #[test]
    fn stem_of_calculator_matches_stem_of_calculating_prefix() {
        // Not identical words, but both reduce to forms that share a
        // prefix, which is what the tokenizer's substring-free matching
        // relies on in combination with scoring (see search::mod tests).
        let a = stem("calculating", "en");
        let b = "calculator";
        assert!(b.starts_with(&a[..a.len().min(6)]));
    }

    #[test]
    fn short_tokens_untouched() {
        assert_eq!(stem("cat", "en"), "cat");
    }

    #[test]
    fn unknown_language_untouched() {
        assert_eq!(stem("running", "xx"), "running");
    }

    #[test]
    fn fallback_locale_stems_like_english() {
        assert_eq!(stem("calculating", "C"), "calculat");
    }
}
