//! Free-text search (§4.7): tokenize, optionally stem, score by field
//! weight, AND-match every query token, rank by score then priority then
//! id.

pub mod stemmer;

use std::collections::HashMap;
use std::sync::Arc;

use crate::component::{Component, ComponentId, ProvideKind};

pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 2;
pub const DEFAULT_MIN_SCORE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Provides,
    Category,
    Summary,
    Name,
    Keyword,
    Id,
}

impl Field {
    /// Weight contributed per matching token, id > keyword > name >
    /// summary > category > provides (§4.7).
    pub fn weight(self) -> u32 {
        match self {
            Field::Id => 60,
            Field::Keyword => 50,
            Field::Name => 40,
            Field::Summary => 30,
            Field::Category => 20,
            Field::Provides => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub field: Field,
}

/// Lowercases, splits on non-alphanumeric boundaries, drops tokens shorter
/// than `min_length`.
pub fn tokenize(text: &str, min_length: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= min_length)
        .map(str::to_string)
        .collect()
}

/// Builds the token cache for one Component under one locale (§4.7):
/// id segments, name (all locales if `locale_use_all`), summary, keywords,
/// categories, provided binaries, and MIME types.
pub fn build_tokens(component: &Component, locale: &str, locale_use_all: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let min_len = DEFAULT_MIN_TOKEN_LENGTH;

    for segment in component.id.as_str().split('.') {
        for t in tokenize(segment, min_len) {
            tokens.push(Token { text: t, field: Field::Id });
        }
    }

    if locale_use_all {
        for name in component.name.values() {
            for t in tokenize(name, min_len) {
                tokens.push(Token { text: t, field: Field::Name });
            }
        }
    } else if let Some(name) = component.name.get(locale) {
        for t in tokenize(name, min_len) {
            tokens.push(Token { text: t, field: Field::Name });
        }
    }

    if let Some(summary) = component.summary.get(locale) {
        for t in tokenize(summary, min_len) {
            tokens.push(Token { text: t, field: Field::Summary });
        }
    }

    for keyword in &component.keywords {
        for t in tokenize(keyword, min_len) {
            tokens.push(Token { text: t, field: Field::Keyword });
        }
    }

    for category in &component.categories {
        for t in tokenize(category, min_len) {
            tokens.push(Token { text: t, field: Field::Category });
        }
    }

    for provide in component.provides_of(ProvideKind::Binary) {
        for t in tokenize(&provide.value, min_len) {
            tokens.push(Token { text: t, field: Field::Provides });
        }
    }
    for provide in component.provides_of(ProvideKind::MimeType) {
        for t in tokenize(&provide.value, min_len) {
            tokens.push(Token { text: t, field: Field::Provides });
        }
    }

    tokens
}

/// Ensures `component.search_tokens` has an entry for `locale`, building
/// it if necessary. Mutates in place; called by the Pool before a query
/// pass and cached for the component's lifetime in the index.
pub fn ensure_tokens(component: &mut Component, locale: &str, locale_use_all: bool) {
    let needs_build = match &component.search_tokens {
        Some(cache) => !cache.contains_key(locale),
        None => true,
    };
    if !needs_build {
        return;
    }
    let tokens = build_tokens(component, locale, locale_use_all);
    let mut cache = match component.search_tokens.take() {
        Some(arc) => (*arc).clone(),
        None => HashMap::new(),
    };
    cache.insert(locale.to_string(), tokens);
    component.search_tokens = Some(Arc::new(cache));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub locale: String,
    pub locale_use_all: bool,
    pub stemming: bool,
    pub min_token_length: usize,
    pub min_score: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            locale: crate::locale::FALLBACK_LOCALE.to_string(),
            locale_use_all: false,
            stemming: false,
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: ComponentId,
    pub score: u32,
}

/// Runs a query across `components`, whose `search_tokens` cache must
/// already contain `options.locale` (the Pool ensures this before calling
/// in). Returns matches ranked by score desc, then Component priority
/// desc, then id asc — stable and deterministic (§8).
pub fn query<'a>(
    components: impl IntoIterator<Item = &'a Component>,
    query: &str,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let query_tokens = tokenize(query, options.min_token_length);

    let components: Vec<&Component> = components.into_iter().collect();
    let priorities: HashMap<&str, i32> = components.iter().map(|c| (c.id.as_str(), c.priority)).collect();
    let rank_key = |r: &SearchResult| {
        (
            std::cmp::Reverse(priorities.get(r.id.as_str()).copied().unwrap_or(0)),
            r.id.as_str().to_string(),
        )
    };

    // Below the minimum token length entirely: "browse" (§4.7).
    if query.trim().chars().count() < options.min_token_length || query_tokens.is_empty() {
        let mut all: Vec<SearchResult> = components
            .iter()
            .map(|c| SearchResult { id: c.id.clone(), score: 0 })
            .collect();
        all.sort_by(|a, b| rank_key(a).cmp(&rank_key(b)));
        return all;
    }

    let query_tokens: Vec<String> = if options.stemming {
        query_tokens.iter().map(|t| stemmer::stem(t, &options.locale)).collect()
    } else {
        query_tokens
    };

    let mut results = Vec::new();
    for component in &components {
        let Some(cache) = &component.search_tokens else { continue };
        let Some(cached_tokens) = cache.get(&options.locale) else { continue };

        let mut total_score = 0u32;
        let mut matched_all = true;

        for query_token in &query_tokens {
            let best = cached_tokens
                .iter()
                .filter(|cached| {
                    let candidate = if options.stemming {
                        stemmer::stem(&cached.text, &options.locale)
                    } else {
                        cached.text.clone()
                    };
                    candidate == *query_token
                })
                .map(|cached| cached.field.weight())
                .max();

            match best {
                Some(weight) => total_score += weight,
                None => {
                    matched_all = false;
                    break;
                }
            }
        }

        if matched_all && total_score >= options.min_score {
            results.push(SearchResult {
                id: component.id.clone(),
                score: total_score,
            });
        }
    }

    results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| rank_key(a).cmp(&rank_key(b))));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    fn sample(id: &str, name: &str) -> Component {
        let mut c = Component::new(id, ComponentKind::DesktopApplication);
        c.name.insert("C", name);
        ensure_tokens(&mut c, "C", false);
        c
    }

    #[test]
    fn below_min_length_browses_everything() {
        let components = vec![sample("org.example.A", "Alpha"), sample("org.example.B", "Beta")];
        let opts = SearchOptions::default();
        let results = query(components.iter(), "s", &opts);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn exact_name_token_matches() {
        let components = vec![sample("org.example.Calc", "Calculator")];
        let opts = SearchOptions::default();
        let results = query(components.iter(), "calculator", &opts);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn stemming_matches_inflected_query() {
        let components = vec![sample("org.example.Calc", "Calculator")];
        let mut opts = SearchOptions::default();
        opts.stemming = true;
        let results = query(components.iter(), "calculating", &opts);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn and_semantics_require_every_token() {
        let components = vec![sample("org.example.Calc", "Calculator Pro")];
        let opts = SearchOptions::default();
        let both = query(components.iter(), "calculator pro", &opts);
        let nonsense = query(components.iter(), "calculator zzzznomatch", &opts);
        assert_eq!(both.len(), 1);
        assert_eq!(nonsense.len(), 0);
    }

    #[test]
    fn monotonicity_more_tokens_never_adds_results() {
        let components = vec![sample("org.example.Calc", "Calculator Pro")];
        let opts = SearchOptions::default();
        let short = query(components.iter(), "calculator", &opts);
        let long = query(components.iter(), "calculator pro extra", &opts);
        assert!(long.len() <= short.len());
    }
}
