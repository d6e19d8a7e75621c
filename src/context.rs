//! The environment a block of parsed metadata was read under (§4.1).
//!
//! A Component belongs to exactly one `Context` for its lifetime, but the
//! `Context` itself is cheap to clone (`Arc`-free on purpose — contexts are
//! small and short-lived per load) and replacing it re-resolves whatever
//! localized views the caller asks for next.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::locale::{self, FALLBACK_LOCALE};

/// Metainfo is a single upstream-authored component; Collection is a
/// distribution-aggregated catalog (XML `<components>` or a DEP-11 YAML
/// stream). The style changes which attributes are expected at the root
/// and whether `origin`/`priority` are inherited from a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatStyle {
    Metainfo,
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Xml,
    Yaml,
    DesktopEntry,
}

#[derive(Debug, Clone)]
pub struct Context {
    active_locale: String,
    locale_use_all: bool,
    media_base_url: Option<Arc<Url>>,
    origin: String,
    architecture: Option<String>,
    priority_default: i32,
    format_style: FormatStyle,
    format_kind: FormatKind,
    format_version: Option<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            active_locale: FALLBACK_LOCALE.to_string(),
            locale_use_all: false,
            media_base_url: None,
            origin: String::new(),
            architecture: None,
            priority_default: 0,
            format_style: FormatStyle::Metainfo,
            format_kind: FormatKind::Xml,
            format_version: None,
        }
    }
}

impl Context {
    pub fn new(active_locale: impl Into<String>, format_style: FormatStyle, format_kind: FormatKind) -> Self {
        Self {
            active_locale: active_locale.into(),
            format_style,
            format_kind,
            ..Default::default()
        }
    }

    pub fn active_locale(&self) -> &str {
        &self.active_locale
    }

    pub fn set_active_locale(&mut self, locale: impl Into<String>) {
        self.active_locale = locale.into();
    }

    pub fn locale_use_all(&self) -> bool {
        self.locale_use_all
    }

    pub fn set_locale_use_all(&mut self, value: bool) {
        self.locale_use_all = value;
    }

    pub fn media_base_url(&self) -> Option<&Url> {
        self.media_base_url.as_deref()
    }

    pub fn set_media_base_url(&mut self, url: Option<Url>) {
        self.media_base_url = url.map(Arc::new);
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.origin = origin.into();
    }

    pub fn architecture(&self) -> Option<&str> {
        self.architecture.as_deref()
    }

    pub fn set_architecture(&mut self, arch: Option<String>) {
        self.architecture = arch;
    }

    pub fn priority_default(&self) -> i32 {
        self.priority_default
    }

    pub fn set_priority_default(&mut self, priority: i32) {
        self.priority_default = priority;
    }

    pub fn format_style(&self) -> FormatStyle {
        self.format_style
    }

    pub fn format_kind(&self) -> FormatKind {
        self.format_kind
    }

    pub fn format_version(&self) -> Option<&str> {
        self.format_version.as_deref()
    }

    pub fn set_format_version(&mut self, version: Option<String>) {
        self.format_version = version;
    }

    /// Resolves a relative media path against `media_base_url`, as applied
    /// to icon/screenshot URLs during parsing. Absolute URLs pass through.
    pub fn resolve_media_url(&self, raw: &str) -> String {
        if raw.contains("://") {
            return raw.to_string();
        }
        match &self.media_base_url {
            Some(base) => base
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => raw.to_string(),
        }
    }

    /// Strips `media_base_url` back off a URL on serialization, the
    /// inverse of [`Context::resolve_media_url`]. Only strips an exact
    /// prefix match; anything else (including already-relative paths) is
    /// returned unchanged.
    pub fn strip_media_url<'a>(&self, resolved: &'a str) -> &'a str {
        match &self.media_base_url {
            Some(base) => resolved.strip_prefix(base.as_str()).unwrap_or(resolved),
            None => resolved,
        }
    }

    /// A locale is compatible per §4.1; `exact_available` must be computed
    /// by the caller (it depends on the full set of locales a given field
    /// carries, not on the Context alone).
    pub fn locale_compatible(&self, stored: &str, exact_available: bool) -> bool {
        locale::compatible(stored, &self.active_locale, exact_available)
    }
}
