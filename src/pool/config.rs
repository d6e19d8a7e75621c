//! Pool configuration (§6 "Pool configuration"): a plain, serde-round-trippable
//! struct built with [`Default`] plus builder-style setters, the way `glotctl`
//! shapes its `Config` around `.glotrc.json` — except nothing here is read
//! from disk by the crate itself; the embedding application owns that.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::FormatStyle;
use crate::locale::FALLBACK_LOCALE;

/// A caller-supplied directory to load in addition to the standard
/// locations (§6), tagged with the style its files should be parsed as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraLocation {
    pub path: PathBuf,
    pub style: FormatStyle,
}

impl ExtraLocation {
    pub fn new(path: impl Into<PathBuf>, style: FormatStyle) -> Self {
        Self { path: path.into(), style }
    }
}

/// Flags gating cache behavior (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFlags {
    /// Use a cached entry even if it's older than the files it describes,
    /// as long as the fingerprint still matches.
    pub ignore_age: bool,
    /// Never write to the cache directory.
    pub read_only: bool,
    /// Read cached entries but never write new ones (distinct from
    /// `read_only`: `no_write` still allows pruning stale entries).
    pub no_write: bool,
    /// Bypass the cache entirely and re-parse every file on every load.
    pub refresh_always: bool,
}

impl Default for CacheFlags {
    fn default() -> Self {
        Self {
            ignore_age: false,
            read_only: false,
            no_write: false,
            refresh_always: false,
        }
    }
}

/// Flags gating which standard sources are loaded and which post-load
/// passes run (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFlags {
    pub monitor: bool,
    pub resolve_addons: bool,
    pub load_os_collection: bool,
    pub load_flatpak: bool,
    pub load_metainfo: bool,
    pub load_desktop_files: bool,
}

impl Default for PoolFlags {
    fn default() -> Self {
        Self {
            monitor: false,
            resolve_addons: true,
            load_os_collection: true,
            load_flatpak: false,
            load_metainfo: true,
            load_desktop_files: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub extra_locations: Vec<ExtraLocation>,
    pub load_std_locations: bool,
    pub cache_location: Option<PathBuf>,
    pub cache_flags: CacheFlags,
    pub pool_flags: PoolFlags,
    pub active_locale: String,
    pub strict: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            extra_locations: Vec::new(),
            load_std_locations: true,
            cache_location: None,
            cache_flags: CacheFlags::default(),
            pool_flags: PoolFlags::default(),
            active_locale: FALLBACK_LOCALE.to_string(),
            strict: false,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_location(mut self, path: impl Into<PathBuf>, style: FormatStyle) -> Self {
        self.extra_locations.push(ExtraLocation::new(path, style));
        self
    }

    pub fn with_load_std_locations(mut self, value: bool) -> Self {
        self.load_std_locations = value;
        self
    }

    pub fn with_cache_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_location = Some(path.into());
        self
    }

    pub fn with_cache_flags(mut self, flags: CacheFlags) -> Self {
        self.cache_flags = flags;
        self
    }

    pub fn with_pool_flags(mut self, flags: PoolFlags) -> Self {
        self.pool_flags = flags;
        self
    }

    pub fn with_active_locale(mut self, locale: impl Into<String>) -> Self {
        self.active_locale = locale.into();
        self
    }

    pub fn with_strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let config = PoolConfig::new()
            .with_extra_location("/opt/vendor/metainfo", FormatStyle::Metainfo)
            .with_active_locale("de_DE");
        let json = serde_json::to_string(&config).unwrap();
        let restored: PoolConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.active_locale, "de_DE");
        assert_eq!(restored.extra_locations.len(), 1);
    }

    #[test]
    fn default_flags_match_spec_defaults() {
        let config = PoolConfig::default();
        assert!(config.load_std_locations);
        assert!(config.pool_flags.load_metainfo);
        assert!(config.pool_flags.resolve_addons);
        assert!(!config.pool_flags.monitor);
    }
}
