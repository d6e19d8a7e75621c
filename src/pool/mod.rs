//! The Pool (§5, §6): the public entry point. Ties parsers, the merge
//! engine, the indexer, the cache, and the file monitor together behind a
//! single `ArcSwap<Index>` so queries never observe a half-built reload.

pub mod config;
pub mod location;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use arc_swap::ArcSwap;

pub use config::{CacheFlags, ExtraLocation, PoolConfig, PoolFlags};
pub use location::{Location, SourceKind};

use crate::component::{Component, ComponentId, LaunchableKind, ProvideKind};
use crate::context::{Context, FormatKind, FormatStyle};
use crate::error::{AppStreamError, Issue, Result};
use crate::index::Index;
use crate::merge::apply_merges;
use crate::monitor::FileMonitor;
use crate::parsers::{desktop_entry, xml, yaml, ParsedEntry};
use crate::search::{self, SearchOptions, SearchResult};
use crate::{cache, utils};

/// A cooperative cancellation signal for [`Pool::load_async`] (§5, §9:
/// "cancellation is a token accepted as a parameter").
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Non-fatal results of a load, surfaced rather than logged-and-dropped so
/// a caller can show what was skipped (§7).
#[derive(Debug, Default)]
pub struct LoadReport {
    pub issues: Vec<Issue>,
    pub components_loaded: usize,
}

type Observer = Box<dyn Fn() + Send + Sync>;

/// A handle returned by [`Pool::on_changed`] (§9: "signals become an
/// observer registration returning a cancellation handle").
pub struct ChangedSubscription {
    id: u64,
    observers: Arc<Mutex<Vec<(u64, Observer)>>>,
}

impl ChangedSubscription {
    pub fn cancel(self) {
        self.observers.lock().unwrap().retain(|(id, _)| *id != self.id);
    }
}

pub struct Pool {
    config: PoolConfig,
    index: ArcSwap<Index>,
    cache: cache::Cache,
    loaded: AtomicBool,
    next_observer_id: AtomicU64,
    observers: Arc<Mutex<Vec<(u64, Observer)>>>,
    monitor: Mutex<Option<FileMonitor>>,
}

impl Pool {
    pub fn new(config: PoolConfig) -> Self {
        let cache_dir = config.cache_location.clone().unwrap_or_else(default_cache_dir);
        Self {
            config,
            index: ArcSwap::from_pointee(Index::default()),
            cache: cache::Cache::new(cache_dir),
            loaded: AtomicBool::new(false),
            next_observer_id: AtomicU64::new(0),
            observers: Arc::new(Mutex::new(Vec::new())),
            monitor: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.index.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synchronous, blocking load (§5).
    pub fn load(&self) -> Result<LoadReport> {
        self.load_impl(None)
    }

    /// Cancellable load returning a future (§5, §9). The token is checked
    /// between each search location and again before the merge/index pass;
    /// a cancelled load leaves the previously installed index untouched
    /// and writes no cache entries.
    pub async fn load_async(&self, cancel: CancellationToken) -> Result<LoadReport> {
        self.load_impl(Some(&cancel))
    }

    /// Re-scans every location and swaps in a fresh index, reusing
    /// whatever cache entries are still valid. Called by the monitor's
    /// debounce flush when `pool_flags.monitor` is set.
    pub fn refresh(&self) -> Result<LoadReport> {
        self.load()
    }

    fn load_impl(&self, cancel: Option<&CancellationToken>) -> Result<LoadReport> {
        let locations = self.gather_locations();

        let mut all_components = Vec::new();
        let mut all_merge_ops = Vec::new();
        let mut issues = Vec::new();
        let mut live_origins = Vec::new();

        for location in &locations {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(AppStreamError::Cancelled);
            }

            let files = location::discover_files(location);
            if files.is_empty() {
                continue;
            }
            live_origins.push(location.origin.clone());

            let fingerprint = cache::fingerprint_directory(&files);
            let cached = if self.config.cache_flags.refresh_always {
                None
            } else {
                self.cache.load(&location.origin, fingerprint).unwrap_or(None)
            };

            let (components, merge_ops) = match cached {
                Some(mut components) => {
                    for component in &mut components {
                        component.scope = location.scope;
                    }
                    (components, Vec::new())
                }
                None => {
                    let (mut components, merge_ops, file_issues) =
                        parse_location(location, &files, &self.config.active_locale);
                    issues.extend(file_issues);
                    apply_merges(&mut components, merge_ops.clone());

                    if !self.config.cache_flags.read_only && !self.config.cache_flags.no_write {
                        if let Err(e) = self.cache.store(&location.origin, fingerprint, &components) {
                            log::warn!("failed to write cache for {}: {e}", location.origin);
                        }
                    }
                    (components, merge_ops)
                }
            };

            all_components.extend(components);
            all_merge_ops.extend(merge_ops);
        }

        if !self.config.cache_flags.no_write {
            if let Err(e) = self.cache.prune(&live_origins) {
                log::debug!("cache prune failed: {e}");
            }
        }

        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(AppStreamError::Cancelled);
        }

        // Idempotent by construction (merge.rs), so re-applying ops already
        // baked into a cache-hit origin's components is harmless — this is
        // what lets a merge targeting a freshly-parsed origin's component
        // from a cache-hit origin's merge document still take effect.
        apply_merges(&mut all_components, all_merge_ops);

        let components_loaded = all_components.len();
        let mut builder = Index::builder();
        builder.extend(all_components);
        let mut index = builder.build();

        if self.config.pool_flags.resolve_addons {
            index.resolve_addons();
        }
        for component in index.all_mut() {
            search::ensure_tokens(component, &self.config.active_locale, false);
        }

        self.index.store(Arc::new(index));
        self.loaded.store(true, Ordering::Release);
        self.notify_changed();

        Ok(LoadReport { issues, components_loaded })
    }

    fn gather_locations(&self) -> Vec<Location> {
        let mut locations = Vec::new();
        if self.config.load_std_locations {
            locations.extend(location::standard_locations(&self.config.pool_flags));
        }
        for extra in &self.config.extra_locations {
            let kind = match extra.style {
                FormatStyle::Metainfo => SourceKind::Metainfo,
                FormatStyle::Collection => SourceKind::Collection,
            };
            locations.push(Location {
                directory: extra.path.clone(),
                style: extra.style,
                kind,
                scope: crate::component::Scope::System,
                origin: extra.path.display().to_string(),
            });
        }
        locations
    }

    /// Starts the file monitor (§4.9) over every currently-configured
    /// location, triggering [`Pool::refresh`] on a debounced batch of
    /// changes. Requires an `Arc<Pool>` since the monitor's callback runs
    /// on its own background thread indefinitely.
    pub fn start_monitoring(self: &Arc<Self>) -> Result<()> {
        let directories: Vec<PathBuf> = self
            .gather_locations()
            .into_iter()
            .map(|location| location.directory)
            .collect();

        let weak: Weak<Pool> = Arc::downgrade(self);
        let monitor = FileMonitor::start(directories, move |changes| {
            if changes.is_empty() {
                return;
            }
            let Some(pool) = weak.upgrade() else { return };
            log::debug!("file monitor observed {} change(s), refreshing", changes.len());
            if let Err(e) = pool.refresh() {
                log::warn!("refresh after file change failed: {e}");
            }
        })?;

        *self.monitor.lock().unwrap() = Some(monitor);
        Ok(())
    }

    pub fn stop_monitoring(&self) {
        *self.monitor.lock().unwrap() = None;
    }

    /// Registers a callback invoked after every successful reload (§5: "the
    /// `changed` signal... is emitted after the new index is installed").
    pub fn on_changed(&self, callback: impl Fn() + Send + Sync + 'static) -> ChangedSubscription {
        let id = self.next_observer_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().unwrap().push((id, Box::new(callback)));
        ChangedSubscription { id, observers: Arc::clone(&self.observers) }
    }

    fn notify_changed(&self) {
        for (_, callback) in self.observers.lock().unwrap().iter() {
            callback();
        }
    }

    fn warn_if_not_loaded(&self) {
        if !self.is_loaded() {
            log::warn!("query issued before the pool's first load completed; returning an empty result");
        }
    }

    pub fn by_id(&self, id: &str) -> Vec<Component> {
        self.warn_if_not_loaded();
        self.index.load().by_id(id).into_iter().cloned().collect()
    }

    pub fn by_provide(&self, kind: ProvideKind, value: &str) -> Vec<Component> {
        self.warn_if_not_loaded();
        self.index.load().by_provide(kind, value).into_iter().cloned().collect()
    }

    pub fn by_launchable(&self, kind: LaunchableKind, value: &str) -> Vec<Component> {
        self.warn_if_not_loaded();
        self.index.load().by_launchable(kind, value).into_iter().cloned().collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<Component> {
        self.warn_if_not_loaded();
        self.index.load().by_category(category).into_iter().cloned().collect()
    }

    pub fn all(&self) -> Vec<Component> {
        self.warn_if_not_loaded();
        self.index.load().all().cloned().collect()
    }

    pub fn extended_by(&self, id: &str) -> Vec<ComponentId> {
        self.by_id(id).into_iter().flat_map(|c| c.extended_by).collect()
    }

    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        self.warn_if_not_loaded();
        let guard = self.index.load();
        if options.locale == self.config.active_locale {
            search::query(guard.all(), query, options)
        } else {
            // A locale the Pool didn't pre-tokenize for: tokenize ad hoc
            // rather than mutating the published, shared Index.
            let mut scratch: Vec<Component> = guard.all().cloned().collect();
            for component in &mut scratch {
                search::ensure_tokens(component, &options.locale, options.locale_use_all);
            }
            search::query(&scratch, query, options)
        }
    }
}

fn default_cache_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("APPSTREAM_CACHE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
    PathBuf::from(home).join(".cache/appstream")
}

fn parse_location(location: &Location, files: &[PathBuf], active_locale: &str) -> (Vec<Component>, Vec<crate::merge::MergeOp>, Vec<Issue>) {
    use rayon::prelude::*;

    let results: Vec<(Vec<Component>, Vec<crate::merge::MergeOp>, Vec<Issue>)> = files
        .par_iter()
        .map(|path| parse_one_file(location, path, active_locale))
        .collect();

    let mut components = Vec::new();
    let mut merges = Vec::new();
    let mut issues = Vec::new();
    for (c, m, i) in results {
        components.extend(c);
        merges.extend(m);
        issues.extend(i);
    }
    (components, merges, issues)
}

fn parse_one_file(
    location: &Location,
    path: &Path,
    active_locale: &str,
) -> (Vec<Component>, Vec<crate::merge::MergeOp>, Vec<Issue>) {
    let bytes = match utils::read_possibly_compressed(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("skipping {}: {e}", path.display());
            return (Vec::new(), Vec::new(), vec![Issue::warning(e.to_string()).with_path(path)]);
        }
    };

    match location.kind {
        SourceKind::Metainfo | SourceKind::AppdataLegacy => {
            let context = Context::new(active_locale.to_string(), FormatStyle::Metainfo, FormatKind::Xml);
            match xml::parse_metainfo(&bytes, context) {
                Ok(mut outcome) => {
                    outcome.value.origin = location.origin.clone();
                    outcome.value.scope = location.scope;
                    outcome.value.from_collection = false;
                    if location.kind == SourceKind::AppdataLegacy {
                        outcome.value.priority -= 10;
                        outcome.issues.push(Issue::warning(format!(
                            "{} is in the legacy appdata location; move it to metainfo",
                            path.display()
                        )));
                    }
                    (vec![outcome.value], Vec::new(), with_paths(outcome.issues, path))
                }
                Err(e) => {
                    log::warn!("failed to parse {}: {e}", path.display());
                    (Vec::new(), Vec::new(), vec![Issue::warning(e.to_string()).with_path(path)])
                }
            }
        }
        SourceKind::Collection => {
            let result = if is_yaml_like(path) {
                yaml::parse_collection(&bytes)
            } else {
                xml::parse_collection(&bytes)
            };
            match result {
                Ok(outcome) => split_entries(outcome, location, path),
                Err(e) => {
                    log::warn!("failed to parse collection {}: {e}", path.display());
                    (Vec::new(), Vec::new(), vec![Issue::warning(e.to_string()).with_path(path)])
                }
            }
        }
        SourceKind::DesktopEntry => {
            let desktop_id = path.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
            match desktop_entry::parse(&bytes, &desktop_id) {
                Ok(Some(mut outcome)) => {
                    outcome.value.origin = location.origin.clone();
                    outcome.value.scope = location.scope;
                    outcome.value.from_collection = false;
                    outcome.value.priority -= 20;
                    (vec![outcome.value], Vec::new(), with_paths(outcome.issues, path))
                }
                Ok(None) => (Vec::new(), Vec::new(), Vec::new()),
                Err(e) => {
                    log::warn!("failed to parse desktop entry {}: {e}", path.display());
                    (Vec::new(), Vec::new(), vec![Issue::warning(e.to_string()).with_path(path)])
                }
            }
        }
    }
}

fn split_entries(
    outcome: crate::parsers::ParseOutcome<Vec<ParsedEntry>>,
    location: &Location,
    path: &Path,
) -> (Vec<Component>, Vec<crate::merge::MergeOp>, Vec<Issue>) {
    let mut components = Vec::new();
    let mut merges = Vec::new();
    for entry in outcome.value {
        match entry {
            ParsedEntry::Component(mut component) => {
                component.scope = location.scope;
                component.from_collection = true;
                components.push(component);
            }
            ParsedEntry::Merge(op) => merges.push(op),
        }
    }
    (components, merges, with_paths(outcome.issues, path))
}

fn with_paths(mut issues: Vec<Issue>, path: &Path) -> Vec<Issue> {
    for issue in &mut issues {
        if issue.path.is_none() {
            issue.path = Some(path.to_path_buf());
        }
    }
    issues
}

fn is_yaml_like(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.contains(".yml") || name.contains(".yaml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn xml_component(id: &str, name: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><component><id>{id}</id><name>{name}</name><summary>A test app</summary></component>"#
        )
    }

    #[test]
    fn loads_a_single_metainfo_file_from_an_extra_location() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("org.example.Foo.metainfo.xml"), xml_component("org.example.Foo", "Foo")).unwrap();

        let config = PoolConfig::new()
            .with_load_std_locations(false)
            .with_extra_location(dir.path(), FormatStyle::Metainfo)
            .with_cache_location(tempfile::tempdir().unwrap().keep());
        let pool = Pool::new(config);
        pool.load().unwrap();

        let found = pool.by_id("org.example.Foo");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.get("C"), Some("Foo"));
    }

    #[test]
    fn query_before_first_load_is_empty_not_a_panic() {
        let pool = Pool::new(PoolConfig::new().with_load_std_locations(false));
        assert!(pool.by_id("org.example.Foo").is_empty());
    }

    #[test]
    fn changed_observer_fires_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = PoolConfig::new()
            .with_load_std_locations(false)
            .with_extra_location(dir.path(), FormatStyle::Metainfo)
            .with_cache_location(tempfile::tempdir().unwrap().keep());
        let pool = Pool::new(config);

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let _subscription = pool.on_changed(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        pool.load().unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelled_load_does_not_install_an_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("org.example.Foo.metainfo.xml"), xml_component("org.example.Foo", "Foo")).unwrap();

        let config = PoolConfig::new()
            .with_load_std_locations(false)
            .with_extra_location(dir.path(), FormatStyle::Metainfo)
            .with_cache_location(tempfile::tempdir().unwrap().keep());
        let pool = Pool::new(config);

        let token = CancellationToken::new();
        token.cancel();
        let result = futures::executor::block_on(pool.load_async(token));
        assert!(matches!(result, Err(AppStreamError::Cancelled)));
        assert!(pool.by_id("org.example.Foo").is_empty());
    }
}
