//! The Component model (§3, §4).
//!
//! A single struct tagged by [`ComponentKind`] plus role-specific
//! sub-records, rather than a class hierarchy: "is this kind?" becomes
//! pattern matching on `kind` (§9 "deep inheritance").

pub mod bundle;
pub mod content_rating;
pub mod icon;
pub mod id;
pub mod launchable;
pub mod provide;
pub mod relation;
pub mod release;
pub mod screenshot;
pub mod url;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::context::Context;
use crate::locale::LocalizedText;

pub use bundle::{Bundle, BundleKind};
pub use content_rating::ContentRating;
pub use icon::{Icon, IconKind};
pub use id::ComponentId;
pub use launchable::{Launchable, LaunchableKind};
pub use provide::{Provide, ProvideKind};
pub use relation::{Relation, RelationItemKind, RelationKind, VersionComparison};
pub use release::{Release, ReleaseKind};
pub use screenshot::{Screenshot, ScreenshotMedia};
pub use url::{UrlRole, Urls};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum ComponentKind {
    Generic,
    DesktopApplication,
    ConsoleApplication,
    WebApplication,
    Addon,
    Font,
    Codec,
    InputMethod,
    Firmware,
    Driver,
    Localization,
    Service,
    Repository,
    OperatingSystem,
    Runtime,
    IconTheme,
}

impl Default for ComponentKind {
    fn default() -> Self {
        ComponentKind::Generic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum Scope {
    System,
    User,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::System
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
pub enum MergeKind {
    None,
    Append,
    Replace,
    RemoveComponent,
}

impl Default for MergeKind {
    fn default() -> Self {
        MergeKind::None
    }
}

/// The composite key the Indexer partitions index entries by (§3). Dedup
/// within a single origin is on `id` alone — this key only matters once
/// several origins/scopes/architectures are in play at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub id: ComponentId,
    pub scope: Scope,
    pub bundle_kind: Option<BundleKind>,
    pub origin: String,
    pub architecture: Option<String>,
    pub branch: Option<String>,
}

/// A fully loaded, queryable unit of software metadata.
///
/// Becomes read-only once published into a Pool's index; mutation is only
/// permitted during parsing and merge application (§3 Lifecycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub scope: Scope,
    pub origin: String,
    pub format_kind_xml: bool,
    /// Whether `origin` names a distribution collection catalog
    /// (`Context::format_style` was `Collection` at parse time) rather
    /// than an upstream metainfo/desktop-entry document. Persisted
    /// alongside `origin` itself (unlike `context`, which is
    /// parse-scoped) so the Indexer's collision tie-break (§4.6) still
    /// has the signal after a cache round-trip.
    #[serde(default)]
    pub from_collection: bool,
    pub priority: i32,
    pub merge_kind: MergeKind,

    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub summary: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub developer_name: LocalizedText,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,

    #[serde(default)]
    pub icons: Vec<Icon>,
    #[serde(default)]
    pub urls: Urls,
    #[serde(default)]
    pub launchables: Vec<Launchable>,
    #[serde(default)]
    pub provides: HashMap<ProvideKind, Vec<Provide>>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub content_rating: Option<ContentRating>,

    pub source_package: Option<String>,
    #[serde(default)]
    pub binary_packages: Vec<String>,

    pub architecture: Option<String>,
    pub branch: Option<String>,
    pub bundle_kind: Option<BundleKind>,
    pub extends: Vec<ComponentId>,

    /// Back-references resolved by the addon pass (§4.6, §10.5). Weak:
    /// stored by id, re-looked-up through the Pool rather than owned.
    #[serde(skip)]
    pub extended_by: Vec<ComponentId>,

    /// Tokens extracted for search (§4.7), keyed by the locale they were
    /// built for, derived from `name`/`summary`/`description`/`keywords`.
    /// Not serialized into the cache (§4.8) — rebuilding it on load is
    /// cheap enough that persisting a derived index alongside the data it
    /// was derived from isn't worth the extra cache bytes or staleness
    /// risk if the derivation logic changes between versions.
    #[serde(skip)]
    pub search_tokens: Option<Arc<HashMap<String, Vec<crate::search::Token>>>>,

    #[serde(skip)]
    pub context: Context,
}

impl Component {
    pub fn new(id: impl Into<ComponentId>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            scope: Scope::System,
            origin: String::new(),
            format_kind_xml: true,
            from_collection: false,
            priority: 0,
            merge_kind: MergeKind::None,
            name: LocalizedText::new(),
            summary: LocalizedText::new(),
            description: LocalizedText::new(),
            developer_name: LocalizedText::new(),
            keywords: BTreeSet::new(),
            categories: BTreeSet::new(),
            icons: Vec::new(),
            urls: Urls::new(),
            launchables: Vec::new(),
            provides: HashMap::new(),
            bundles: Vec::new(),
            releases: Vec::new(),
            screenshots: Vec::new(),
            relations: Vec::new(),
            content_rating: None,
            source_package: None,
            binary_packages: Vec::new(),
            architecture: None,
            branch: None,
            bundle_kind: None,
            extends: Vec::new(),
            extended_by: Vec::new(),
            search_tokens: None,
            context: Context::default(),
        }
    }

    /// Identity key used by the Indexer (§3, §4.6).
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            id: self.id.clone(),
            scope: self.scope,
            bundle_kind: self.bundle_kind,
            origin: self.origin.clone(),
            architecture: self.architecture.clone(),
            branch: self.branch.clone(),
        }
    }

    /// Replaces the Context, re-resolving whatever localized views are
    /// requested next (§4.1: "replacing the Context is permitted").
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
        self.search_tokens = None;
    }

    pub fn localized_name(&self) -> Option<&str> {
        self.name.get(self.context.active_locale())
    }

    pub fn localized_summary(&self) -> Option<&str> {
        self.summary.get(self.context.active_locale())
    }

    pub fn localized_description(&self) -> Option<&str> {
        self.description.get(self.context.active_locale())
    }

    pub fn icon(&self, width: u32, height: u32, scale: u32) -> Option<&Icon> {
        icon::closest(&self.icons, width, height, scale)
    }

    pub fn default_screenshot(&self) -> Option<&Screenshot> {
        screenshot::default_screenshot(&self.screenshots)
    }

    pub fn provides_of(&self, kind: ProvideKind) -> &[Provide] {
        self.provides.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn content_rating_minimum_age(&self) -> Option<u32> {
        self.content_rating.as_ref().and_then(ContentRating::minimum_age)
    }

    /// §3 invariant: a reverse-DNS-shaped id.
    pub fn has_valid_id(&self) -> bool {
        self.id.is_valid()
    }

    /// Ensures releases stay sorted after mutation (parsers append as they
    /// read; merge's append operation re-sorts after extending the list).
    pub fn sort_releases(&mut self) {
        release::sort_descending(&mut self.releases);
    }
}
