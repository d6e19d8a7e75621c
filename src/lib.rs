//! AppStream metadata pool: discovery, parsing, merging, caching and
//! search for software component catalogs.
//!
//! # Module Structure
//! - [`locale`]: locale matching and the `LocalizedText` map every
//!   human-readable field is stored as.
//! - [`version`]: the `1.0~beta1 < 1.0` version comparator releases sort by.
//! - [`context`]: per-document parse environment (active locale, media base
//!   URL, origin, priority default).
//! - [`component`]: the `Component` model and its sub-records (icons,
//!   releases, provides, relations, content ratings, ...).
//! - [`parsers`]: metainfo/collection XML, DEP-11 YAML, and desktop-entry
//!   readers.
//! - [`merge`]: applies queued append/replace/remove-component ops.
//! - [`index`]: the four lookup structures a loaded catalog is queried
//!   through.
//! - [`search`]: free-text search over an index's cached tokens.
//! - [`cache`]: the on-disk parse cache, keyed by a directory fingerprint.
//! - [`monitor`]: debounced filesystem watching for live reloads.
//! - [`utils`]: transparent `.gz`/`.xz`/`.zst` decompression.
//! - [`pool`]: [`Pool`], the struct tying every other module together.
//! - [`error`]: the shared `AppStreamError`/`Issue` taxonomy.

pub mod cache;
pub mod component;
pub mod context;
pub mod error;
pub mod index;
pub mod locale;
pub mod merge;
pub mod monitor;
pub mod parsers;
pub mod pool;
pub mod search;
pub mod utils;
pub mod version;

pub use component::{Component, ComponentKind};
pub use error::{AppStreamError, Issue, Result};
pub use pool::{CacheFlags, ChangedSubscription, Pool, PoolConfig, PoolFlags};
