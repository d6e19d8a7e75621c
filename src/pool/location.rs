//! Standard search locations (§6): where the Pool looks for metadata when
//! `PoolConfig::load_std_locations` is set, honoring `XDG_DATA_DIRS` /
//! `XDG_DATA_HOME` for the system/user split.

use std::env;
use std::path::PathBuf;

use crate::component::Scope;
use crate::context::FormatStyle;
use crate::pool::config::PoolFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Metainfo,
    /// `/usr/share/appdata` — superseded by `metainfo`, kept for backward
    /// compatibility; the Pool logs a deprecation notice per file found.
    AppdataLegacy,
    Collection,
    DesktopEntry,
}

#[derive(Debug, Clone)]
pub struct Location {
    pub directory: PathBuf,
    pub style: FormatStyle,
    pub kind: SourceKind,
    pub scope: Scope,
    /// Origin name used for cache keying and index priority lookups; for
    /// the standard locations this is derived from the directory itself.
    pub origin: String,
}

fn xdg_data_home() -> PathBuf {
    if let Ok(dir) = env::var("XDG_DATA_HOME") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = env::var("HOME").unwrap_or_else(|_| "/root".to_string());
    PathBuf::from(home).join(".local/share")
}

fn xdg_data_dirs() -> Vec<PathBuf> {
    match env::var("XDG_DATA_DIRS") {
        Ok(dirs) if !dirs.is_empty() => dirs.split(':').map(PathBuf::from).collect(),
        _ => vec![PathBuf::from("/usr/local/share"), PathBuf::from("/usr/share")],
    }
}

fn push_tree(locations: &mut Vec<Location>, data_dir: &PathBuf, scope: Scope, flags: &PoolFlags) {
    let origin_prefix = data_dir.display().to_string();

    if flags.load_metainfo {
        locations.push(Location {
            directory: data_dir.join("metainfo"),
            style: FormatStyle::Metainfo,
            kind: SourceKind::Metainfo,
            scope,
            origin: format!("{origin_prefix}/metainfo"),
        });
        locations.push(Location {
            directory: data_dir.join("appdata"),
            style: FormatStyle::Metainfo,
            kind: SourceKind::AppdataLegacy,
            scope,
            origin: format!("{origin_prefix}/appdata"),
        });
    }

    if flags.load_os_collection {
        for format in ["xml", "yaml"] {
            locations.push(Location {
                directory: data_dir.join("swcatalog").join(format),
                style: FormatStyle::Collection,
                kind: SourceKind::Collection,
                scope,
                origin: format!("{origin_prefix}/swcatalog/{format}"),
            });
        }
    }

    if flags.load_desktop_files {
        locations.push(Location {
            directory: data_dir.join("applications"),
            style: FormatStyle::Metainfo,
            kind: SourceKind::DesktopEntry,
            scope,
            origin: format!("{origin_prefix}/applications"),
        });
    }
}

/// Builds the full standard-locations list: every `XDG_DATA_DIRS` entry and
/// the mutable `/var/lib/swcatalog` tree for system scope, plus
/// `XDG_DATA_HOME` for user scope (§6).
pub fn standard_locations(flags: &PoolFlags) -> Vec<Location> {
    let mut locations = Vec::new();

    for data_dir in xdg_data_dirs() {
        push_tree(&mut locations, &data_dir, Scope::System, flags);
    }

    if flags.load_os_collection {
        for format in ["xml", "yaml"] {
            locations.push(Location {
                directory: PathBuf::from("/var/lib/swcatalog").join(format),
                style: FormatStyle::Collection,
                kind: SourceKind::Collection,
                scope: Scope::System,
                origin: format!("/var/lib/swcatalog/{format}"),
            });
        }
    }

    push_tree(&mut locations, &xdg_data_home(), Scope::User, flags);

    locations
}

/// Extensions (after stripping a leading `.`) accepted for a given source
/// kind, including the transparent-compression variants (§6).
fn accepted_extensions(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::Metainfo | SourceKind::AppdataLegacy => {
            &["xml", "xml.gz", "xml.xz", "xml.zst"]
        }
        SourceKind::Collection => &[
            "xml", "xml.gz", "xml.xz", "xml.zst", "yml", "yml.gz", "yml.xz", "yml.zst", "yaml",
        ],
        SourceKind::DesktopEntry => &["desktop"],
    }
}

fn matches_extension(filename: &str, exts: &[&str]) -> bool {
    exts.iter().any(|ext| filename.ends_with(&format!(".{ext}")))
}

/// Lists the files under `location.directory` this Pool would read, sorted
/// for deterministic document order (§4.5 depends on it).
pub fn discover_files(location: &Location) -> Vec<PathBuf> {
    if !location.directory.is_dir() {
        return Vec::new();
    }
    let exts = accepted_extensions(location.kind);
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&location.directory)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| !name.starts_with('.') && matches_extension(name, exts))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_xml_and_compressed_variants() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.xml"), b"<component/>").unwrap();
        std::fs::write(dir.path().join("b.xml.gz"), b"").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), b"").unwrap();
        std::fs::write(dir.path().join(".hidden.xml"), b"").unwrap();

        let location = Location {
            directory: dir.path().to_path_buf(),
            style: FormatStyle::Metainfo,
            kind: SourceKind::Metainfo,
            scope: Scope::System,
            origin: "test".to_string(),
        };
        let files = discover_files(&location);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn missing_directory_yields_no_files() {
        let location = Location {
            directory: PathBuf::from("/does/not/exist"),
            style: FormatStyle::Metainfo,
            kind: SourceKind::Metainfo,
            scope: Scope::System,
            origin: "test".to_string(),
        };
        assert!(discover_files(&location).is_empty());
    }

    #[test]
    fn standard_locations_respects_flags() {
        let mut flags = PoolFlags::default();
        flags.load_desktop_files = false;
        flags.load_os_collection = false;
        let locations = standard_locations(&flags);
        assert!(locations.iter().all(|l| l.kind != SourceKind::DesktopEntry && l.kind != SourceKind::Collection));
    }
}
