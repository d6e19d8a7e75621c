//! Desktop-entry ingest (§4.4): builds a minimal Component out of a
//! freedesktop `.desktop` file for applications that ship no metainfo of
//! their own.
//!
//! No crate in the dependency stack understands the desktop-entry INI
//! dialect, so this reads it directly: `[Group]` headers, `Key=Value` and
//! `Key[locale]=Value` lines, `#`-comments, blank lines ignored.

use std::collections::BTreeSet;

use crate::component::*;
use crate::context::{Context, FormatKind, FormatStyle};
use crate::error::Result;
use crate::parsers::ParseOutcome;

const MAIN_GROUP: &str = "Desktop Entry";

/// Category names rejected from [`Component::categories`] (§4.4): toolkit
/// and desktop-environment markers that describe how an application is
/// built or which DE it targets, not what it does, plus any vendor's
/// `X-`-prefixed extension category. Everything else passes through
/// unfiltered — the registry of "real" category names is open-ended and
/// a denylist is the only way to keep a legitimate one like `TextEditor`
/// or `Calculator` from being silently dropped.
const REJECTED_CATEGORY_MARKERS: &[&str] = &["GTK", "Qt", "GNOME", "KDE", "GUI", "Application"];

fn is_rejected_category(category: &str) -> bool {
    category.starts_with("X-") || REJECTED_CATEGORY_MARKERS.contains(&category)
}

struct Entry {
    key: String,
    locale: Option<String>,
    value: String,
}

fn parse_lines(text: &str) -> (Option<Vec<Entry>>, Vec<String>) {
    let mut groups: Vec<(String, Vec<Entry>)> = Vec::new();
    let mut other_groups = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].to_string();
            groups.push((name, Vec::new()));
            continue;
        }
        let Some((raw_key, value)) = line.split_once('=') else { continue };
        let Some((_, entries)) = groups.last_mut() else { continue };

        let raw_key = raw_key.trim();
        let (key, locale) = match raw_key.find('[') {
            Some(start) if raw_key.ends_with(']') => (
                raw_key[..start].to_string(),
                Some(raw_key[start + 1..raw_key.len() - 1].to_string()),
            ),
            _ => (raw_key.to_string(), None),
        };
        entries.push(Entry {
            key,
            locale,
            value: value.trim().to_string(),
        });
    }

    let main = groups
        .iter()
        .find(|(name, _)| name == MAIN_GROUP)
        .map(|(_, entries)| entries_clone(entries));
    for (name, _) in &groups {
        if name != MAIN_GROUP {
            other_groups.push(name.clone());
        }
    }
    (main, other_groups)
}

fn entries_clone(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .map(|e| Entry {
            key: e.key.clone(),
            locale: e.locale.clone(),
            value: e.value.clone(),
        })
        .collect()
}

fn get_one<'a>(entries: &'a [Entry], key: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|e| e.key == key && e.locale.is_none())
        .map(|e| e.value.as_str())
}

fn get_bool(entries: &[Entry], key: &str) -> Option<bool> {
    get_one(entries, key).map(|v| v.eq_ignore_ascii_case("true"))
}

fn get_localized(entries: &[Entry], key: &str) -> crate::locale::LocalizedText {
    let mut text = crate::locale::LocalizedText::new();
    for entry in entries.iter().filter(|e| e.key == key) {
        let locale = entry.locale.as_deref().unwrap_or("C");
        text.insert(locale, entry.value.clone());
    }
    text
}

fn get_list(entries: &[Entry], key: &str) -> Vec<String> {
    get_one(entries, key)
        .map(|v| v.split(';').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Derives the reverse-DNS-ish component id that represents this
/// desktop-entry file, from its basename (`org.example.App.desktop` ->
/// `org.example.App`). Files whose basename has no dot are still accepted,
/// producing a single-label id that `Component::has_valid_id` will flag as
/// invalid rather than the parser rejecting the file outright (§4.4).
pub fn id_from_filename(filename: &str) -> String {
    filename.strip_suffix(".desktop").unwrap_or(filename).to_string()
}

/// Reads a `.desktop` file into a Component, or `None` if the entry should
/// not be surfaced in a catalog (`NoDisplay`, `Hidden`, a non-Application
/// `Type`, or `X-AppStream-Ignore=true`) (§4.4).
pub fn parse(bytes: &[u8], desktop_id: &str) -> Result<Option<ParseOutcome<Component>>> {
    let text = String::from_utf8_lossy(bytes);
    // Desktop entries are meant to be UTF-8; non-UTF-8 bytes are replaced
    // rather than aborting the file, matching the parser's "bad field,
    // not a bad file" posture elsewhere (§7).
    let (Some(entries), _other_groups) = parse_lines(&text) else {
        return Ok(None);
    };

    if get_one(&entries, "Type").is_some_and(|t| t != "Application") {
        return Ok(None);
    }
    if get_bool(&entries, "NoDisplay").unwrap_or(false) {
        return Ok(None);
    }
    if get_bool(&entries, "Hidden").unwrap_or(false) {
        return Ok(None);
    }
    if get_bool(&entries, "X-AppStream-Ignore").unwrap_or(false) {
        return Ok(None);
    }
    let id = id_from_filename(desktop_id);
    let mut component = Component::new(id, ComponentKind::DesktopApplication);
    component.name = get_localized(&entries, "Name");
    component.summary = get_localized(&entries, "Comment");
    component.keywords = get_list(&entries, "Keywords").into_iter().collect();

    let categories: BTreeSet<String> = get_list(&entries, "Categories")
        .into_iter()
        .filter(|c| !is_rejected_category(c))
        .collect();
    component.categories = categories;

    for mime in get_list(&entries, "MimeType") {
        component
            .provides
            .entry(ProvideKind::MimeType)
            .or_default()
            .push(Provide::new(ProvideKind::MimeType, mime));
    }

    if let Some(icon) = get_one(&entries, "Icon") {
        component.icons.push(Icon::new(IconKind::Stock, icon));
    }

    component
        .launchables
        .push(Launchable::new(LaunchableKind::DesktopId, desktop_id.to_string()));

    component.set_context(Context::new(
        crate::locale::FALLBACK_LOCALE.to_string(),
        FormatStyle::Metainfo,
        FormatKind::DesktopEntry,
    ));

    let mut outcome = ParseOutcome::new(component);
    if outcome.value.name.is_empty() {
        outcome.push_issue(crate::error::Issue::warning(format!(
            "desktop entry {desktop_id} has no usable Name"
        )));
    }
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_application() {
        let contents = r#"[Desktop Entry]
Type=Application
Name=Foo
Name[de]=Füü
Comment=A foo app
Categories=Utility;Development;
Keywords=bar;baz;
Icon=foo-icon
"#;
        let outcome = parse(contents.as_bytes(), "org.example.Foo.desktop").unwrap().unwrap();
        assert_eq!(outcome.value.id.as_str(), "org.example.Foo");
        assert_eq!(outcome.value.name.get("C"), Some("Foo"));
        assert_eq!(outcome.value.name.get_exact("de"), Some("Füü"));
        assert!(outcome.value.categories.contains("Utility"));
        assert_eq!(outcome.value.launchables[0].entry, "org.example.Foo.desktop");
    }

    #[test]
    fn no_display_is_skipped() {
        let contents = "[Desktop Entry]\nType=Application\nName=Foo\nNoDisplay=true\n";
        assert!(parse(contents.as_bytes(), "org.example.Foo.desktop").unwrap().is_none());
    }

    #[test]
    fn hidden_is_skipped() {
        let contents = "[Desktop Entry]\nType=Application\nName=Foo\nHidden=true\n";
        assert!(parse(contents.as_bytes(), "org.example.Foo.desktop").unwrap().is_none());
    }

    #[test]
    fn non_application_type_is_skipped() {
        let contents = "[Desktop Entry]\nType=Link\nName=Foo\nURL=https://example.org\n";
        assert!(parse(contents.as_bytes(), "org.example.Foo.desktop").unwrap().is_none());
    }

    #[test]
    fn appstream_ignore_is_skipped() {
        let contents = "[Desktop Entry]\nType=Application\nName=Foo\nX-AppStream-Ignore=true\n";
        assert!(parse(contents.as_bytes(), "org.example.Foo.desktop").unwrap().is_none());
    }

    #[test]
    fn a_real_category_outside_the_freedesktop_registry_is_kept() {
        let contents = "[Desktop Entry]\nType=Application\nName=Foo\nCategories=Utility;Calculator;\n";
        let outcome = parse(contents.as_bytes(), "x.desktop").unwrap().unwrap();
        assert_eq!(outcome.value.categories.len(), 2);
        assert!(outcome.value.categories.contains("Calculator"));
    }

    #[test]
    fn toolkit_and_desktop_environment_markers_are_dropped() {
        let contents =
            "[Desktop Entry]\nType=Application\nName=Foo\nCategories=Utility;GTK;Qt;GNOME;KDE;GUI;Application;X-Vendor-Extra;\n";
        let outcome = parse(contents.as_bytes(), "x.desktop").unwrap().unwrap();
        assert_eq!(outcome.value.categories.len(), 1);
        assert!(outcome.value.categories.contains("Utility"));
    }
}
