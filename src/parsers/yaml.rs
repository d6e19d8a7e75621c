//! The DEP-11 YAML reader (§4.3): a header document (`File: DEP-11`) followed
//! by one YAML document per component, separated by `---`.
//!
//! Field extraction works off [`serde_yaml::Value`] rather than a fixed
//! `#[derive(Deserialize)]` struct, since DEP-11 documents in the wild vary
//! in which optional keys are present and `Icon:` alone has two shapes (a
//! legacy single mapping and the current type-keyed list). The dispatch by
//! mapping key mirrors the XML reader's dispatch by element name.

use serde_yaml::Value;

use crate::component::*;
use crate::context::{Context, FormatKind, FormatStyle};
use crate::error::{AppStreamError, Issue, Result};
use crate::merge::MergeOp;
use crate::parsers::{ParseOutcome, ParsedEntry};

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

fn mapping<'a>(value: &'a Value) -> Option<&'a serde_yaml::Mapping> {
    value.as_mapping()
}

/// Reads a locale-keyed mapping (`{C: "...", de_DE: "..."}`) into a
/// [`crate::locale::LocalizedText`]. A bare scalar is treated as the `C`
/// value, which some hand-written DEP-11 fragments still use.
fn localized(value: &Value) -> crate::locale::LocalizedText {
    let mut text = crate::locale::LocalizedText::new();
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                if let (Some(lang), Some(s)) = (as_str(k), as_str(v)) {
                    text.insert(lang, s);
                }
            }
        }
        Value::String(s) => {
            text.insert("C", s.clone());
        }
        _ => {}
    }
    text
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(as_str).map(str::to_string).collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Parses an entire DEP-11 YAML stream into header-derived defaults plus
/// every component/merge document that follows.
pub fn parse_collection(bytes: &[u8]) -> Result<ParseOutcome<Vec<ParsedEntry>>> {
    let text = std::str::from_utf8(bytes).map_err(|e| AppStreamError::parse(e.to_string()))?;
    let mut documents = serde_yaml::Deserializer::from_str(text);

    let header_doc = documents
        .next()
        .ok_or_else(|| AppStreamError::parse("empty DEP-11 stream"))?;
    let header_value = Value::deserialize(header_doc)?;
    let header = mapping(&header_value).ok_or_else(|| AppStreamError::parse("DEP-11 header is not a mapping"))?;

    if header.get("File").and_then(as_str) != Some("DEP-11") {
        return Err(AppStreamError::parse("missing or invalid 'File: DEP-11' header"));
    }

    let mut context = Context::new(
        crate::locale::FALLBACK_LOCALE.to_string(),
        FormatStyle::Collection,
        FormatKind::Yaml,
    );
    context.set_format_version(header.get("Version").and_then(as_str).map(str::to_string));
    if let Some(origin) = header.get("Origin").and_then(as_str) {
        context.set_origin(origin.to_string());
    }
    context.set_architecture(header.get("Architecture").and_then(as_str).map(str::to_string));
    if let Some(priority) = header.get("Priority").and_then(Value::as_i64) {
        context.set_priority_default(priority as i32);
    }
    if let Some(base) = header.get("MediaBaseUrl").and_then(as_str) {
        if let Ok(url) = url::Url::parse(base) {
            context.set_media_base_url(Some(url));
        }
    }

    let mut outcome: ParseOutcome<Vec<ParsedEntry>> = ParseOutcome::new(Vec::new());

    for document in documents {
        let value = Value::deserialize(document)?;
        let Some(map) = mapping(&value) else {
            outcome.push_issue(Issue::warning("skipping non-mapping DEP-11 document"));
            continue;
        };
        match component_from_mapping(map, &context) {
            Ok((component, merge_kind)) => {
                if merge_kind == MergeKind::None {
                    outcome.value.push(ParsedEntry::Component(component));
                } else {
                    outcome.value.push(ParsedEntry::Merge(MergeOp {
                        target: component.id.clone(),
                        kind: merge_kind,
                        name_present: !component.name.is_empty(),
                        summary_present: !component.summary.is_empty(),
                        description_present: !component.description.is_empty(),
                        icons_present: !component.icons.is_empty(),
                        origin_priority: context.priority_default(),
                        origin_name: context.origin().to_string(),
                        document_order: outcome.value.len(),
                        payload: component,
                    }));
                }
            }
            Err(e) => outcome.push_issue(Issue::warning(e.to_string())),
        }
    }

    Ok(outcome)
}

use serde::Deserialize;

fn component_from_mapping(map: &serde_yaml::Mapping, context: &Context) -> Result<(Component, MergeKind)> {
    let id = map
        .get("ID")
        .and_then(as_str)
        .ok_or_else(|| AppStreamError::parse("DEP-11 document missing 'ID'"))?;

    let mut component = Component::new(id, ComponentKind::Generic);
    component.origin = context.origin().to_string();
    component.priority = context.priority_default();
    component.architecture = context.architecture().map(str::to_string);

    if let Some(kind) = map.get("Type").and_then(as_str) {
        if let Ok(parsed) = kind.parse() {
            component.kind = parsed;
        }
    }

    let merge_kind = map
        .get("Merge")
        .and_then(as_str)
        .and_then(|m| m.parse().ok())
        .unwrap_or(MergeKind::None);

    if let Some(name) = map.get("Name") {
        component.name = localized(name);
    }
    if let Some(summary) = map.get("Summary") {
        component.summary = localized(summary);
    }
    if let Some(description) = map.get("Description") {
        component.description = localized(description);
    }
    if let Some(developer) = map.get("DeveloperName") {
        component.developer_name = localized(developer);
    }
    if let Some(keywords) = map.get("Keywords") {
        component.keywords.extend(flatten_keyword_list(keywords));
    }
    if let Some(categories) = map.get("Categories") {
        component.categories.extend(string_list(categories));
    }
    if let Some(pkgname) = map.get("Package").and_then(as_str) {
        component.source_package = Some(pkgname.to_string());
    }
    if let Some(extends) = map.get("Extends") {
        component.extends = string_list(extends).into_iter().map(ComponentId::new_unchecked).collect();
    }

    if let Some(icon) = map.get("Icon") {
        component.icons = parse_icon(icon, context);
    }
    if let Some(url_map) = map.get("Url").and_then(mapping) {
        for (k, v) in url_map {
            if let (Some(role), Some(url)) = (as_str(k), as_str(v)) {
                if let Ok(role) = role.parse() {
                    if let Ok(parsed) = url::Url::parse(&context.resolve_media_url(url)) {
                        component.urls.insert(role, parsed);
                    }
                }
            }
        }
    }
    if let Some(launchable_map) = map.get("Launchable").and_then(mapping) {
        for (k, v) in launchable_map {
            if let Some(kind) = as_str(k).and_then(|k| k.parse().ok()) {
                for entry in string_list(v) {
                    component.launchables.push(Launchable::new(kind, entry));
                }
            }
        }
    }
    if let Some(provides_map) = map.get("Provides").and_then(mapping) {
        for (k, v) in provides_map {
            if let Some(kind) = as_str(k).and_then(provide_kind_for_key) {
                for entry in string_list(v) {
                    component.provides.entry(kind).or_default().push(Provide::new(kind, entry));
                }
            }
        }
    }
    if let Some(bundle_map) = map.get("Bundles").and_then(|v| v.as_sequence()) {
        for entry in bundle_map {
            if let Some(entry) = mapping(entry) {
                let kind = entry.get("type").and_then(as_str).and_then(|k| k.parse().ok());
                let value = entry.get("value").and_then(as_str);
                if let (Some(kind), Some(value)) = (kind, value) {
                    component.bundles.push(Bundle::new(kind, value));
                }
            }
        }
    }
    if let Some(releases) = map.get("Releases").and_then(|v| v.as_sequence()) {
        for entry in releases {
            if let Some(entry) = mapping(entry) {
                if let Some(version) = entry.get("version").and_then(as_str) {
                    let mut release = Release::new(version);
                    if let Some(ts) = entry.get("unix-timestamp").and_then(Value::as_i64) {
                        release.timestamp = chrono::DateTime::from_timestamp(ts, 0);
                    }
                    crate::component::release::insert_sorted(&mut component.releases, release);
                }
            }
        }
    }
    if let Some(ratings) = map.get("ContentRating").and_then(mapping) {
        for (k, v) in ratings {
            let Some(kind) = as_str(k) else { continue };
            let mut rating = ContentRating {
                kind: kind.to_string(),
                attributes: Default::default(),
            };
            if let Some(attrs) = mapping(v) {
                for (attr_k, attr_v) in attrs {
                    if let (Some(attr), Some(intensity)) = (as_str(attr_k), as_str(attr_v)) {
                        rating.attributes.insert(attr.to_string(), intensity.to_string());
                    }
                }
            }
            component.content_rating = Some(rating);
        }
    }

    Ok((component, merge_kind))
}

/// Flattens `Keywords:` which may be a plain list or a locale-keyed mapping
/// of lists, depending on the document's age.
fn flatten_keyword_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(_) => string_list(value),
        Value::Mapping(map) => map.values().flat_map(string_list).collect(),
        _ => Vec::new(),
    }
}

fn provide_kind_for_key(key: &str) -> Option<ProvideKind> {
    match key {
        "libraries" => Some(ProvideKind::Library),
        "binaries" => Some(ProvideKind::Binary),
        "mimetypes" => Some(ProvideKind::MimeType),
        "fonts" => Some(ProvideKind::Font),
        "modaliases" => Some(ProvideKind::Modalias),
        "python3" | "python2" => Some(ProvideKind::PythonModule),
        "dbus" => Some(ProvideKind::Dbus),
        "firmware-flashed" => Some(ProvideKind::FirmwareFlashed),
        "firmware-runtime" => Some(ProvideKind::FirmwareRuntime),
        "ids" => Some(ProvideKind::Id),
        _ => None,
    }
}

/// `Icon:` has two shapes (§4.3): a legacy single mapping
/// (`{width, height, name}`) or the current type-keyed form
/// (`{cached: [...], stock: name, remote: [...]}`).
fn parse_icon(value: &Value, context: &Context) -> Vec<Icon> {
    let mut icons = Vec::new();
    let Some(map) = mapping(value) else { return icons };

    // Legacy shape: a single icon description with no type key.
    if map.contains_key("name") && !map.contains_key("cached") {
        if let Some(name) = map.get("name").and_then(as_str) {
            let mut icon = Icon::new(IconKind::Cached, context.resolve_media_url(name));
            if let (Some(w), Some(h)) = (
                map.get("width").and_then(Value::as_u64),
                map.get("height").and_then(Value::as_u64),
            ) {
                icon = icon.with_size(w as u32, h as u32);
            }
            icons.push(icon);
        }
        return icons;
    }

    for (kind_key, entries) in map {
        let Some(kind) = as_str(kind_key).and_then(icon_kind_for_key) else { continue };
        match entries {
            Value::Sequence(items) => {
                for item in items {
                    if let Some(icon) = icon_from_entry(kind, item, context) {
                        icons.push(icon);
                    }
                }
            }
            Value::String(name) => {
                icons.push(Icon::new(kind, context.resolve_media_url(name)));
            }
            Value::Mapping(_) => {
                if let Some(icon) = icon_from_entry(kind, entries, context) {
                    icons.push(icon);
                }
            }
            _ => {}
        }
    }
    icons
}

fn icon_kind_for_key(key: &str) -> Option<IconKind> {
    match key {
        "cached" => Some(IconKind::Cached),
        "stock" => Some(IconKind::Stock),
        "local" => Some(IconKind::Local),
        "remote" => Some(IconKind::Remote),
        _ => None,
    }
}

fn icon_from_entry(kind: IconKind, entry: &Value, context: &Context) -> Option<Icon> {
    let map = mapping(entry)?;
    let name = map.get("name").and_then(as_str)?;
    let mut icon = Icon::new(kind, context.resolve_media_url(name));
    if let (Some(w), Some(h)) = (
        map.get("width").and_then(Value::as_u64),
        map.get("height").and_then(Value::as_u64),
    ) {
        icon = icon.with_size(w as u32, h as u32);
    }
    if let Some(scale) = map.get("scale").and_then(Value::as_u64) {
        icon = icon.with_scale(scale as u32);
    }
    Some(icon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_minimal_component() {
        let yaml = r#"
File: DEP-11
Version: '0.14'
Origin: mydist
MediaBaseUrl: https://example.org/media/
---
Type: desktop-application
ID: org.example.Foo
Name:
  C: Foo
Summary:
  C: A foo app
Icon:
  cached:
    - name: foo.png
      width: 64
      height: 64
"#;
        let outcome = parse_collection(yaml.as_bytes()).unwrap();
        assert_eq!(outcome.value.len(), 1);
        match &outcome.value[0] {
            ParsedEntry::Component(c) => {
                assert_eq!(c.id.as_str(), "org.example.Foo");
                assert_eq!(c.origin, "mydist");
                assert_eq!(c.name.get("C"), Some("Foo"));
                assert_eq!(c.icons.len(), 1);
            }
            ParsedEntry::Merge(_) => panic!("expected a component"),
        }
    }

    #[test]
    fn legacy_single_icon_shape() {
        let yaml = r#"
File: DEP-11
Version: '0.8'
Origin: legacy
---
ID: legacy.desktop
Name:
  C: Legacy
Icon:
  name: legacy.png
  width: 48
  height: 48
"#;
        let outcome = parse_collection(yaml.as_bytes()).unwrap();
        match &outcome.value[0] {
            ParsedEntry::Component(c) => assert_eq!(c.icons.len(), 1),
            ParsedEntry::Merge(_) => panic!("expected a component"),
        }
    }

    #[test]
    fn rejects_missing_dep11_header() {
        let yaml = "Foo: bar\n---\nID: x.y\n";
        assert!(parse_collection(yaml.as_bytes()).is_err());
    }

    #[test]
    fn merge_replace_document() {
        let yaml = r#"
File: DEP-11
Version: '0.14'
Origin: overlay
---
Merge: replace
ID: kiki.desktop
Name:
  C: Kiki (merged)
"#;
        let outcome = parse_collection(yaml.as_bytes()).unwrap();
        match &outcome.value[0] {
            ParsedEntry::Merge(op) => assert_eq!(op.kind, MergeKind::Replace),
            ParsedEntry::Component(_) => panic!("expected a merge"),
        }
    }
}
