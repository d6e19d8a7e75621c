//! The Merge Engine (§4.5): applies append/replace/remove-component
//! pseudo-components queued during loading, after the base index for all
//! origins has been built.

use crate::component::{Component, ComponentId, MergeKind, RelationKind};

/// A merge pseudo-component as parsed: not indexed itself, only ever
/// consumed by [`apply_merges`].
#[derive(Debug, Clone)]
pub struct MergeOp {
    pub target: ComponentId,
    pub kind: MergeKind,
    /// The partial Component carrying the fields to apply. Only the
    /// subset of fields actually present in the source document is
    /// meaningful; callers set the rest to the type's default so they are
    /// distinguishable from "absent" via the `*_present` flags below.
    pub payload: Component,
    pub origin_priority: i32,
    pub origin_name: String,
    pub document_order: usize,

    pub name_present: bool,
    pub summary_present: bool,
    pub description_present: bool,
    pub icons_present: bool,
}

fn ordering_key(op: &MergeOp) -> (i32, &str, usize) {
    (op.origin_priority, op.origin_name.as_str(), op.document_order)
}

/// Applies every queued merge to `components` in place, in the
/// deterministic order required by §4.5: ascending
/// `(origin-priority, origin-name, document-order)`.
///
/// A merge targeting an id with no matching Component is silently
/// discarded (§4.5).
pub fn apply_merges(components: &mut Vec<Component>, mut ops: Vec<MergeOp>) {
    ops.sort_by(|a, b| ordering_key(a).cmp(&ordering_key(b)));

    for op in ops {
        match op.kind {
            MergeKind::RemoveComponent => {
                components.retain(|c| c.id != op.target);
            }
            MergeKind::Replace => {
                for component in components.iter_mut().filter(|c| c.id == op.target) {
                    apply_replace(component, &op);
                }
            }
            MergeKind::Append => {
                for component in components.iter_mut().filter(|c| c.id == op.target) {
                    apply_append(component, &op);
                }
            }
            MergeKind::None => {
                // Not a merge pseudo-component; callers shouldn't queue these,
                // but treat as a no-op rather than panicking on bad input.
            }
        }
    }
}

fn apply_replace(component: &mut Component, op: &MergeOp) {
    if op.name_present {
        component.name = op.payload.name.clone();
    }
    if op.summary_present {
        component.summary = op.payload.summary.clone();
    }
    if op.description_present {
        component.description = op.payload.description.clone();
    }
    if op.icons_present {
        component.icons = op.payload.icons.clone();
    }
    if !op.payload.categories.is_empty() {
        component.categories = op.payload.categories.clone();
    }
    if !op.payload.keywords.is_empty() {
        component.keywords = op.payload.keywords.clone();
    }
    if !op.payload.screenshots.is_empty() {
        component.screenshots = op.payload.screenshots.clone();
    }
}

fn apply_append(component: &mut Component, op: &MergeOp) {
    component.categories.extend(op.payload.categories.iter().cloned());
    component.keywords.extend(op.payload.keywords.iter().cloned());

    for screenshot in &op.payload.screenshots {
        if !component.screenshots.contains(screenshot) {
            component.screenshots.push(screenshot.clone());
        }
    }
    for release in &op.payload.releases {
        if !component.releases.iter().any(|r| r.version == release.version) {
            crate::component::release::insert_sorted(&mut component.releases, release.clone());
        }
    }
    for (kind, provides) in &op.payload.provides {
        let existing = component.provides.entry(*kind).or_default();
        for provide in provides {
            if !existing.contains(provide) {
                existing.push(provide.clone());
            }
        }
    }
    // `suggestions` (§4.5) ride on the same `relations` list as
    // requires/recommends/supports, distinguished by `RelationKind::Suggests`.
    for relation in op.payload.relations.iter().filter(|r| r.kind == RelationKind::Suggests) {
        if !component.relations.contains(relation) {
            component.relations.push(relation.clone());
        }
    }
}

/// Merge idempotence (§8): applying the same op set twice must equal
/// applying it once. Since replace overwrites and append de-duplicates via
/// `contains`/presence checks, re-running `apply_merges` with the same
/// `ops` is naturally idempotent; this helper exists for callers that want
/// to assert the property directly rather than re-deriving it.
pub fn is_idempotent(components: &[Component], ops: &[MergeOp]) -> bool {
    let mut once = components.to_vec();
    apply_merges(&mut once, ops.to_vec());
    let mut twice = once.clone();
    apply_merges(&mut twice, ops.to_vec());
    once.len() == twice.len()
        && once
            .iter()
            .zip(twice.iter())
            .all(|(a, b)| a.id == b.id && a.categories == b.categories && a.keywords == b.keywords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    fn base(id: &str) -> Component {
        Component::new(id, ComponentKind::DesktopApplication)
    }

    fn op(target: &str, kind: MergeKind) -> MergeOp {
        MergeOp {
            target: target.into(),
            kind,
            payload: base(target),
            origin_priority: 0,
            origin_name: "overlay".into(),
            document_order: 0,
            name_present: false,
            summary_present: false,
            description_present: false,
            icons_present: false,
        }
    }

    #[test]
    fn replace_overwrites_present_fields_only() {
        let mut components = vec![base("kiki.desktop")];
        components[0].name.insert("C", "Kiki");
        components[0].summary.insert("C", "Original summary");

        let mut merge_op = op("kiki.desktop", MergeKind::Replace);
        merge_op.payload.name.insert("C", "Kiki (merged)");
        merge_op.name_present = true;

        apply_merges(&mut components, vec![merge_op]);

        assert_eq!(components[0].name.get("C"), Some("Kiki (merged)"));
        assert_eq!(components[0].summary.get("C"), Some("Original summary"));
    }

    #[test]
    fn remove_component_deletes_every_origin() {
        let mut components = vec![base("org.example.DeleteMe"), base("org.example.DeleteMe")];
        apply_merges(&mut components, vec![op("org.example.DeleteMe", MergeKind::RemoveComponent)]);
        assert!(components.is_empty());
    }

    #[test]
    fn merge_targeting_missing_id_is_discarded() {
        let mut components = vec![base("org.example.Real")];
        apply_merges(&mut components, vec![op("org.example.Ghost", MergeKind::Replace)]);
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn append_deduplicates() {
        let mut components = vec![base("org.example.App")];
        components[0].categories.insert("Graphics".into());

        let mut merge_op = op("org.example.App", MergeKind::Append);
        merge_op.payload.categories.insert("Graphics".into());
        merge_op.payload.categories.insert("Utility".into());

        apply_merges(&mut components, vec![merge_op]);
        assert_eq!(components[0].categories.len(), 2);
    }

    #[test]
    fn append_merges_suggestions_and_deduplicates() {
        use crate::component::{Relation, RelationItemKind};

        let mut components = vec![base("org.example.App")];
        components[0]
            .relations
            .push(Relation::new(RelationKind::Suggests, RelationItemKind::Id, "org.example.PluginA"));

        let mut merge_op = op("org.example.App", MergeKind::Append);
        merge_op
            .payload
            .relations
            .push(Relation::new(RelationKind::Suggests, RelationItemKind::Id, "org.example.PluginA"));
        merge_op
            .payload
            .relations
            .push(Relation::new(RelationKind::Suggests, RelationItemKind::Id, "org.example.PluginB"));

        apply_merges(&mut components, vec![merge_op]);
        assert_eq!(components[0].relations.len(), 2);
    }

    #[test]
    fn idempotent_application() {
        let mut components = vec![base("org.example.App")];
        components[0].categories.insert("Graphics".into());

        let mut merge_op = op("org.example.App", MergeKind::Append);
        merge_op.payload.categories.insert("Utility".into());

        assert!(is_idempotent(&components, &[merge_op]));
    }
}
