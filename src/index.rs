//! The Indexer (§4.6): four lookup structures keyed to avoid linear scans,
//! plus the tie-break rule that resolves an `(id, scope)` collision after
//! merge.

use std::collections::HashMap;

use crate::component::{Component, ComponentId, LaunchableKind, ProvideKind, Scope};

/// The built index: the Pool swaps this wholesale on reload (§5,
/// `ArcSwap<Index>`), never mutates one in place once published.
#[derive(Debug, Default)]
pub struct Index {
    components: Vec<Component>,
    by_id: HashMap<ComponentId, Vec<usize>>,
    by_provide: HashMap<(ProvideKind, String), Vec<usize>>,
    by_launchable: HashMap<(LaunchableKind, String), Vec<usize>>,
    by_category: HashMap<String, Vec<usize>>,
}

impl Index {
    pub fn builder() -> IndexBuilder {
        IndexBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn all(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.iter_mut()
    }

    /// Priority-descending, origin-lex order, stable across calls (§8).
    pub fn by_id(&self, id: &str) -> Vec<&Component> {
        let Some(positions) = self.by_id.get(&ComponentId::new_unchecked(id)) else {
            return Vec::new();
        };
        let mut found: Vec<&Component> = positions.iter().map(|&i| &self.components[i]).collect();
        found.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.origin.cmp(&b.origin)));
        found
    }

    pub fn by_provide(&self, kind: ProvideKind, value: &str) -> Vec<&Component> {
        match self.by_provide.get(&(kind, value.to_string())) {
            Some(positions) => positions.iter().map(|&i| &self.components[i]).collect(),
            None => Vec::new(),
        }
    }

    pub fn by_launchable(&self, kind: LaunchableKind, value: &str) -> Vec<&Component> {
        match self.by_launchable.get(&(kind, value.to_string())) {
            Some(positions) => positions.iter().map(|&i| &self.components[i]).collect(),
            None => Vec::new(),
        }
    }

    pub fn by_category(&self, category: &str) -> Vec<&Component> {
        match self.by_category.get(category) {
            Some(positions) => positions.iter().map(|&i| &self.components[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Addon resolution pass (§4.6, §10.5): attaches each addon's
    /// `extends` targets a back-reference, by id, without creating an
    /// owning cycle.
    pub fn resolve_addons(&mut self) {
        let mut back_refs: HashMap<ComponentId, Vec<ComponentId>> = HashMap::new();
        for component in &self.components {
            for target in &component.extends {
                back_refs.entry(target.clone()).or_default().push(component.id.clone());
            }
        }
        for component in &mut self.components {
            if let Some(refs) = back_refs.remove(&component.id) {
                component.extended_by = refs;
            }
        }
    }
}

#[derive(Default)]
pub struct IndexBuilder {
    components: Vec<Component>,
    /// Collisions recorded for the caller to log (§7 CollisionError).
    pub collisions: Vec<(ComponentId, String, String)>,
}

impl IndexBuilder {
    /// Adds a parsed, merge-applied Component. Bundling/indexing happens in
    /// [`IndexBuilder::build`] once every component for every origin has
    /// been collected, so precedence can be resolved globally.
    pub fn push(&mut self, component: Component) {
        self.components.push(component);
    }

    pub fn extend(&mut self, components: impl IntoIterator<Item = Component>) {
        self.components.extend(components);
    }

    /// Resolves `(id, scope)` collisions by priority, then more-specific
    /// origin, then origin name (§4.6), and builds the four lookup maps.
    pub fn build(mut self) -> Index {
        // Group by (id, scope); within a group keep only the winner.
        let mut groups: HashMap<(ComponentId, Scope), Vec<usize>> = HashMap::new();
        for (i, component) in self.components.iter().enumerate() {
            groups
                .entry((component.id.clone(), component.scope))
                .or_default()
                .push(i);
        }

        let mut keep = vec![true; self.components.len()];
        for indices in groups.values() {
            if indices.len() <= 1 {
                continue;
            }
            let winner = *indices
                .iter()
                .max_by(|&&a, &&b| {
                    let ca = &self.components[a];
                    let cb = &self.components[b];
                    ca.priority
                        .cmp(&cb.priority)
                        .then_with(|| ca.from_collection.cmp(&cb.from_collection))
                        .then_with(|| ca.origin.cmp(&cb.origin))
                })
                .unwrap();
            for &i in indices {
                if i != winner {
                    keep[i] = false;
                    log::warn!(
                        "collision on id {:?}: origin {:?} lost to {:?}",
                        self.components[i].id.as_str(),
                        self.components[i].origin,
                        self.components[winner].origin,
                    );
                    self.collisions.push((
                        self.components[i].id.clone(),
                        self.components[i].origin.clone(),
                        self.components[winner].origin.clone(),
                    ));
                }
            }
        }

        let mut components = Vec::with_capacity(self.components.len());
        for (i, component) in self.components.into_iter().enumerate() {
            if keep[i] {
                components.push(component);
            }
        }

        let mut by_id: HashMap<ComponentId, Vec<usize>> = HashMap::new();
        let mut by_provide: HashMap<(ProvideKind, String), Vec<usize>> = HashMap::new();
        let mut by_launchable: HashMap<(LaunchableKind, String), Vec<usize>> = HashMap::new();
        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, component) in components.iter().enumerate() {
            by_id.entry(component.id.clone()).or_default().push(i);
            for provides in component.provides.values() {
                for provide in provides {
                    by_provide
                        .entry((provide.kind, provide.value.clone()))
                        .or_default()
                        .push(i);
                }
            }
            for launchable in &component.launchables {
                by_launchable
                    .entry((launchable.kind, launchable.entry.clone()))
                    .or_default()
                    .push(i);
            }
            for category in &component.categories {
                by_category.entry(category.clone()).or_default().push(i);
            }
        }

        Index {
            components,
            by_id,
            by_provide,
            by_launchable,
            by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    fn component(id: &str, origin: &str, priority: i32) -> Component {
        let mut c = Component::new(id, ComponentKind::DesktopApplication);
        c.origin = origin.to_string();
        c.priority = priority;
        c
    }

    #[test]
    fn higher_priority_wins_collision() {
        let mut builder = Index::builder();
        builder.push(component("org.example.App", "upstream", 0));
        builder.push(component("org.example.App", "distro-overlay", 10));
        let index = builder.build();
        let found = index.by_id("org.example.App");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].origin, "distro-overlay");
    }

    #[test]
    fn by_id_lookup_is_priority_descending() {
        let mut builder = Index::builder();
        builder.push(component("org.example.A", "o", 0));
        let index = builder.build();
        assert_eq!(index.by_id("org.example.A").len(), 1);
        assert_eq!(index.by_id("org.example.Missing").len(), 0);
    }

    #[test]
    fn collection_origin_breaks_a_priority_tie() {
        let mut upstream = component("org.example.App", "org.example.App.metainfo.xml", 0);
        let mut distro = component("org.example.App", "fedora-workstation", 0);
        distro.from_collection = true;

        let mut builder = Index::builder();
        builder.push(upstream.clone());
        builder.push(distro.clone());
        let index = builder.build();

        let found = index.by_id("org.example.App");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].origin, "fedora-workstation");

        // A dash-free upstream origin must not outrank a genuine distro
        // collection just because the strings happen to sort that way.
        upstream.origin = "zzz-upstream".to_string();
        let mut builder = Index::builder();
        builder.push(upstream);
        builder.push(distro);
        let index = builder.build();
        assert_eq!(index.by_id("org.example.App")[0].origin, "fedora-workstation");
    }
}
