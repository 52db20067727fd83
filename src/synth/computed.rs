//! Computed properties inherited through a component's ancestry

use indexmap::IndexMap;

use crate::metadata::{ComputedKind, TypeHierarchy};

/// Collect computed property types declared on `type_name` and its ancestors
///
/// The walk goes from the type itself toward the root base type and never
/// looks at the root. When several types declare the same property, the most
/// derived declaration wins.
pub fn inherited_computed(hierarchy: &TypeHierarchy, type_name: &str) -> IndexMap<String, String> {
    let mut collected = IndexMap::new();
    for component in hierarchy.ancestry(type_name) {
        for computed in &component.computed {
            if computed.kind != ComputedKind::Getter || collected.contains_key(&computed.name) {
                continue;
            }
            collected.insert(computed.name.clone(), computed.type_name.clone());
        }
    }
    collected
}
