//! Inverse hierarchy edges, built lazily from the repository.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use shrike_model::{ClassRepo, TypeDescriptor};

/// Subtype edges for every type mentioned in the repository.
///
/// Built once from a frozen repository; used by the invariant checker and by
/// retarget validation. BTree storage keeps traversal order deterministic.
#[derive(Debug, Default)]
pub struct SubtypingInfo {
    direct: BTreeMap<TypeDescriptor, BTreeSet<TypeDescriptor>>,
}

impl SubtypingInfo {
    pub fn build(repo: &ClassRepo) -> Self {
        let mut direct: BTreeMap<TypeDescriptor, BTreeSet<TypeDescriptor>> = BTreeMap::new();
        for class in repo.iter() {
            if let Some(super_type) = &class.super_type {
                direct
                    .entry(super_type.clone())
                    .or_default()
                    .insert(class.ty.clone());
            }
            for iface in &class.interfaces {
                direct
                    .entry(iface.clone())
                    .or_default()
                    .insert(class.ty.clone());
            }
        }
        Self { direct }
    }

    pub fn direct_subtypes(&self, ty: &TypeDescriptor) -> impl Iterator<Item = &TypeDescriptor> {
        self.direct.get(ty).into_iter().flatten()
    }

    /// All transitive subtypes of `ty`, in deterministic BFS order.
    pub fn subtypes_of(&self, ty: &TypeDescriptor) -> Vec<TypeDescriptor> {
        let mut seen: BTreeSet<TypeDescriptor> = BTreeSet::new();
        let mut queue: VecDeque<&TypeDescriptor> = self.direct_subtypes(ty).collect();
        let mut out = Vec::new();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            out.push(next.clone());
            queue.extend(self.direct_subtypes(next));
        }
        out
    }
}
