//! Method resolution and supertype traversal.

use std::collections::{HashSet, VecDeque};

use shrike_model::{ClassDef, ClassRepo, MethodDef, MethodRef, TypeDescriptor};

/// Outcome of resolving a method reference against a receiver type.
#[derive(Debug)]
pub enum ResolutionResult<'a> {
    Resolved {
        holder: TypeDescriptor,
        method: &'a MethodDef,
    },
    /// The method (or the receiver type itself) is outside the compilation
    /// closure. Never fatal.
    NoSuchMethod,
    /// A matching definition exists but is not accessible from the receiver.
    IllegalAccess(MethodRef),
    /// Two unrelated super-interfaces each supply a non-abstract definition.
    Ambiguous(Vec<MethodRef>),
}

impl ResolutionResult<'_> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved { .. })
    }

    pub fn resolved_reference(&self) -> Option<&MethodRef> {
        match self {
            ResolutionResult::Resolved { method, .. } => Some(&method.reference),
            _ => None,
        }
    }
}

/// Resolves `method` starting at `receiver`: the receiver class itself, then
/// the super-class chain, then maximally-specific super-interfaces.
pub fn resolve<'a>(
    repo: &'a ClassRepo,
    receiver: &TypeDescriptor,
    method: &MethodRef,
) -> ResolutionResult<'a> {
    let Some(start) = repo.get(receiver) else {
        return ResolutionResult::NoSuchMethod;
    };

    if let Some(found) = start.lookup_method(method) {
        return ResolutionResult::Resolved {
            holder: receiver.clone(),
            method: found,
        };
    }

    // Super-class chain. Private members are not inherited; surfacing the
    // inaccessible match beats silently skipping it.
    let mut current = start.super_type.clone();
    while let Some(ty) = current {
        let Some(class) = repo.get(&ty) else {
            break;
        };
        if let Some(found) = class.lookup_method(method) {
            if found.access.is_private() {
                return ResolutionResult::IllegalAccess(found.reference.clone());
            }
            return ResolutionResult::Resolved {
                holder: ty,
                method: found,
            };
        }
        current = class.super_type.clone();
    }

    resolve_from_interfaces(repo, start, method)
}

fn resolve_from_interfaces<'a>(
    repo: &'a ClassRepo,
    start: &ClassDef,
    method: &MethodRef,
) -> ResolutionResult<'a> {
    // Every transitive super-interface that declares a matching virtual.
    let mut candidates: Vec<(TypeDescriptor, &MethodDef)> = Vec::new();
    for entry in supertypes_of(repo, start) {
        let Some(class) = repo.get(&entry.ty) else {
            continue;
        };
        if !class.is_interface() {
            continue;
        }
        if let Some(found) = class.lookup_virtual_method(method) {
            candidates.push((entry.ty, found));
        }
    }
    if candidates.is_empty() {
        return ResolutionResult::NoSuchMethod;
    }

    // Keep only the maximally specific declarations: drop any candidate that
    // is a super-interface of another candidate.
    let holders: Vec<TypeDescriptor> = candidates.iter().map(|(ty, _)| ty.clone()).collect();
    candidates.retain(|(ty, _)| {
        !holders.iter().any(|other| {
            other != ty
                && repo
                    .get(other)
                    .is_some_and(|c| supertypes_of(repo, c).iter().any(|e| e.ty == *ty))
        })
    });

    let mut concrete: Vec<(TypeDescriptor, &'a MethodDef)> = candidates
        .iter()
        .filter(|(_, m)| !m.access.is_abstract())
        .map(|(ty, m)| (ty.clone(), *m))
        .collect();
    match concrete.len() {
        1 => {
            let (holder, method) = concrete.remove(0);
            ResolutionResult::Resolved { holder, method }
        }
        0 => {
            // Only abstract declarations remain; any maximally specific one
            // resolves. Pick deterministically.
            let best = candidates
                .iter()
                .min_by(|a, b| a.0.cmp(&b.0))
                .expect("candidates is non-empty");
            ResolutionResult::Resolved {
                holder: best.0.clone(),
                method: best.1,
            }
        }
        _ => ResolutionResult::Ambiguous(concrete.iter().map(|(_, m)| m.reference.clone()).collect()),
    }
}

/// One step of a supertype traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperTypeEntry {
    pub ty: TypeDescriptor,
    /// Whether this type was reached through an `implements` edge.
    pub via_interface: bool,
}

/// All supertypes of `class` in BFS order, deduplicated. Types outside the
/// repository still appear (their own supertypes are simply unknown).
pub fn supertypes_of(repo: &ClassRepo, class: &ClassDef) -> Vec<SuperTypeEntry> {
    let mut seen: HashSet<TypeDescriptor> = HashSet::new();
    let mut queue: VecDeque<SuperTypeEntry> = VecDeque::new();
    let mut out = Vec::new();

    enqueue_supertypes(class, &mut queue);
    while let Some(entry) = queue.pop_front() {
        if !seen.insert(entry.ty.clone()) {
            continue;
        }
        if let Some(def) = repo.get(&entry.ty) {
            enqueue_supertypes(def, &mut queue);
        }
        out.push(entry);
    }
    out
}

fn enqueue_supertypes(class: &ClassDef, queue: &mut VecDeque<SuperTypeEntry>) {
    if let Some(super_type) = &class.super_type {
        queue.push_back(SuperTypeEntry {
            ty: super_type.clone(),
            via_interface: false,
        });
    }
    for iface in &class.interfaces {
        queue.push_back(SuperTypeEntry {
            ty: iface.clone(),
            via_interface: true,
        });
    }
}
