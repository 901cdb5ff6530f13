//! The member-rename lens produced by this pass.
//!
//! Downstream passes rewrite call sites by composing lenses left to right;
//! this pass contributes exactly one. Every member it owns is invoked as
//! static going forward, so invocation-kind mapping is unconditional.

use std::collections::HashMap;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;

use shrike_model::{FieldRef, InvokeKind, MethodRef};

/// Forward map with a precomputed inverse.
#[derive(Clone, Debug)]
pub struct BiMap<T> {
    forward: HashMap<T, T>,
    backward: HashMap<T, T>,
}

impl<T> Default for BiMap<T> {
    fn default() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> BiMap<T> {
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            backward: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: T, value: T) {
        self.backward.insert(value.clone(), key.clone());
        self.forward.insert(key, value);
    }

    pub fn get(&self, key: &T) -> Option<&T> {
        self.forward.get(key)
    }

    pub fn get_inverse(&self, value: &T) -> Option<&T> {
        self.backward.get(value)
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &T)> {
        self.forward.iter()
    }
}

/// A link in the lens chain. Immutable after construction apart from the
/// documented toggle.
#[derive(Debug)]
pub enum GraphLens {
    Identity,
    InterfaceDesugar(DesugarLens),
}

impl GraphLens {
    pub fn identity() -> Arc<GraphLens> {
        Arc::new(GraphLens::Identity)
    }

    pub fn as_interface_desugar(&self) -> Option<&DesugarLens> {
        match self {
            GraphLens::InterfaceDesugar(lens) => Some(lens),
            GraphLens::Identity => None,
        }
    }
}

/// The interface-desugaring lens.
///
/// Two inverse maps share the origin role: the interface shim and the
/// companion implementation can both claim the same original signature at
/// different times in the compilation, so which map is authoritative can be
/// toggled exactly once by the downstream lambda rewriter.
#[derive(Debug, Default)]
pub struct DesugarLens {
    /// Forward rewrites applied to call sites: original → new.
    method_map: HashMap<MethodRef, MethodRef>,
    /// New signature → original signature, for moved members.
    original_method_signatures: BiMap<MethodRef>,
    /// New signature → original signature, for moved default bodies.
    extra_original_method_signatures: BiMap<MethodRef>,
    /// Unused by this pass; carried so lens composition stays uniform.
    original_field_signatures: BiMap<FieldRef>,
    previous: Option<Arc<GraphLens>>,
}

impl DesugarLens {
    /// Walks the previous-lens chain and returns the latest
    /// interface-desugaring lens, if any.
    pub fn find(lens: &GraphLens) -> Option<&DesugarLens> {
        match lens {
            GraphLens::InterfaceDesugar(found) => Some(found),
            GraphLens::Identity => None,
        }
    }

    pub fn previous(&self) -> Option<&GraphLens> {
        self.previous.as_deref()
    }

    /// Rewrites a call site. Members owned by this lens become static
    /// invocations regardless of the original opcode.
    pub fn lookup_method(
        &self,
        reference: &MethodRef,
        _context: Option<&MethodRef>,
        invocation_type: InvokeKind,
    ) -> (MethodRef, InvokeKind) {
        if let Some(new_method) = self.method_map.get(reference) {
            let kind = self.map_invocation_type(new_method, reference, invocation_type);
            return (new_method.clone(), kind);
        }
        if let Some(new_method) = self.extra_original_method_signatures.get_inverse(reference) {
            let kind = self.map_invocation_type(new_method, reference, invocation_type);
            return (new_method.clone(), kind);
        }
        (reference.clone(), invocation_type)
    }

    pub fn get_original_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.extra_original_method_signatures
            .get(method)
            .or_else(|| self.original_method_signatures.get(method))
            .cloned()
            .unwrap_or_else(|| method.clone())
    }

    pub fn get_next_method_signature(&self, method: &MethodRef) -> MethodRef {
        self.original_method_signatures
            .get_inverse(method)
            .or_else(|| self.extra_original_method_signatures.get_inverse(method))
            .cloned()
            .unwrap_or_else(|| method.clone())
    }

    /// Unconditional for members owned by this lens.
    pub fn map_invocation_type(
        &self,
        _new_method: &MethodRef,
        _original_method: &MethodRef,
        _invocation_type: InvokeKind,
    ) -> InvokeKind {
        InvokeKind::Static
    }

    /// Swaps which inverse map is authoritative. Used once downstream.
    pub fn toggle_mapping_to_extra_methods(&mut self) {
        mem::swap(
            &mut self.original_method_signatures,
            &mut self.extra_original_method_signatures,
        );
    }

    pub fn extra_original_method_signatures(&self) -> &BiMap<MethodRef> {
        &self.extra_original_method_signatures
    }

    pub fn original_field_signatures(&self) -> &BiMap<FieldRef> {
        &self.original_field_signatures
    }

    /// Whether this lens rewrote `reference` (either direction).
    pub fn owns(&self, reference: &MethodRef) -> bool {
        self.method_map.contains_key(reference)
            || self.original_method_signatures.get(reference).is_some()
            || self.extra_original_method_signatures.get(reference).is_some()
            || self
                .extra_original_method_signatures
                .get_inverse(reference)
                .is_some()
    }
}

#[derive(Debug, Default)]
pub struct DesugarLensBuilder {
    method_map: HashMap<MethodRef, MethodRef>,
    original_method_signatures: BiMap<MethodRef>,
    extra_original_method_signatures: BiMap<MethodRef>,
    original_field_signatures: BiMap<FieldRef>,
}

impl DesugarLensBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a member move: call sites retarget and the signature maps
    /// gain a forward/backward pair.
    pub fn move_method(&mut self, from: MethodRef, to: MethodRef) {
        self.original_method_signatures
            .insert(to.clone(), from.clone());
        self.method_map.insert(from, to);
    }

    /// Records the origin of a moved default body.
    pub fn record_origin(&mut self, method: MethodRef, origin: MethodRef) {
        if method == origin {
            return;
        }
        self.extra_original_method_signatures.insert(method, origin);
    }

    /// Builds the lens, or `None` when nothing was rewritten.
    pub fn build(self, previous: Arc<GraphLens>) -> Option<DesugarLens> {
        if self.original_field_signatures.is_empty()
            && self.original_method_signatures.is_empty()
            && self.extra_original_method_signatures.is_empty()
        {
            return None;
        }
        Some(DesugarLens {
            method_map: self.method_map,
            original_method_signatures: self.original_method_signatures,
            extra_original_method_signatures: self.extra_original_method_signatures,
            original_field_signatures: self.original_field_signatures,
            previous: Some(previous),
        })
    }
}
