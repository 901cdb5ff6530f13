//! Retargeting of platform members to a compatibility library.
//!
//! Distinct from interface desugaring but sharing the same substrate. A
//! human-written specification maps library members to a replacement holder;
//! conversion picks one of three lens shapes per member: static → static,
//! final virtual → static with the receiver prepended, and non-final
//! virtual → an emulated-dispatch triple for polymorphic call sites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use shrike_model::{ClassRepo, ItemFactory, MethodRef, TypeDescriptor};
use shrike_resolve::{resolve, supertypes_of, ResolutionResult, SubtypingInfo};

use crate::error::{DesugarError, Result};
use crate::options::DesugarOptions;

/// The human-written retargeting specification, as read from configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RetargetSpec {
    /// `Lholder;->name(params)ret` → slash-separated replacement holder.
    pub retarget: BTreeMap<String, String>,
}

impl RetargetSpec {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Holder kinds a derived method can live on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntheticKind {
    RetargetInterface,
    RetargetClass,
}

/// A method plus the synthetic context it will be materialized in. A `None`
/// kind means the method is referenced as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedMethod {
    pub method: MethodRef,
    pub synthetic_kind: Option<SyntheticKind>,
}

impl DerivedMethod {
    pub fn plain(method: MethodRef) -> Self {
        Self {
            method,
            synthetic_kind: None,
        }
    }

    pub fn synthetic(method: MethodRef, kind: SyntheticKind) -> Self {
        Self {
            method,
            synthetic_kind: Some(kind),
        }
    }
}

/// The triple backing an emulated virtual retarget: an interface stub for
/// typing, a dispatch class for the runtime check, and the forwarder the
/// dispatch falls through to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmulatedDispatchDescriptor {
    pub interface_method: DerivedMethod,
    pub dispatch_method: DerivedMethod,
    pub forwarding_method: DerivedMethod,
}

/// Machine-level retarget maps consumed by the call-site rewriter.
#[derive(Clone, Debug, Default)]
pub struct MachineRetargetFlags {
    pub static_retarget: BTreeMap<MethodRef, MethodRef>,
    pub non_emulated_virtual_retarget: BTreeMap<MethodRef, MethodRef>,
    pub emulated_virtual_retarget: BTreeMap<MethodRef, EmulatedDispatchDescriptor>,
}

impl MachineRetargetFlags {
    pub fn is_empty(&self) -> bool {
        self.static_retarget.is_empty()
            && self.non_emulated_virtual_retarget.is_empty()
            && self.emulated_virtual_retarget.is_empty()
    }
}

pub struct RetargetConverter<'a> {
    repo: &'a ClassRepo,
    factory: &'a ItemFactory,
    subtyping: &'a SubtypingInfo,
    options: &'a DesugarOptions,
}

impl<'a> RetargetConverter<'a> {
    pub fn new(
        repo: &'a ClassRepo,
        factory: &'a ItemFactory,
        subtyping: &'a SubtypingInfo,
        options: &'a DesugarOptions,
    ) -> Self {
        Self {
            repo,
            factory,
            subtyping,
            options,
        }
    }

    pub fn convert(&self, spec: &RetargetSpec) -> Result<MachineRetargetFlags> {
        let mut flags = MachineRetargetFlags::default();
        for (method_text, holder_text) in &spec.retarget {
            let method = self.factory.parse_method(method_text)?;
            let target = self.factory.class_type(holder_text);
            self.convert_member(&mut flags, &method, target)?;
        }
        Ok(flags)
    }

    fn convert_member(
        &self,
        flags: &mut MachineRetargetFlags,
        method: &MethodRef,
        target: TypeDescriptor,
    ) -> Result<()> {
        let holder = self
            .repo
            .get(&method.holder)
            .ok_or_else(|| DesugarError::RetargetMemberNotFound(method.clone()))?;
        let found = holder
            .lookup_method(method)
            .ok_or_else(|| DesugarError::RetargetMemberNotFound(method.clone()))?;

        if found.access.is_static() {
            self.convert_non_emulated(method, &target, |src, dest| {
                flags.static_retarget.insert(src, dest);
            });
            return Ok(());
        }
        if holder.access.is_final() || found.access.is_final() {
            // A final member cannot be overridden; a plain static rewrite
            // with the receiver as parameter zero is sound.
            let prepended = self.factory.prepend_holder_to_proto(method);
            self.convert_non_emulated(method, &target, |src, dest| {
                flags.non_emulated_virtual_retarget.insert(
                    src,
                    MethodRef::new(dest.holder, dest.name, std::sync::Arc::clone(&prepended)),
                );
            });
            return Ok(());
        }
        self.convert_emulated(flags, method, target);
        Ok(())
    }

    /// `src → dest`, propagated to every subtype that still resolves to the
    /// same definition.
    fn convert_non_emulated(
        &self,
        src: &MethodRef,
        target: &TypeDescriptor,
        mut record: impl FnMut(MethodRef, MethodRef),
    ) {
        let dest = src.with_holder(target.clone());
        record(src.clone(), dest.clone());
        for subtype in self.subtyping.subtypes_of(&src.holder) {
            let result = resolve(self.repo, &subtype, src);
            if result
                .resolved_reference()
                .is_some_and(|resolved| resolved == src)
            {
                record(src.with_holder(subtype), dest.clone());
            }
        }
    }

    fn convert_emulated(
        &self,
        flags: &mut MachineRetargetFlags,
        src: &MethodRef,
        target: TypeDescriptor,
    ) {
        if self.is_emulated_interface_dispatch(src) {
            // Handled by emulated interface dispatch.
            debug!(method = %src, "retarget owned by emulated dispatch");
            return;
        }
        let forwarding = MethodRef::new(
            target,
            src.name.clone(),
            self.factory.prepend_holder_to_proto(src),
        );
        debug_assert!(self.validate_no_override(src));
        flags.emulated_virtual_retarget.insert(
            src.clone(),
            EmulatedDispatchDescriptor {
                interface_method: DerivedMethod::synthetic(
                    src.clone(),
                    SyntheticKind::RetargetInterface,
                ),
                dispatch_method: DerivedMethod::synthetic(src.clone(), SyntheticKind::RetargetClass),
                forwarding_method: DerivedMethod::plain(forwarding),
            },
        );
    }

    /// An emulated virtual retarget is only sound when no subtype overrides
    /// the member with a distinct definition; an override would silently
    /// bypass the emulated dispatch.
    pub fn validate_no_override(&self, src: &MethodRef) -> bool {
        for subtype in self.subtyping.subtypes_of(&src.holder) {
            if let ResolutionResult::Resolved { method, .. } = resolve(self.repo, &subtype, src) {
                if method.reference != *src {
                    return false;
                }
            }
        }
        true
    }

    /// True when an emulated interface above the holder already declares the
    /// member; that layer owns the lowering.
    fn is_emulated_interface_dispatch(&self, method: &MethodRef) -> bool {
        if self.options.emulated_interfaces.is_empty() {
            return false;
        }
        let Some(holder) = self.repo.get(&method.holder) else {
            return false;
        };
        debug_assert!(
            !self.options.emulated_interfaces.contains(&holder.ty),
            "cannot retarget a virtual method on an emulated interface"
        );
        supertypes_of(self.repo, holder).into_iter().any(|entry| {
            self.options.emulated_interfaces.contains(&entry.ty)
                && self
                    .repo
                    .get(&entry.ty)
                    .is_some_and(|c| c.is_interface() && c.lookup_method(method).is_some())
        })
    }
}
