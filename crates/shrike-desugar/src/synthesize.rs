//! Materializes companion and dispatch classes and rewrites interfaces.
//!
//! The only phase allowed to publish into the repository. Method bodies
//! move from interface to companion by transfer, never by deep copy; the
//! vacated interface slots become abstract method descriptors with no body
//! and no debug info.

use tracing::info;

use shrike_core::Origin;
use shrike_model::{
    AccessFlags, ClassDef, ClassKind, ClassRepo, CodeBody, MethodDef, MethodRef, TypeDescriptor,
};

use crate::error::{DesugarError, Result};
use crate::forward::ForwardMethodBuilder;
use crate::naming::SyntheticNaming;
use crate::options::DesugarOptions;
use crate::plan::{DispatchPlan, InterfacePlan};

const COMPANION_ORIGIN: &str = "interface desugaring";
const DISPATCH_ORIGIN: &str = "interface dispatch";

/// Applies one interface plan: rewrites the interface in place and, when the
/// plan moved anything, publishes the companion class.
pub fn synthesize_companion(
    repo: &mut ClassRepo,
    naming: &SyntheticNaming<'_>,
    options: &DesugarOptions,
    plan: &InterfacePlan,
) -> Result<Option<TypeDescriptor>> {
    let (moved_bodies, source_file, iface_access, iface_checksum) =
        repo.replace(&plan.interface, |class| rewrite_interface(class, plan))?;

    if !plan.needs_companion() {
        return Ok(None);
    }

    let mut access = iface_access;
    access.unset_abstract();
    access.unset_interface();
    access.unset_annotation();
    access.set_final();
    access.set_synthetic();
    // Must be public so moved methods can be called from anywhere.
    access.set_public();

    let mut direct_methods = Vec::with_capacity(plan.companion_methods.len());
    for (companion, mut code) in plan.companion_methods.iter().zip(moved_bodies) {
        if companion.kind.prepends_receiver() {
            if let Some(body) = code.as_mut() {
                body.set_fake_this_parameter();
            }
        }
        direct_methods.push(MethodDef::new(
            companion.target.clone(),
            companion.access,
            code,
        ));
    }

    let iface_name = match plan.interface.as_class_name() {
        Some(name) => name,
        None => unreachable!("interface descriptor must be a class type"),
    };
    let companion_ty = naming.companion_of(iface_name);
    let checksum = if options.encode_checksums {
        iface_checksum.map(|c| 7u64.wrapping_mul(c))
    } else {
        None
    };

    let companion = ClassDef {
        ty: companion_ty.clone(),
        kind: ClassKind::Program,
        access,
        super_type: Some(TypeDescriptor::class("java/lang/Object")),
        interfaces: Vec::new(),
        source_file,
        origin: Origin::Synthesized(COMPANION_ORIGIN),
        fields: Vec::new(),
        direct_methods,
        virtual_methods: Vec::new(),
        checksum,
        synthesized_from: vec![plan.interface.clone()],
    };
    repo.publish(companion)?;
    info!(companion = %companion_ty, "synthesized companion class");
    Ok(Some(companion_ty))
}

/// Takes the moved bodies out of the interface and rewrites its method
/// lists. Runs inside `ClassRepo::replace`.
fn rewrite_interface(
    class: &mut ClassDef,
    plan: &InterfacePlan,
) -> (
    Vec<Option<CodeBody>>,
    Option<shrike_core::Name>,
    AccessFlags,
    Option<u64>,
) {
    let mut moved_bodies = Vec::with_capacity(plan.companion_methods.len());
    for companion in &plan.companion_methods {
        moved_bodies.push(take_code(class, &companion.source));
    }

    let mut virtuals = Vec::with_capacity(plan.kept_virtuals.len());
    for kept in &plan.kept_virtuals {
        if !kept.abstract_shim {
            // Owned by emulated dispatch; left untouched.
            if let Some(original) = class.lookup_virtual_method(&kept.reference) {
                virtuals.push(original.clone());
            }
            continue;
        }
        let mut access = lookup_access(class, &kept.reference);
        access.promote_to_public();
        access.set_abstract();
        access.unset_bridge();
        virtuals.push(MethodDef::new(kept.reference.clone(), access, None));
    }

    let directs = plan
        .kept_directs
        .iter()
        .filter_map(|reference| class.lookup_direct_method(reference).cloned())
        .collect();

    class.virtual_methods = virtuals;
    class.direct_methods = directs;
    (
        moved_bodies,
        class.source_file.clone(),
        class.access,
        class.checksum,
    )
}

fn take_code(class: &mut ClassDef, reference: &MethodRef) -> Option<CodeBody> {
    class
        .direct_methods
        .iter_mut()
        .chain(class.virtual_methods.iter_mut())
        .find(|m| m.signature_matches(reference))
        .and_then(|m| m.code.take())
}

fn lookup_access(class: &ClassDef, reference: &MethodRef) -> AccessFlags {
    class
        .lookup_virtual_method(reference)
        .map(|m| m.access)
        .unwrap_or(AccessFlags::PUBLIC)
}

/// Publishes the dispatch class for one library interface: a static
/// forwarder per observed invocation, each targeting the original static
/// interface method with the interface bit set.
pub fn synthesize_dispatch(
    repo: &mut ClassRepo,
    naming: &SyntheticNaming<'_>,
    options: &DesugarOptions,
    plan: &DispatchPlan,
) -> Result<TypeDescriptor> {
    let iface_name = match plan.interface.as_class_name() {
        Some(name) => name,
        None => unreachable!("library interface descriptor must be a class type"),
    };
    let dispatch_ty = naming.dispatch_of(iface_name);

    let source_file = repo
        .get(&plan.interface)
        .and_then(|c| c.source_file.clone());

    let mut direct_methods = Vec::with_capacity(plan.forwarders.len());
    for original in &plan.forwarders {
        let forward = naming.as_dispatch_forward(original);
        let body = ForwardMethodBuilder::builder()
            .set_static_source(forward.clone())
            .set_static_target(original.clone(), true)
            .build();
        direct_methods.push(MethodDef::new(
            forward,
            AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::SYNTHETIC,
            Some(body),
        ));
    }

    let dispatch = ClassDef {
        ty: dispatch_ty.clone(),
        kind: ClassKind::Program,
        access: AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::SYNTHETIC,
        super_type: Some(TypeDescriptor::class("java/lang/Object")),
        interfaces: Vec::new(),
        source_file,
        origin: Origin::Synthesized(DISPATCH_ORIGIN),
        fields: Vec::new(),
        direct_methods,
        virtual_methods: Vec::new(),
        checksum: options
            .encode_checksums
            .then(|| shrike_model::checksum_from_type(&dispatch_ty)),
        synthesized_from: plan.callers.iter().cloned().collect(),
    };
    repo.publish(dispatch).map_err(DesugarError::from)?;
    info!(dispatch = %dispatch_ty, "synthesized dispatch class");
    Ok(dispatch_ty)
}
