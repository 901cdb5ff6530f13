//! The move planner.
//!
//! Decides, per program interface, which members move to the companion
//! class, which stay as abstract shims, and which library statics need a
//! dispatch forwarder. Runs against a frozen repository and never mutates
//! class definitions; the synthesizer applies the plan afterwards.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use shrike_model::{
    ClassDef, ClassKind, ClassRepo, InvokeKind, MethodDef, MethodRef, TypeDescriptor,
};
use shrike_resolve::supertypes_of;

use crate::error::{DesugarError, Result};
use crate::naming::SyntheticNaming;
use crate::options::DesugarOptions;
use crate::plan::{CompanionMethod, DispatchPlan, InterfacePlan, KeptVirtual, MoveKind};
use crate::LivenessOracle;

pub fn plan_interface(
    repo: &ClassRepo,
    naming: &SyntheticNaming<'_>,
    options: &DesugarOptions,
    liveness: &dyn LivenessOracle,
    iface: &ClassDef,
) -> Result<InterfacePlan> {
    debug_assert!(iface.is_interface());
    let mut plan = InterfacePlan::new(iface.ty.clone());

    plan_virtual_methods(repo, naming, options, liveness, iface, &mut plan)?;
    plan_direct_methods(naming, iface, &mut plan)?;

    // Mangled companion names are distinct by construction; a collision can
    // only arise from input that violates standard class-file rules.
    let mut seen: BTreeSet<&MethodRef> = BTreeSet::new();
    for companion in &plan.companion_methods {
        if !seen.insert(&companion.target) {
            return Err(DesugarError::CompanionNameCollision(
                companion.target.clone(),
            ));
        }
    }

    Ok(plan)
}

fn plan_virtual_methods(
    repo: &ClassRepo,
    naming: &SyntheticNaming<'_>,
    options: &DesugarOptions,
    liveness: &dyn LivenessOracle,
    iface: &ClassDef,
    plan: &mut InterfacePlan,
) -> Result<()> {
    for virtual_method in &iface.virtual_methods {
        if is_emulated_dispatch_owned(repo, options, iface, &virtual_method.reference) {
            // The emulated layer owns this lowering.
            debug!(method = %virtual_method.reference, "skipping emulated-dispatch method");
            plan.kept_virtuals.push(KeptVirtual {
                reference: virtual_method.reference.clone(),
                abstract_shim: false,
            });
            continue;
        }

        if virtual_method.is_default_method() {
            let code = virtual_method
                .code
                .as_ref()
                .ok_or_else(|| DesugarError::MissingDefaultCode(virtual_method.reference.clone()))?;
            if code.has_super_invoke_to_supertype(&iface.ty) {
                return Err(DesugarError::UnmovableDefault(
                    virtual_method.reference.clone(),
                ));
            }

            let target = naming.as_moved_default(&virtual_method.reference);
            let mut access = virtual_method.access;
            access.unset_bridge();
            access.promote_to_static();
            plan.origins
                .push((target.clone(), virtual_method.reference.clone()));
            plan.companion_methods.push(CompanionMethod {
                source: virtual_method.reference.clone(),
                target,
                access,
                kind: MoveKind::Default,
            });
        }

        if removal_changes_api(repo, liveness, iface, virtual_method) {
            plan.kept_virtuals.push(KeptVirtual {
                reference: virtual_method.reference.clone(),
                abstract_shim: true,
            });
        }
    }
    Ok(())
}

fn plan_direct_methods(
    naming: &SyntheticNaming<'_>,
    iface: &ClassDef,
    plan: &mut InterfacePlan,
) -> Result<()> {
    for direct in &iface.direct_methods {
        if direct.access.is_native() {
            return Err(DesugarError::NativeNotSupported(direct.reference.clone()));
        }
        if direct.is_class_initializer() {
            // Interfaces may carry `<clinit>` with side-effecting static
            // field initialization; moving it changes initialization order.
            plan.kept_directs.push(direct.reference.clone());
            continue;
        }

        let mut access = direct.access;
        if direct.access.is_static() {
            debug_assert!(
                direct.access.is_public() || direct.access.is_private(),
                "static interface method must be public or private: {}",
                direct.reference
            );
            if access.is_private() {
                access.promote_to_public();
            }
            let target = naming.as_moved_static(&direct.reference);
            plan.moves.push((direct.reference.clone(), target.clone()));
            plan.companion_methods.push(CompanionMethod {
                source: direct.reference.clone(),
                target,
                access,
                kind: MoveKind::Static,
            });
        } else if direct.access.is_private() {
            if direct.code.is_none() {
                return Err(DesugarError::MissingPrivateCode(direct.reference.clone()));
            }
            access.promote_to_public();
            access.promote_to_static();
            let target = naming.as_moved_private(&direct.reference);
            plan.moves.push((direct.reference.clone(), target.clone()));
            plan.companion_methods.push(CompanionMethod {
                source: direct.reference.clone(),
                target,
                access,
                kind: MoveKind::PrivateInstance,
            });
        } else {
            // Interfaces have no constructors at this point; anything else
            // here violates class-file rules.
            debug_assert!(
                false,
                "unexpected direct interface method: {}",
                direct.reference
            );
            plan.kept_directs.push(direct.reference.clone());
        }
    }
    Ok(())
}

/// Whether `method` must survive on the interface after its implementation
/// moves to the companion.
///
/// Always the case for pinned and non-bridge methods. A bridge can go only
/// when some reachable super-type declares a virtual with the same
/// signature, so resolution still succeeds for every subtype. A declaration
/// that is itself a bridge on a program interface does not count: it may be
/// scheduled for removal by its own interface's plan.
fn removal_changes_api(
    repo: &ClassRepo,
    liveness: &dyn LivenessOracle,
    iface: &ClassDef,
    method: &MethodDef,
) -> bool {
    if liveness.is_pinned(&method.reference) {
        return true;
    }
    if !method.access.is_bridge() {
        return true;
    }
    for entry in supertypes_of(repo, iface) {
        let Some(class) = repo.get(&entry.ty) else {
            continue;
        };
        let Some(found) = class.lookup_virtual_method(&method.reference) else {
            continue;
        };
        let may_disappear =
            class.is_program() && class.is_interface() && found.access.is_bridge();
        if !may_disappear {
            return false;
        }
    }
    true
}

/// Whether a virtual interface method is already lowered by the
/// emulated-dispatch layer: some emulated interface above the holder
/// declares the same signature.
pub fn is_emulated_dispatch_owned(
    repo: &ClassRepo,
    options: &DesugarOptions,
    holder: &ClassDef,
    method: &MethodRef,
) -> bool {
    if options.emulated_interfaces.is_empty() {
        return false;
    }
    if options.emulated_interfaces.contains(&holder.ty) {
        return holder.lookup_virtual_method(method).is_some();
    }
    supertypes_of(repo, holder).into_iter().any(|entry| {
        options.emulated_interfaces.contains(&entry.ty)
            && repo
                .get(&entry.ty)
                .is_some_and(|c| c.is_interface() && c.lookup_virtual_method(method).is_some())
    })
}

/// Scans program code for invocations of public static methods on library
/// interfaces. Only observed invocations get a forwarder, which keeps
/// separate compilations of disjoint inputs mergeable.
pub fn collect_dispatch_plans(
    repo: &ClassRepo,
    options: &DesugarOptions,
) -> Vec<DispatchPlan> {
    let mut plans: BTreeMap<TypeDescriptor, DispatchPlan> = BTreeMap::new();
    for class in repo.program_classes() {
        for method in class.methods() {
            let Some(code) = &method.code else {
                continue;
            };
            for (kind, target) in code.invokes() {
                if kind != InvokeKind::Static {
                    continue;
                }
                let Some(library) = repo.get(&target.holder) else {
                    continue;
                };
                if library.kind != ClassKind::Library || !library.is_interface() {
                    continue;
                }
                if options.emulated_interfaces.contains(&library.ty) {
                    // Owned by emulated dispatch.
                    continue;
                }
                let Some(found) = library.lookup_direct_method(target) else {
                    continue;
                };
                if !found.access.is_static() || !found.access.is_public() {
                    continue;
                }
                let plan = plans
                    .entry(library.ty.clone())
                    .or_insert_with(|| DispatchPlan::new(library.ty.clone()));
                plan.forwarders.insert(target.clone());
                plan.callers.insert(class.ty.clone());
            }
        }
    }
    plans.into_values().collect()
}
