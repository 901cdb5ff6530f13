//! Post-synthesis invariant checks.
//!
//! Re-derives every post-condition the planner and synthesizer promised.
//! Findings indicate a bug in this module: fatal in debug builds, reported
//! as warnings otherwise.

use std::collections::BTreeSet;

use shrike_core::Diagnostic;
use shrike_model::{ClassRepo, MethodRef, TypeDescriptor};
use shrike_resolve::{resolve, ResolutionResult, SubtypingInfo};

use crate::lens::DesugarLens;
use crate::naming::SyntheticNaming;
use crate::options::DesugarOptions;
use crate::plan::{DispatchPlan, InterfacePlan};
use crate::planner::is_emulated_dispatch_owned;
use crate::retarget::MachineRetargetFlags;
use crate::LivenessOracle;

const CODE: &str = "desugar/invariant";

pub struct InvariantChecker<'a> {
    repo: &'a ClassRepo,
    naming: &'a SyntheticNaming<'a>,
    options: &'a DesugarOptions,
    liveness: &'a dyn LivenessOracle,
    findings: Vec<Diagnostic>,
}

impl<'a> InvariantChecker<'a> {
    pub fn new(
        repo: &'a ClassRepo,
        naming: &'a SyntheticNaming<'a>,
        options: &'a DesugarOptions,
        liveness: &'a dyn LivenessOracle,
    ) -> Self {
        Self {
            repo,
            naming,
            options,
            liveness,
            findings: Vec::new(),
        }
    }

    pub fn run(
        mut self,
        plans: &[InterfacePlan],
        dispatch_plans: &[DispatchPlan],
        skipped: &BTreeSet<TypeDescriptor>,
        lens: Option<&DesugarLens>,
        retarget: Option<&MachineRetargetFlags>,
        subtyping: &SubtypingInfo,
    ) -> Vec<Diagnostic> {
        self.check_program_interfaces(skipped);
        self.check_companions(plans);
        self.check_lens_totality(plans, dispatch_plans, lens);
        if let Some(retarget) = retarget {
            self.check_no_emulated_override(retarget, subtyping);
        }
        self.findings
    }

    fn finding(&mut self, message: String) {
        self.findings.push(Diagnostic::warning(CODE, message));
    }

    fn check_program_interfaces(&mut self, skipped: &BTreeSet<TypeDescriptor>) {
        for iface in self.repo.program_interfaces() {
            if skipped.contains(&iface.ty) {
                // The plan for this interface failed with a compile error;
                // its post-conditions cannot hold.
                continue;
            }
            for method in &iface.virtual_methods {
                if is_emulated_dispatch_owned(self.repo, self.options, iface, &method.reference) {
                    continue;
                }
                if !method.access.is_abstract() || method.code.is_some() {
                    self.finding(format!(
                        "non-abstract virtual method left on interface: {}",
                        method.reference
                    ));
                }
                if method.access.is_bridge() && !self.liveness.is_pinned(&method.reference) {
                    self.finding(format!(
                        "unpinned bridge left on interface: {}",
                        method.reference
                    ));
                }
            }
            for method in &iface.direct_methods {
                if !method.is_class_initializer() {
                    self.finding(format!(
                        "direct method other than <clinit> left on interface: {}",
                        method.reference
                    ));
                }
            }
        }
    }

    fn check_companions(&mut self, plans: &[InterfacePlan]) {
        for plan in plans {
            let Some(iface_name) = plan.interface.as_class_name() else {
                continue;
            };
            let companion_ty = self.naming.companion_of(iface_name);
            if !plan.needs_companion() {
                if self.repo.contains(&companion_ty) {
                    self.finding(format!(
                        "companion synthesized for empty plan: {companion_ty}"
                    ));
                }
                continue;
            }
            let Some(companion) = self.repo.get(&companion_ty) else {
                self.finding(format!("missing companion class: {companion_ty}"));
                continue;
            };
            if !companion.access.is_public()
                || !companion.access.is_final()
                || !companion.access.is_synthetic()
                || companion.is_interface()
            {
                self.finding(format!("malformed companion flags: {companion_ty}"));
            }
            if !companion.fields.is_empty() || !companion.virtual_methods.is_empty() {
                self.finding(format!("companion must hold only direct methods: {companion_ty}"));
            }
            for moved in &plan.companion_methods {
                let Some(method) = companion.lookup_direct_method(&moved.target) else {
                    self.finding(format!("missing companion method: {}", moved.target));
                    continue;
                };
                if !method.access.is_public() || !method.access.is_static() {
                    self.finding(format!("companion method not public static: {}", moved.target));
                }
                if moved.kind.prepends_receiver()
                    && method.reference.proto.params.first() != Some(&plan.interface)
                {
                    self.finding(format!(
                        "companion method does not take the interface as parameter zero: {}",
                        moved.target
                    ));
                }
            }
        }
    }

    /// Every moved reference must map forward; every synthesized reference
    /// must map back.
    fn check_lens_totality(
        &mut self,
        plans: &[InterfacePlan],
        dispatch_plans: &[DispatchPlan],
        lens: Option<&DesugarLens>,
    ) {
        let moved: Vec<(MethodRef, MethodRef)> = plans
            .iter()
            .flat_map(|p| p.moves.iter().cloned())
            .chain(dispatch_plans.iter().flat_map(|p| {
                p.forwarders
                    .iter()
                    .map(|m| (m.clone(), self.naming.as_dispatch_forward(m)))
            }))
            .collect();
        let origins: Vec<(MethodRef, MethodRef)> = plans
            .iter()
            .flat_map(|p| p.origins.iter().cloned())
            .collect();

        let Some(lens) = lens else {
            if !moved.is_empty() || !origins.is_empty() {
                self.finding("members moved but no lens was built".to_string());
            }
            return;
        };
        for (old, new) in &moved {
            if lens.get_next_method_signature(old) != *new {
                self.finding(format!("lens has no forward mapping for {old}"));
            }
            if lens.get_original_method_signature(new) != *old {
                self.finding(format!("lens has no reverse mapping for {new}"));
            }
        }
        for (new, old) in &origins {
            if lens.get_original_method_signature(new) != *old {
                self.finding(format!("lens has no origin mapping for {new}"));
            }
        }
    }

    /// A method scheduled for emulated virtual retargeting must not be
    /// overridden by any subtype in the closure; an override would silently
    /// bypass the emulated dispatch.
    fn check_no_emulated_override(
        &mut self,
        retarget: &MachineRetargetFlags,
        subtyping: &SubtypingInfo,
    ) {
        let mut findings = Vec::new();
        for src in retarget.emulated_virtual_retarget.keys() {
            for subtype in subtyping.subtypes_of(&src.holder) {
                if let ResolutionResult::Resolved { method, .. } = resolve(self.repo, &subtype, src)
                {
                    if method.reference != *src {
                        findings.push(format!(
                            "emulated retarget of {src} is overridden by {}",
                            method.reference
                        ));
                    }
                }
            }
        }
        for finding in findings {
            self.finding(finding);
        }
    }
}
