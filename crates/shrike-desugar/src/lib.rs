//! Interface desugaring.
//!
//! Rewrites a class hierarchy that uses default, private, and static
//! interface methods into one that executes correctly on VMs supporting
//! only abstract interface methods: default and private bodies move to a
//! synthetic companion class, static members of immutable library
//! interfaces gain dispatch forwarders, interfaces keep abstract shims, and
//! a single graph lens records every rename for downstream call-site
//! rewriting.
//!
//! Planning is parallel across interfaces against a frozen repository;
//! synthesis merges the per-interface plans in sorted descriptor order, so
//! output is byte-deterministic regardless of thread count.

pub mod check;
mod error;
pub mod forward;
pub mod lens;
pub mod naming;
pub mod options;
pub mod plan;
pub mod planner;
pub mod retarget;
pub mod synthesize;

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use shrike_core::{CancellationToken, Diagnostic, DiagnosticsHandler};
use shrike_model::{ClassRepo, ItemFactory, MethodRef, TypeDescriptor};
use shrike_resolve::SubtypingInfo;

use crate::check::InvariantChecker;
use crate::planner::{collect_dispatch_plans, plan_interface};
use crate::synthesize::{synthesize_companion, synthesize_dispatch};

pub use error::{DesugarError, Result};
pub use lens::{BiMap, DesugarLens, DesugarLensBuilder, GraphLens};
pub use naming::{SyntheticNaming, COMPANION_CLASS_SUFFIX, DISPATCH_CLASS_SUFFIX};
pub use options::DesugarOptions;
pub use plan::{CompanionMethod, DispatchPlan, InterfacePlan, KeptVirtual, MoveKind};
pub use retarget::{
    DerivedMethod, EmulatedDispatchDescriptor, MachineRetargetFlags, RetargetConverter,
    RetargetSpec, SyntheticKind,
};

/// Liveness facts supplied by the shrinker. Absent a shrinker, nothing is
/// pinned.
pub trait LivenessOracle: Sync {
    fn is_pinned(&self, method: &MethodRef) -> bool;
}

pub struct NoPinning;

impl LivenessOracle for NoPinning {
    fn is_pinned(&self, _method: &MethodRef) -> bool {
        false
    }
}

/// What a desugaring run produced.
#[derive(Debug, Default)]
pub struct DesugarOutcome {
    /// The single lens downstream passes compose over; `None` when nothing
    /// was rewritten.
    pub lens: Option<GraphLens>,
    pub retarget: Option<MachineRetargetFlags>,
    /// Synthesized class descriptors, in publication order.
    pub synthesized: Vec<TypeDescriptor>,
    /// At least one interface failed; the run as a whole is failed even
    /// though other interfaces completed.
    pub failed: bool,
    /// The driver requested an abort; partial plans were discarded.
    pub aborted: bool,
}

pub struct InterfaceDesugar<'a> {
    repo: &'a mut ClassRepo,
    factory: &'a ItemFactory,
    options: &'a DesugarOptions,
    liveness: &'a dyn LivenessOracle,
    handler: &'a dyn DiagnosticsHandler,
    cancel: CancellationToken,
}

impl<'a> InterfaceDesugar<'a> {
    pub fn new(
        repo: &'a mut ClassRepo,
        factory: &'a ItemFactory,
        options: &'a DesugarOptions,
        liveness: &'a dyn LivenessOracle,
        handler: &'a dyn DiagnosticsHandler,
    ) -> Self {
        Self {
            repo,
            factory,
            options,
            liveness,
            handler,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn run(self, previous: Arc<GraphLens>) -> DesugarOutcome {
        let naming = SyntheticNaming::new(self.factory);
        let dispatch_plans = collect_dispatch_plans(self.repo, self.options);

        // Planning reads a frozen repository; per-interface plans are
        // independent.
        self.repo.freeze();
        let interfaces: Vec<TypeDescriptor> =
            self.repo.program_interfaces().map(|c| c.ty.clone()).collect();
        info!(
            interfaces = interfaces.len(),
            dispatch_classes = dispatch_plans.len(),
            "planning interface desugaring"
        );

        let results: Vec<Result<InterfacePlan>> = {
            let repo: &ClassRepo = self.repo;
            let cancel = &self.cancel;
            let options = self.options;
            let liveness = self.liveness;
            let naming = &naming;
            let pool = build_planner_pool(options.planner_threads());
            pool.install(|| {
                interfaces
                    .par_iter()
                    .map(|ty| {
                        if cancel.is_cancelled() {
                            return Err(DesugarError::Aborted);
                        }
                        let Some(iface) = repo.get(ty) else {
                            unreachable!("interface vanished from frozen repository: {ty}")
                        };
                        plan_interface(repo, naming, options, liveness, iface)
                    })
                    .collect()
            })
        };
        self.repo.unfreeze();

        if self.cancel.is_cancelled() {
            info!("desugaring aborted; discarding partial plans");
            return DesugarOutcome {
                aborted: true,
                ..DesugarOutcome::default()
            };
        }

        // Merge per-interface buffers; `interfaces` is already in sorted
        // descriptor order.
        let mut failed = false;
        let mut skipped: std::collections::BTreeSet<TypeDescriptor> = Default::default();
        let mut plans: Vec<InterfacePlan> = Vec::with_capacity(results.len());
        for (ty, result) in interfaces.iter().zip(results) {
            match result {
                Ok(plan) => plans.push(plan),
                Err(err) => {
                    failed = true;
                    skipped.insert(ty.clone());
                    let mut diagnostic = Diagnostic::error(err.code(), err.to_string());
                    if let Some(class) = self.repo.get(ty) {
                        diagnostic = diagnostic.with_origin(class.origin.clone());
                    }
                    self.handler.report(diagnostic);
                }
            }
        }

        let mut lens_builder = DesugarLensBuilder::new();
        for plan in &plans {
            for (from, to) in &plan.moves {
                lens_builder.move_method(from.clone(), to.clone());
            }
            for (method, origin) in &plan.origins {
                lens_builder.record_origin(method.clone(), origin.clone());
            }
        }
        for plan in &dispatch_plans {
            for original in &plan.forwarders {
                lens_builder.move_method(original.clone(), naming.as_dispatch_forward(original));
            }
        }

        let mut synthesized = Vec::new();
        for plan in &plans {
            match synthesize_companion(self.repo, &naming, self.options, plan) {
                Ok(Some(ty)) => synthesized.push(ty),
                Ok(None) => {}
                Err(err) => {
                    failed = true;
                    self.handler
                        .report(Diagnostic::error(err.code(), err.to_string()));
                }
            }
        }
        for plan in &dispatch_plans {
            match synthesize_dispatch(self.repo, &naming, self.options, plan) {
                Ok(ty) => synthesized.push(ty),
                Err(err) => {
                    failed = true;
                    self.handler
                        .report(Diagnostic::error(err.code(), err.to_string()));
                }
            }
        }

        let lens = lens_builder.build(previous);

        let subtyping = SubtypingInfo::build(self.repo);
        let retarget = match &self.options.retarget {
            Some(spec) => {
                let converter =
                    RetargetConverter::new(self.repo, self.factory, &subtyping, self.options);
                match converter.convert(spec) {
                    Ok(flags) => Some(flags),
                    Err(err) => {
                        failed = true;
                        self.handler
                            .report(Diagnostic::error(err.code(), err.to_string()));
                        None
                    }
                }
            }
            None => None,
        };

        let findings = InvariantChecker::new(self.repo, &naming, self.options, self.liveness).run(
            &plans,
            &dispatch_plans,
            &skipped,
            lens.as_ref(),
            retarget.as_ref(),
            &subtyping,
        );
        debug_assert!(
            findings.is_empty(),
            "desugaring invariants violated: {findings:#?}"
        );
        for finding in findings {
            warn!(message = %finding.message, "invariant finding");
            self.handler.report(finding);
        }

        info!(
            synthesized = synthesized.len(),
            failed, "interface desugaring done"
        );
        DesugarOutcome {
            lens: lens.map(GraphLens::InterfaceDesugar),
            retarget,
            synthesized,
            failed,
            aborted: false,
        }
    }
}

fn build_planner_pool(threads: usize) -> rayon::ThreadPool {
    // Thread creation can fail in constrained environments; degrade rather
    // than failing the run.
    let requested = threads.max(1);
    let mut desired = requested;
    loop {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(desired)
            .thread_name(|idx| format!("shrike-plan-{idx}"))
            .build()
        {
            Ok(pool) => return pool,
            Err(_err) if desired > 1 => {
                desired /= 2;
                continue;
            }
            Err(err) => panic!(
                "failed to build planner pool (requested {requested} thread(s)): {err}"
            ),
        }
    }
}
