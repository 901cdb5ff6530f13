//! Desugaring configuration.

use std::collections::BTreeSet;

use shrike_model::TypeDescriptor;

use crate::retarget::RetargetSpec;

#[derive(Debug, Clone, Default)]
pub struct DesugarOptions {
    /// When on, synthesized companions derive a checksum from their
    /// interface; when off, requesting a checksum is an error.
    pub encode_checksums: bool,
    /// Library interfaces whose lowering is owned by the emulated-dispatch
    /// layer; the planner defers to it.
    pub emulated_interfaces: BTreeSet<TypeDescriptor>,
    /// Optional retargeting of platform members to a compatibility library.
    pub retarget: Option<RetargetSpec>,
    /// Planner threads. Zero picks a default from available parallelism.
    pub threads: usize,
}

impl DesugarOptions {
    pub fn planner_threads(&self) -> usize {
        if self.threads != 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .saturating_sub(1)
            .clamp(1, 16)
    }
}
