//! Per-interface plan buffers.
//!
//! Plans are computed in parallel against a frozen repository and merged in
//! sorted interface-descriptor order before synthesis, so no cross-interface
//! ordering is needed while planning.

use std::collections::BTreeSet;

use shrike_model::{AccessFlags, MethodRef, TypeDescriptor};

/// Which shape of move produced a companion method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Default,
    Static,
    PrivateInstance,
}

impl MoveKind {
    /// Whether the move prepends the receiver as parameter zero.
    pub fn prepends_receiver(self) -> bool {
        matches!(self, MoveKind::Default | MoveKind::PrivateInstance)
    }
}

/// One method scheduled for the companion class.
#[derive(Clone, Debug)]
pub struct CompanionMethod {
    /// The original member on the interface.
    pub source: MethodRef,
    /// The re-signed member on the companion.
    pub target: MethodRef,
    /// Flags of the companion method (already promoted/staticized).
    pub access: AccessFlags,
    pub kind: MoveKind,
}

/// A virtual method surviving on the interface.
#[derive(Clone, Debug)]
pub struct KeptVirtual {
    pub reference: MethodRef,
    /// True for the usual abstract shim; false when the method is owned by
    /// the emulated-dispatch layer and must be left untouched.
    pub abstract_shim: bool,
}

/// Everything the planner decided for one program interface.
#[derive(Clone, Debug)]
pub struct InterfacePlan {
    pub interface: TypeDescriptor,
    pub companion_methods: Vec<CompanionMethod>,
    pub kept_virtuals: Vec<KeptVirtual>,
    /// Direct methods surviving on the interface (at most `<clinit>`).
    pub kept_directs: Vec<MethodRef>,
    /// Forward moves recorded for the lens: original → companion.
    pub moves: Vec<(MethodRef, MethodRef)>,
    /// Moved-default origins recorded for the lens: companion → original.
    pub origins: Vec<(MethodRef, MethodRef)>,
}

impl InterfacePlan {
    pub fn new(interface: TypeDescriptor) -> Self {
        Self {
            interface,
            companion_methods: Vec::new(),
            kept_virtuals: Vec::new(),
            kept_directs: Vec::new(),
            moves: Vec::new(),
            origins: Vec::new(),
        }
    }

    pub fn needs_companion(&self) -> bool {
        !self.companion_methods.is_empty()
    }
}

/// A dispatch class planned for one library interface.
#[derive(Clone, Debug)]
pub struct DispatchPlan {
    pub interface: TypeDescriptor,
    /// Library statics observed as invoked; forwarders are emitted for these
    /// and nothing else.
    pub forwarders: BTreeSet<MethodRef>,
    /// Program classes whose code references the interface.
    pub callers: BTreeSet<TypeDescriptor>,
}

impl DispatchPlan {
    pub fn new(interface: TypeDescriptor) -> Self {
        Self {
            interface,
            forwarders: BTreeSet::new(),
            callers: BTreeSet::new(),
        }
    }
}
