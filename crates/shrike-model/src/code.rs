//! Method bodies.
//!
//! Two code formats flow through the pipeline: stack-machine code as read
//! from class files, and register-machine code as emitted for Dalvik. The
//! desugaring passes only ever ask a body "which methods do you invoke?"
//! and "do you contain a super-invocation?", so the model keeps the
//! instruction shapes those queries need. Each format answers the queries
//! independently.

use shrike_core::Name;

use crate::descriptor::TypeDescriptor;
use crate::member::MethodRef;

/// Invocation kind, tracked per call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvokeKind {
    Virtual,
    Super,
    Direct,
    Static,
    Interface,
}

/// Debug metadata attached to a body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebugInfo {
    /// One entry per declared parameter, in order. `None` for an unnamed slot.
    pub parameter_names: Vec<Option<Name>>,
    pub line_start: Option<u32>,
}

impl DebugInfo {
    /// Accounts for the receiver slot inserted when an instance method is
    /// rewritten to a static with the receiver as parameter zero.
    pub fn prepend_this_parameter(&mut self) {
        self.parameter_names.insert(0, Some(Name::new("this")));
    }
}

/// Stack-machine instruction (class-file format).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackInsn {
    /// Load a local-variable slot onto the stack.
    Load { slot: u16 },
    ConstInt(i32),
    Invoke {
        kind: InvokeKind,
        target: MethodRef,
        /// Whether the target holder is an interface (the `interface` bit on
        /// the constant-pool reference).
        interface_bit: bool,
    },
    Return,
    ReturnValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackCode {
    pub max_stack: u16,
    pub max_locals: u16,
    pub instructions: Vec<StackInsn>,
    pub debug: Option<DebugInfo>,
}

impl StackCode {
    /// True when the body contains a super-invocation from `holder` to a
    /// method declared outside `holder`. Such a call has meaning only from
    /// the declaring interface itself.
    pub fn has_super_invoke_to_supertype(&self, holder: &TypeDescriptor) -> bool {
        self.instructions.iter().any(|insn| {
            matches!(
                insn,
                StackInsn::Invoke { kind: InvokeKind::Super, target, .. }
                    if target.holder != *holder
            )
        })
    }

    pub fn invokes(&self) -> impl Iterator<Item = (InvokeKind, &MethodRef)> {
        self.instructions.iter().filter_map(|insn| match insn {
            StackInsn::Invoke { kind, target, .. } => Some((*kind, target)),
            _ => None,
        })
    }
}

/// Register-machine instruction (Dalvik format).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterInsn {
    ConstInt { register: u16, value: i32 },
    Invoke { kind: InvokeKind, target: MethodRef },
    MoveResult { register: u16 },
    ReturnVoid,
    Return { register: u16 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterCode {
    pub registers: u16,
    pub instructions: Vec<RegisterInsn>,
    pub debug: Option<DebugInfo>,
}

impl RegisterCode {
    /// In the register format any `invoke-super` pins the body to its holder.
    pub fn has_super_invoke(&self) -> bool {
        self.instructions.iter().any(|insn| {
            matches!(
                insn,
                RegisterInsn::Invoke {
                    kind: InvokeKind::Super,
                    ..
                }
            )
        })
    }

    pub fn invokes(&self) -> impl Iterator<Item = (InvokeKind, &MethodRef)> {
        self.instructions.iter().filter_map(|insn| match insn {
            RegisterInsn::Invoke { kind, target } => Some((*kind, target)),
            _ => None,
        })
    }
}

/// A method body in either format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeBody {
    Stack(StackCode),
    Register(RegisterCode),
}

impl CodeBody {
    /// Whether this body contains a super-invocation that would lose its
    /// meaning if the body moved out of `holder`.
    pub fn has_super_invoke_to_supertype(&self, holder: &TypeDescriptor) -> bool {
        match self {
            CodeBody::Stack(code) => code.has_super_invoke_to_supertype(holder),
            CodeBody::Register(code) => code.has_super_invoke(),
        }
    }

    pub fn invokes(&self) -> Box<dyn Iterator<Item = (InvokeKind, &MethodRef)> + '_> {
        match self {
            CodeBody::Stack(code) => Box::new(code.invokes()),
            CodeBody::Register(code) => Box::new(code.invokes()),
        }
    }

    pub fn debug_mut(&mut self) -> Option<&mut DebugInfo> {
        match self {
            CodeBody::Stack(code) => code.debug.as_mut(),
            CodeBody::Register(code) => code.debug.as_mut(),
        }
    }

    /// Adjusts debug info for the inserted receiver slot after a move.
    pub fn set_fake_this_parameter(&mut self) {
        if let Some(debug) = self.debug_mut() {
            debug.prepend_this_parameter();
        }
    }
}
