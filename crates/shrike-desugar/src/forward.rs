//! Builds forwarding method bodies.

use shrike_model::{CodeBody, MethodRef, StackCode, StackInsn, TypeDescriptor};

/// Emits a static method whose body forwards every argument to another
/// static method and returns its result. Used for dispatch-class forwarders
/// targeting static methods that remain on a library interface, where the
/// constant-pool reference must keep its interface bit.
pub struct ForwardMethodBuilder {
    source: Option<MethodRef>,
    target: Option<MethodRef>,
    target_is_interface: bool,
}

impl ForwardMethodBuilder {
    pub fn builder() -> Self {
        Self {
            source: None,
            target: None,
            target_is_interface: false,
        }
    }

    pub fn set_static_source(mut self, source: MethodRef) -> Self {
        self.source = Some(source);
        self
    }

    pub fn set_static_target(mut self, target: MethodRef, is_interface: bool) -> Self {
        self.target = Some(target);
        self.target_is_interface = is_interface;
        self
    }

    pub fn build(self) -> CodeBody {
        let (source, target) = match (self.source, self.target) {
            (Some(source), Some(target)) => (source, target),
            _ => unreachable!("forward method builder requires a source and a target"),
        };
        debug_assert_eq!(source.proto.params, target.proto.params);

        let mut instructions = Vec::with_capacity(source.proto.params.len() + 2);
        let mut slot = 0u16;
        for param in &source.proto.params {
            instructions.push(StackInsn::Load { slot });
            slot += param.slot_width();
        }
        instructions.push(StackInsn::Invoke {
            kind: shrike_model::InvokeKind::Static,
            target,
            interface_bit: self.target_is_interface,
        });
        instructions.push(if source.proto.ret == TypeDescriptor::Void {
            StackInsn::Return
        } else {
            StackInsn::ReturnValue
        });

        let locals = source.proto.parameter_slots();
        let stack = locals.max(source.proto.ret.slot_width());
        CodeBody::Stack(StackCode {
            max_stack: stack,
            max_locals: locals,
            instructions,
            debug: None,
        })
    }
}
