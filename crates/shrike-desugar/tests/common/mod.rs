#![allow(dead_code)]

use shrike_core::CollectingDiagnostics;
use shrike_desugar::{
    DesugarOptions, DesugarOutcome, GraphLens, InterfaceDesugar, LivenessOracle, NoPinning,
};
use shrike_model::{
    ClassRepo, CodeBody, DebugInfo, InvokeKind, ItemFactory, MethodRef, PrimitiveType, StackCode,
    StackInsn, TypeDescriptor,
};

pub fn int() -> TypeDescriptor {
    TypeDescriptor::Primitive(PrimitiveType::Int)
}

/// `return <value>;`
pub fn returns_int(value: i32) -> CodeBody {
    CodeBody::Stack(StackCode {
        max_stack: 1,
        max_locals: 1,
        instructions: vec![StackInsn::ConstInt(value), StackInsn::ReturnValue],
        debug: Some(DebugInfo {
            parameter_names: Vec::new(),
            line_start: Some(1),
        }),
    })
}

/// `return this.<target>();` (or a static call when `kind` is `Static`).
pub fn invoke_and_return(kind: InvokeKind, target: MethodRef, interface_bit: bool) -> CodeBody {
    CodeBody::Stack(StackCode {
        max_stack: 1,
        max_locals: 1,
        instructions: vec![
            StackInsn::Load { slot: 0 },
            StackInsn::Invoke {
                kind,
                target,
                interface_bit,
            },
            StackInsn::ReturnValue,
        ],
        debug: None,
    })
}

pub fn run(
    repo: &mut ClassRepo,
    factory: &ItemFactory,
    options: &DesugarOptions,
) -> (DesugarOutcome, CollectingDiagnostics) {
    run_with(repo, factory, options, &NoPinning)
}

pub fn run_with(
    repo: &mut ClassRepo,
    factory: &ItemFactory,
    options: &DesugarOptions,
    liveness: &dyn LivenessOracle,
) -> (DesugarOutcome, CollectingDiagnostics) {
    let handler = CollectingDiagnostics::new();
    let outcome =
        InterfaceDesugar::new(repo, factory, options, liveness, &handler).run(GraphLens::identity());
    (outcome, handler)
}

/// A stable textual dump of every class for determinism comparisons.
pub fn dump(repo: &ClassRepo) -> Vec<String> {
    let mut out = Vec::new();
    for class in repo.iter() {
        out.push(format!("class {} flags={:#06x}", class.ty, class.access.bits()));
        for method in class.direct_methods.iter().chain(class.virtual_methods.iter()) {
            out.push(format!(
                "  {} flags={:#06x} body={}",
                method.reference,
                method.access.bits(),
                method.code.is_some()
            ));
        }
    }
    out
}
