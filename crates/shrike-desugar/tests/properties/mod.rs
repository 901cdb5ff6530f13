//! Quantified post-conditions of the pass.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use shrike_desugar::{DesugarOptions, LivenessOracle, SyntheticNaming};
use shrike_model::{
    AccessFlags, ClassDefBuilder, ClassKind, ClassRepo, InvokeKind, ItemFactory, MethodRef,
    TypeDescriptor,
};

use crate::common::{dump, int, invoke_and_return, returns_int, run, run_with};

struct PinSet(BTreeSet<MethodRef>);

impl LivenessOracle for PinSet {
    fn is_pinned(&self, method: &MethodRef) -> bool {
        self.0.contains(method)
    }
}

/// A mixed interface: a default, a dead bridge, a private instance method,
/// a static, and a class initializer.
fn publish_mixed_interface(repo: &mut ClassRepo, factory: &ItemFactory, name: &str) {
    let iface = factory.class_type(name);
    let object = factory.class_type("java/lang/Object");
    let super_iface = factory.class_type(&format!("{name}Base"));
    repo.publish(
        ClassDefBuilder::new(super_iface.clone(), ClassKind::Program)
            .interface()
            .virtual_method(
                "o",
                factory.proto(vec![], object.clone()),
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                None,
            )
            .build(),
    )
    .unwrap();
    repo.publish(
        ClassDefBuilder::new(iface.clone(), ClassKind::Program)
            .interface()
            .implements(super_iface)
            .virtual_method(
                "m",
                factory.proto(vec![], int()),
                AccessFlags::PUBLIC,
                Some(returns_int(7)),
            )
            // Dead bridge: the super-interface declares the signature.
            .virtual_method(
                "o",
                factory.proto(vec![], object),
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT | AccessFlags::BRIDGE,
                None,
            )
            .direct_method(
                "p",
                factory.proto(vec![], int()),
                AccessFlags::PRIVATE,
                Some(returns_int(1)),
            )
            .direct_method(
                "s",
                factory.proto(vec![], int()),
                AccessFlags::PUBLIC | AccessFlags::STATIC,
                Some(returns_int(2)),
            )
            .direct_method(
                "<clinit>",
                factory.proto(vec![], TypeDescriptor::Void),
                AccessFlags::STATIC,
                Some(returns_int(0)),
            )
            .build(),
    )
    .unwrap();
}

/// For every default method, either the companion holds its moved form with
/// the interface prepended, or the method was a dead bridge and vanished.
/// No third outcome.
#[test]
fn move_totality() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    publish_mixed_interface(&mut repo, &factory, "com/example/I");

    let iface = factory.class_type("com/example/I");
    let originals: Vec<MethodRef> = repo
        .get(&iface)
        .unwrap()
        .virtual_methods
        .iter()
        .filter(|m| m.code.is_some())
        .map(|m| m.reference.clone())
        .collect();

    let (outcome, _diags) = run(&mut repo, &factory, &DesugarOptions::default());
    assert!(!outcome.failed);

    let naming = SyntheticNaming::new(&factory);
    let companion = repo.get(&factory.class_type("com/example/I$-CC")).unwrap();
    for original in originals {
        let moved = naming.as_moved_default(&original);
        let held = companion.lookup_direct_method(&moved).unwrap();
        assert!(held.access.is_public() && held.access.is_static());
        assert_eq!(held.reference.proto.params.first(), Some(&iface));
        assert_eq!(held.reference.proto.params[1..], original.proto.params[..]);
        assert_eq!(held.reference.proto.ret, original.proto.ret);
    }
}

/// Every method remaining on a program interface is an abstract non-bridge,
/// or pinned.
#[test]
fn shim_abstractness() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    publish_mixed_interface(&mut repo, &factory, "com/example/I");

    let (outcome, _diags) = run(&mut repo, &factory, &DesugarOptions::default());
    assert!(!outcome.failed);

    for iface in repo.program_interfaces() {
        for method in &iface.virtual_methods {
            assert!(
                method.access.is_abstract() && !method.access.is_bridge(),
                "non-shim survived: {}",
                method.reference
            );
            assert!(method.code.is_none());
        }
        for method in &iface.direct_methods {
            assert!(method.is_class_initializer());
        }
    }
}

/// A pinned bridge keeps its shim even when a super-type declares the
/// signature.
#[test]
fn pinned_bridge_is_kept() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    publish_mixed_interface(&mut repo, &factory, "com/example/I");
    let bridge = factory.method(
        factory.class_type("com/example/I"),
        "o",
        vec![],
        factory.class_type("java/lang/Object"),
    );
    let pins = PinSet(BTreeSet::from([bridge.clone()]));

    let (outcome, _diags) = run_with(&mut repo, &factory, &DesugarOptions::default(), &pins);
    assert!(!outcome.failed);

    let iface = repo.get(&factory.class_type("com/example/I")).unwrap();
    assert!(iface.lookup_virtual_method(&bridge).is_some());
}

/// lens.forward(lens.backward(new)) == new and the converse for every moved
/// member.
#[test]
fn lens_bijection() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    publish_mixed_interface(&mut repo, &factory, "com/example/I");

    let iface = factory.class_type("com/example/I");
    let s_old = factory.method(iface.clone(), "s", vec![], int());
    let p_old = factory.method(iface.clone(), "p", vec![], int());

    let (outcome, _diags) = run(&mut repo, &factory, &DesugarOptions::default());
    let lens = outcome.lens.unwrap();
    let lens = lens.as_interface_desugar().unwrap();

    for old in [s_old, p_old] {
        let new = lens.get_next_method_signature(&old);
        assert_ne!(new, old, "member must be moved: {old}");
        assert_eq!(lens.get_original_method_signature(&new), old);
        assert_eq!(lens.get_next_method_signature(&lens.get_original_method_signature(&new)), new);
    }
}

/// The lens reports STATIC for moved members regardless of the original
/// opcode.
#[test]
fn invocation_type_normalization() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    publish_mixed_interface(&mut repo, &factory, "com/example/I");

    let iface = factory.class_type("com/example/I");
    let default_old = factory.method(iface.clone(), "m", vec![], int());
    let static_old = factory.method(iface.clone(), "s", vec![], int());

    let (outcome, _diags) = run(&mut repo, &factory, &DesugarOptions::default());
    let lens = outcome.lens.unwrap();
    let lens = lens.as_interface_desugar().unwrap();

    for original_kind in [
        InvokeKind::Virtual,
        InvokeKind::Super,
        InvokeKind::Direct,
        InvokeKind::Static,
        InvokeKind::Interface,
    ] {
        let (_, kind) = lens.lookup_method(&default_old, None, original_kind);
        assert_eq!(kind, InvokeKind::Static);
        let (_, kind) = lens.lookup_method(&static_old, None, original_kind);
        assert_eq!(kind, InvokeKind::Static);
    }
}

/// Desugaring two disjoint partitions produces the same companion names as
/// desugaring the union, so separately compiled outputs merge without
/// collision.
#[test]
fn separate_compilation_idempotence() {
    let build_partition = |names: &[&str]| {
        let factory = ItemFactory::new();
        let mut repo = ClassRepo::new();
        for name in names {
            publish_mixed_interface(&mut repo, &factory, name);
        }
        let (outcome, _diags) = run(&mut repo, &factory, &DesugarOptions::default());
        assert!(!outcome.failed);
        outcome
            .synthesized
            .into_iter()
            .map(|ty| ty.descriptor())
            .collect::<BTreeSet<String>>()
    };

    let left = build_partition(&["com/example/A"]);
    let right = build_partition(&["com/example/B"]);
    let union = build_partition(&["com/example/A", "com/example/B"]);

    let merged: BTreeSet<String> = left.union(&right).cloned().collect();
    assert_eq!(merged, union);
}

/// Two runs over the same input emit identical class sets in identical
/// order, irrespective of thread count.
#[test]
fn determinism_across_thread_counts() {
    let build_and_run = |threads: usize| {
        let factory = ItemFactory::new();
        let mut repo = ClassRepo::new();
        for name in ["com/example/A", "com/example/B", "com/example/C"] {
            publish_mixed_interface(&mut repo, &factory, name);
        }
        let options = DesugarOptions {
            threads,
            ..DesugarOptions::default()
        };
        let (outcome, _diags) = run(&mut repo, &factory, &options);
        assert!(!outcome.failed);
        let synthesized: Vec<String> = outcome
            .synthesized
            .iter()
            .map(|ty| ty.descriptor())
            .collect();
        (synthesized, dump(&repo))
    };

    let (synth_single, dump_single) = build_and_run(1);
    let (synth_many, dump_many) = build_and_run(8);
    assert_eq!(synth_single, synth_many);
    assert_eq!(dump_single, dump_many);
}

/// A bridge overriding a bridge default in a super-interface keeps its
/// shim: the super-interface's declaration may itself be removed, so
/// dropping both would change subtype resolution.
#[test]
fn bridge_over_removable_bridge_is_kept() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    let object = factory.class_type("java/lang/Object");
    let base = factory.class_type("com/example/Base");
    let iface = factory.class_type("com/example/I");

    repo.publish(
        ClassDefBuilder::new(base.clone(), ClassKind::Program)
            .interface()
            .virtual_method(
                "o",
                factory.proto(vec![], object.clone()),
                AccessFlags::PUBLIC | AccessFlags::BRIDGE,
                Some(returns_int(0)),
            )
            .build(),
    )
    .unwrap();
    repo.publish(
        ClassDefBuilder::new(iface.clone(), ClassKind::Program)
            .interface()
            .implements(base.clone())
            .virtual_method(
                "o",
                factory.proto(vec![], object.clone()),
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT | AccessFlags::BRIDGE,
                None,
            )
            .build(),
    )
    .unwrap();

    let (outcome, _diags) = run(&mut repo, &factory, &DesugarOptions::default());
    assert!(!outcome.failed);

    let o_ref = factory.method(iface.clone(), "o", vec![], object.clone());
    let kept = repo.get(&iface).unwrap().lookup_virtual_method(&o_ref).unwrap();
    assert!(kept.access.is_abstract());

    // The super-interface's own bridge moved out and left a shim too.
    let base_def = repo.get(&base).unwrap();
    assert_eq!(base_def.virtual_methods.len(), 1);
    assert!(base_def.virtual_methods[0].access.is_abstract());
}

/// A method owned by the emulated-dispatch layer is skipped entirely.
#[test]
fn emulated_dispatch_owned_method_is_skipped() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    let emulated = factory.class_type("j$/util/Collection");
    repo.publish(
        ClassDefBuilder::new(emulated.clone(), ClassKind::Library)
            .interface()
            .virtual_method(
                "stream",
                factory.proto(vec![], factory.class_type("j$/util/Stream")),
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                None,
            )
            .build(),
    )
    .unwrap();
    let iface = factory.class_type("com/example/I");
    repo.publish(
        ClassDefBuilder::new(iface.clone(), ClassKind::Program)
            .interface()
            .implements(emulated.clone())
            .virtual_method(
                "stream",
                factory.proto(vec![], factory.class_type("j$/util/Stream")),
                AccessFlags::PUBLIC,
                Some(invoke_and_return(
                    InvokeKind::Static,
                    factory.method(
                        factory.class_type("com/example/Streams"),
                        "empty",
                        vec![],
                        factory.class_type("j$/util/Stream"),
                    ),
                    false,
                )),
            )
            .build(),
    )
    .unwrap();

    let options = DesugarOptions {
        emulated_interfaces: BTreeSet::from([emulated]),
        ..DesugarOptions::default()
    };
    let (outcome, _diags) = run(&mut repo, &factory, &options);
    assert!(!outcome.failed);

    // The method keeps its body; no companion is synthesized for it.
    let iface_def = repo.get(&iface).unwrap();
    assert!(iface_def.virtual_methods[0].code.is_some());
    assert!(outcome.synthesized.is_empty());
    assert!(outcome.lens.is_none());
}
