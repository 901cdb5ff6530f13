//! Retargeting conversion.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use shrike_desugar::{DesugarOptions, RetargetConverter, RetargetSpec};
use shrike_model::{
    AccessFlags, ClassDefBuilder, ClassKind, ClassRepo, ItemFactory, TypeDescriptor,
};
use shrike_resolve::SubtypingInfo;

use crate::common::int;

#[test]
fn spec_parses_from_json() {
    let spec = RetargetSpec::from_json(
        r#"{ "retarget": { "Ljava/lang/Math;->max(II)I": "j$/lang/Math8" } }"#,
    )
    .unwrap();
    assert_eq!(spec.retarget.len(), 1);
}

/// static → StaticRetarget, propagated to subtypes resolving to the same
/// definition.
#[test]
fn static_member_uses_static_retarget() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    let math = factory.class_type("java/lang/Math");
    repo.publish(
        ClassDefBuilder::new(math.clone(), ClassKind::Library)
            .direct_method(
                "max",
                factory.proto(vec![int(), int()], int()),
                AccessFlags::PUBLIC | AccessFlags::STATIC,
                None,
            )
            .build(),
    )
    .unwrap();
    repo.publish(
        ClassDefBuilder::new(factory.class_type("com/example/MyMath"), ClassKind::Program)
            .super_type(Some(math.clone()))
            .build(),
    )
    .unwrap();

    let spec = RetargetSpec::from_json(
        r#"{ "retarget": { "Ljava/lang/Math;->max(II)I": "j$/lang/Math8" } }"#,
    )
    .unwrap();
    let options = DesugarOptions::default();
    let subtyping = SubtypingInfo::build(&repo);
    let converter = RetargetConverter::new(&repo, &factory, &subtyping, &options);
    let flags = converter.convert(&spec).unwrap();

    let src = factory.method(math.clone(), "max", vec![int(), int()], int());
    let dest = factory.method(factory.class_type("j$/lang/Math8"), "max", vec![int(), int()], int());
    assert_eq!(flags.static_retarget[&src], dest);
    // The subtype resolves to the same definition, so its reference
    // retargets too.
    let via_subtype = src.with_holder(factory.class_type("com/example/MyMath"));
    assert_eq!(flags.static_retarget[&via_subtype], dest);
    assert!(flags.non_emulated_virtual_retarget.is_empty());
    assert!(flags.emulated_virtual_retarget.is_empty());
}

/// final virtual → NonEmulatedVirtualRetarget with the receiver prepended.
#[test]
fn final_virtual_uses_non_emulated_retarget() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    let string = factory.class_type("java/lang/String");
    repo.publish(
        ClassDefBuilder::new(string.clone(), ClassKind::Library)
            .access(AccessFlags::PUBLIC | AccessFlags::FINAL)
            .virtual_method(
                "strip",
                factory.proto(vec![], string.clone()),
                AccessFlags::PUBLIC,
                None,
            )
            .build(),
    )
    .unwrap();

    let spec = RetargetSpec::from_json(
        r#"{ "retarget": { "Ljava/lang/String;->strip()Ljava/lang/String;": "j$/lang/String8" } }"#,
    )
    .unwrap();
    let options = DesugarOptions::default();
    let subtyping = SubtypingInfo::build(&repo);
    let converter = RetargetConverter::new(&repo, &factory, &subtyping, &options);
    let flags = converter.convert(&spec).unwrap();

    let src = factory.method(string.clone(), "strip", vec![], string.clone());
    let dest = &flags.non_emulated_virtual_retarget[&src];
    assert_eq!(dest.holder, factory.class_type("j$/lang/String8"));
    // The receiver became parameter zero.
    assert_eq!(dest.proto.params, vec![string.clone()]);
    assert_eq!(dest.proto.ret, string);
}

/// A virtual already reachable through an emulated interface is owned by
/// emulated dispatch: no retarget entry.
#[test]
fn emulated_interface_ownership_wins() {
    let factory = ItemFactory::new();
    let mut repo = ClassRepo::new();
    let iterable = factory.class_type("java/lang/Iterable");
    let date = factory.class_type("x/y/Date");
    repo.publish(
        ClassDefBuilder::new(iterable.clone(), ClassKind::Library)
            .interface()
            .virtual_method(
                "refresh",
                factory.proto(vec![], TypeDescriptor::Void),
                AccessFlags::PUBLIC | AccessFlags::ABSTRACT,
                None,
            )
            .build(),
    )
    .unwrap();
    repo.publish(
        ClassDefBuilder::new(date.clone(), ClassKind::Library)
            .implements(iterable.clone())
            .virtual_method(
                "refresh",
                factory.proto(vec![], TypeDescriptor::Void),
                AccessFlags::PUBLIC,
                None,
            )
            .build(),
    )
    .unwrap();

    let spec = RetargetSpec::from_json(
        r#"{ "retarget": { "Lx/y/Date;->refresh()V": "j$/util/DesugarDate" } }"#,
    )
    .unwrap();
    let options = DesugarOptions {
        emulated_interfaces: BTreeSet::from([iterable]),
        ..DesugarOptions::default()
    };
    let subtyping = SubtypingInfo::build(&repo);
    let converter = RetargetConverter::new(&repo, &factory, &subtyping, &options);
    let flags = converter.convert(&spec).unwrap();
    assert!(flags.is_empty());
}

/// A specification entry naming a member outside the closure is an error.
#[test]
fn unknown_member_is_rejected() {
    let factory = ItemFactory::new();
    let repo = ClassRepo::new();
    let spec = RetargetSpec::from_json(
        r#"{ "retarget": { "Lx/y/Gone;->f()V": "j$/x/Gone8" } }"#,
    )
    .unwrap();
    let options = DesugarOptions::default();
    let subtyping = SubtypingInfo::build(&repo);
    let converter = RetargetConverter::new(&repo, &factory, &subtyping, &options);
    assert!(converter.convert(&spec).is_err());
}
