//! Deterministic names for synthesized classes and moved members.
//!
//! Every function here is pure and reversible: companion and dispatch names
//! are a function of the interface name alone, so two separate compilations
//! of the same interface agree on them byte for byte.

use shrike_model::{ClassName, ItemFactory, MethodRef, TypeDescriptor};

pub const COMPANION_CLASS_SUFFIX: &str = "$-CC";
pub const DISPATCH_CLASS_SUFFIX: &str = "$-DC";

const DEFAULT_METHOD_MARKER: &str = "$default$";
const PRIVATE_METHOD_MARKER: &str = "$private$";

pub struct SyntheticNaming<'a> {
    factory: &'a ItemFactory,
}

impl<'a> SyntheticNaming<'a> {
    pub fn new(factory: &'a ItemFactory) -> Self {
        Self { factory }
    }

    /// The companion class holding the moved bodies of `iface`.
    pub fn companion_of(&self, iface: &ClassName) -> TypeDescriptor {
        self.factory
            .class_type(&format!("{}{}", iface.as_str(), COMPANION_CLASS_SUFFIX))
    }

    /// The dispatch class holding static forwarders for a library `iface`.
    /// A distinct namespace from companions.
    pub fn dispatch_of(&self, iface: &ClassName) -> TypeDescriptor {
        self.factory
            .class_type(&format!("{}{}", iface.as_str(), DISPATCH_CLASS_SUFFIX))
    }

    pub fn is_companion(ty: &TypeDescriptor) -> bool {
        ty.as_class_name()
            .is_some_and(|n| n.as_str().ends_with(COMPANION_CLASS_SUFFIX))
    }

    pub fn is_dispatch(ty: &TypeDescriptor) -> bool {
        ty.as_class_name()
            .is_some_and(|n| n.as_str().ends_with(DISPATCH_CLASS_SUFFIX))
    }

    /// Inverse of [`Self::companion_of`].
    pub fn interface_for_companion(&self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        let name = ty.as_class_name()?;
        let stripped = name.as_str().strip_suffix(COMPANION_CLASS_SUFFIX)?;
        Some(self.factory.class_type(stripped))
    }

    /// Inverse of [`Self::dispatch_of`].
    pub fn interface_for_dispatch(&self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        let name = ty.as_class_name()?;
        let stripped = name.as_str().strip_suffix(DISPATCH_CLASS_SUFFIX)?;
        Some(self.factory.class_type(stripped))
    }

    /// The companion form of a default method: the receiver becomes
    /// parameter zero and the name carries a marker so the result cannot
    /// collide with a static method of the same name moved alongside it.
    pub fn as_moved_default(&self, method: &MethodRef) -> MethodRef {
        self.moved_instance_method(method, DEFAULT_METHOD_MARKER)
    }

    /// The companion form of a private instance method; behaves as a default
    /// move under its own marker.
    pub fn as_moved_private(&self, method: &MethodRef) -> MethodRef {
        self.moved_instance_method(method, PRIVATE_METHOD_MARKER)
    }

    /// The companion form of a static interface method: proto unchanged.
    pub fn as_moved_static(&self, method: &MethodRef) -> MethodRef {
        method.with_holder(self.companion_of(holder_class_name(method)))
    }

    /// The dispatch-class forwarder for a library static interface method:
    /// proto unchanged.
    pub fn as_dispatch_forward(&self, method: &MethodRef) -> MethodRef {
        method.with_holder(self.dispatch_of(holder_class_name(method)))
    }

    fn moved_instance_method(&self, method: &MethodRef, marker: &str) -> MethodRef {
        MethodRef::new(
            self.companion_of(holder_class_name(method)),
            format!("{marker}{}", method.name),
            self.factory.prepend_holder_to_proto(method),
        )
    }
}

fn holder_class_name(method: &MethodRef) -> &ClassName {
    match method.holder.as_class_name() {
        Some(name) => name,
        None => unreachable!("interface member holder must be a class type: {method}"),
    }
}
