//! Class, method, and field definitions.

use shrike_core::{Name, Origin};

use crate::code::CodeBody;
use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::flags::AccessFlags;
use crate::member::{FieldRef, MethodRef, Proto};

/// How a class participates in the compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Owned by this compilation; rewritable.
    Program,
    /// Part of the target platform; immutable and possibly absent.
    Library,
    /// Present only so resolution can see it; immutable.
    Classpath,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub reference: FieldRef,
    pub access: AccessFlags,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub reference: MethodRef,
    pub access: AccessFlags,
    /// Absent for abstract and native methods.
    pub code: Option<CodeBody>,
}

impl MethodDef {
    pub fn new(reference: MethodRef, access: AccessFlags, code: Option<CodeBody>) -> Self {
        Self {
            reference,
            access,
            code,
        }
    }

    pub fn is_class_initializer(&self) -> bool {
        self.reference.is_class_initializer()
    }

    /// A default method: a non-abstract, non-static virtual declared on an
    /// interface.
    pub fn is_default_method(&self) -> bool {
        !self.access.is_static() && !self.access.is_abstract()
    }

    pub fn signature_matches(&self, other: &MethodRef) -> bool {
        self.reference.name == other.name && self.reference.proto == other.proto
    }
}

/// A single class definition.
///
/// Program definitions are created at load, mutated by the planner and the
/// synthesizer, and written at the end. Library and classpath definitions
/// never change after load.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub ty: TypeDescriptor,
    pub kind: ClassKind,
    pub access: AccessFlags,
    pub super_type: Option<TypeDescriptor>,
    pub interfaces: Vec<TypeDescriptor>,
    pub source_file: Option<Name>,
    pub origin: Origin,
    pub fields: Vec<FieldDef>,
    /// Static methods, private instance methods, initializers.
    pub direct_methods: Vec<MethodDef>,
    pub virtual_methods: Vec<MethodDef>,
    /// Input checksum, present only when checksum encoding is on.
    pub checksum: Option<u64>,
    /// For synthesized classes, the definitions this class was derived from;
    /// consumed by the downstream deduplication pass.
    pub synthesized_from: Vec<TypeDescriptor>,
}

impl ClassDef {
    pub fn is_interface(&self) -> bool {
        self.access.is_interface()
    }

    pub fn is_program(&self) -> bool {
        self.kind == ClassKind::Program
    }

    pub fn lookup_direct_method(&self, reference: &MethodRef) -> Option<&MethodDef> {
        self.direct_methods
            .iter()
            .find(|m| m.signature_matches(reference))
    }

    pub fn lookup_virtual_method(&self, reference: &MethodRef) -> Option<&MethodDef> {
        self.virtual_methods
            .iter()
            .find(|m| m.signature_matches(reference))
    }

    /// Direct methods first, then virtuals, matching resolution order within
    /// a single class.
    pub fn lookup_method(&self, reference: &MethodRef) -> Option<&MethodDef> {
        self.lookup_direct_method(reference)
            .or_else(|| self.lookup_virtual_method(reference))
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.direct_methods.iter().chain(self.virtual_methods.iter())
    }

    /// The class checksum. Requesting it for a class compiled without
    /// checksum encoding is an invalid request.
    pub fn checksum(&self) -> Result<u64> {
        self.checksum.ok_or(Error::ChecksumUnavailable)
    }
}

/// A deterministic checksum derived from a type descriptor alone, for
/// synthesized classes with no single parent checksum (FNV-1a over the
/// descriptor bytes).
pub fn checksum_from_type(ty: &TypeDescriptor) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in ty.descriptor().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Convenience builder used by loaders and tests.
pub struct ClassDefBuilder {
    def: ClassDef,
}

impl ClassDefBuilder {
    pub fn new(ty: TypeDescriptor, kind: ClassKind) -> Self {
        Self {
            def: ClassDef {
                ty,
                kind,
                access: AccessFlags::PUBLIC,
                super_type: Some(TypeDescriptor::class("java/lang/Object")),
                interfaces: Vec::new(),
                source_file: None,
                origin: Origin::Unknown,
                fields: Vec::new(),
                direct_methods: Vec::new(),
                virtual_methods: Vec::new(),
                checksum: None,
                synthesized_from: Vec::new(),
            },
        }
    }

    pub fn interface(mut self) -> Self {
        self.def.access |= AccessFlags::INTERFACE | AccessFlags::ABSTRACT;
        self
    }

    pub fn access(mut self, access: AccessFlags) -> Self {
        self.def.access = access;
        self
    }

    pub fn super_type(mut self, super_type: Option<TypeDescriptor>) -> Self {
        self.def.super_type = super_type;
        self
    }

    pub fn implements(mut self, iface: TypeDescriptor) -> Self {
        self.def.interfaces.push(iface);
        self
    }

    pub fn source_file(mut self, name: impl Into<Name>) -> Self {
        self.def.source_file = Some(name.into());
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.def.origin = origin;
        self
    }

    pub fn checksum(mut self, checksum: u64) -> Self {
        self.def.checksum = Some(checksum);
        self
    }

    pub fn field(mut self, name: &str, ty: TypeDescriptor, access: AccessFlags) -> Self {
        let reference = FieldRef::new(self.def.ty.clone(), name, ty);
        self.def.fields.push(FieldDef { reference, access });
        self
    }

    pub fn direct_method(
        mut self,
        name: &str,
        proto: std::sync::Arc<Proto>,
        access: AccessFlags,
        code: Option<CodeBody>,
    ) -> Self {
        let reference = MethodRef::new(self.def.ty.clone(), name, proto);
        self.def.direct_methods.push(MethodDef::new(reference, access, code));
        self
    }

    pub fn virtual_method(
        mut self,
        name: &str,
        proto: std::sync::Arc<Proto>,
        access: AccessFlags,
        code: Option<CodeBody>,
    ) -> Self {
        let reference = MethodRef::new(self.def.ty.clone(), name, proto);
        self.def
            .virtual_methods
            .push(MethodDef::new(reference, access, code));
        self
    }

    pub fn build(self) -> ClassDef {
        self.def
    }
}
