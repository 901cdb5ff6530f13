//! JVM access flags shared by classes, methods, and fields.

use bitflags::bitflags;

bitflags! {
    /// The shared JVM access-flag word.
    ///
    /// Flag edits are only legal on program definitions; library and
    /// classpath definitions are immutable by construction (the repository
    /// refuses to hand out mutable references to them).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

impl AccessFlags {
    pub fn is_public(self) -> bool {
        self.contains(AccessFlags::PUBLIC)
    }

    pub fn is_private(self) -> bool {
        self.contains(AccessFlags::PRIVATE)
    }

    pub fn is_protected(self) -> bool {
        self.contains(AccessFlags::PROTECTED)
    }

    pub fn is_static(self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    pub fn is_bridge(self) -> bool {
        self.contains(AccessFlags::BRIDGE)
    }

    pub fn is_native(self) -> bool {
        self.contains(AccessFlags::NATIVE)
    }

    pub fn is_interface(self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }

    pub fn is_synthetic(self) -> bool {
        self.contains(AccessFlags::SYNTHETIC)
    }

    /// Clears private/protected and sets public.
    pub fn promote_to_public(&mut self) {
        self.remove(AccessFlags::PRIVATE | AccessFlags::PROTECTED);
        self.insert(AccessFlags::PUBLIC);
    }

    pub fn promote_to_static(&mut self) {
        self.insert(AccessFlags::STATIC);
    }

    pub fn set_public(&mut self) {
        self.insert(AccessFlags::PUBLIC);
    }

    pub fn set_final(&mut self) {
        self.insert(AccessFlags::FINAL);
    }

    pub fn set_abstract(&mut self) {
        self.insert(AccessFlags::ABSTRACT);
    }

    pub fn set_synthetic(&mut self) {
        self.insert(AccessFlags::SYNTHETIC);
    }

    pub fn unset_bridge(&mut self) {
        self.remove(AccessFlags::BRIDGE);
    }

    pub fn unset_abstract(&mut self) {
        self.remove(AccessFlags::ABSTRACT);
    }

    pub fn unset_interface(&mut self) {
        self.remove(AccessFlags::INTERFACE);
    }

    pub fn unset_annotation(&mut self) {
        self.remove(AccessFlags::ANNOTATION);
    }
}
