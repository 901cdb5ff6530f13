//! Member references: protos, method references, field references.

use std::fmt;
use std::sync::Arc;

use shrike_core::Name;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};

/// A method shape: ordered parameter types plus a return type.
///
/// Protos are interned by the [`crate::ItemFactory`] and shared through
/// `Arc`, so references cloning a proto never copy the parameter list.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Proto {
    pub params: Vec<TypeDescriptor>,
    pub ret: TypeDescriptor,
}

impl Proto {
    pub fn new(params: Vec<TypeDescriptor>, ret: TypeDescriptor) -> Self {
        Self { params, ret }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for param in &self.params {
            out.push_str(&param.descriptor());
        }
        out.push(')');
        out.push_str(&self.ret.descriptor());
        out
    }

    /// Parses a `(params)ret` method descriptor.
    pub fn parse(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix('(')
            .ok_or_else(|| Error::InvalidProto(input.to_string()))?;
        let mut params = Vec::new();
        let mut rest = rest;
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                let ret = TypeDescriptor::parse(after)
                    .map_err(|_| Error::InvalidProto(input.to_string()))?;
                return Ok(Proto::new(params, ret));
            }
            let (param, remainder) = TypeDescriptor::parse_prefix(rest)
                .map_err(|_| Error::InvalidProto(input.to_string()))?;
            if param == TypeDescriptor::Void {
                return Err(Error::InvalidProto(input.to_string()));
            }
            params.push(param);
            rest = remainder;
        }
    }

    /// Local-variable slots the parameters occupy (receiver excluded).
    pub fn parameter_slots(&self) -> u16 {
        self.params.iter().map(TypeDescriptor::slot_width).sum()
    }
}

impl fmt::Debug for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// A symbolic method reference: holder, name, proto.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub holder: TypeDescriptor,
    pub name: Name,
    pub proto: Arc<Proto>,
}

impl MethodRef {
    pub fn new(holder: TypeDescriptor, name: impl Into<Name>, proto: Arc<Proto>) -> Self {
        Self {
            holder,
            name: name.into(),
            proto,
        }
    }

    pub fn is_class_initializer(&self) -> bool {
        self.name.as_str() == "<clinit>"
    }

    pub fn is_instance_initializer(&self) -> bool {
        self.name.as_str() == "<init>"
    }

    pub fn with_holder(&self, holder: TypeDescriptor) -> MethodRef {
        MethodRef {
            holder,
            name: self.name.clone(),
            proto: Arc::clone(&self.proto),
        }
    }

    /// `Lholder;->name(params)ret` textual form.
    pub fn to_smali(&self) -> String {
        format!("{}->{}{}", self.holder, self.name, self.proto)
    }

    /// Parses the `Lholder;->name(params)ret` textual form.
    pub fn parse_smali(input: &str) -> Result<Self> {
        let (holder, rest) = input
            .split_once("->")
            .ok_or_else(|| Error::InvalidMethodReference(input.to_string()))?;
        let holder = TypeDescriptor::parse(holder)
            .map_err(|_| Error::InvalidMethodReference(input.to_string()))?;
        let paren = rest
            .find('(')
            .ok_or_else(|| Error::InvalidMethodReference(input.to_string()))?;
        let (name, proto) = rest.split_at(paren);
        if name.is_empty() {
            return Err(Error::InvalidMethodReference(input.to_string()));
        }
        let proto = Proto::parse(proto)
            .map_err(|_| Error::InvalidMethodReference(input.to_string()))?;
        Ok(MethodRef::new(holder, name, Arc::new(proto)))
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_smali())
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_smali())
    }
}

/// A symbolic field reference.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldRef {
    pub holder: TypeDescriptor,
    pub name: Name,
    pub ty: TypeDescriptor,
}

impl FieldRef {
    pub fn new(holder: TypeDescriptor, name: impl Into<Name>, ty: TypeDescriptor) -> Self {
        Self {
            holder,
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.holder, self.name, self.ty)
    }
}
