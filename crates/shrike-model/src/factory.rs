//! The item factory: interned types, protos, and references.
//!
//! Interning keeps proto instances pointer-stable and append-only for the
//! duration of a run, so the parallel planning phase can share them across
//! threads without coordination.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use shrike_core::{Name, NameInterner};

use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::member::{MethodRef, Proto};

pub struct ItemFactory {
    names: NameInterner,
    protos: RwLock<HashMap<Proto, Arc<Proto>>>,
}

impl Default for ItemFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemFactory {
    pub fn new() -> Self {
        Self {
            names: NameInterner::new(),
            protos: RwLock::new(HashMap::new()),
        }
    }

    /// A class type for a slash-separated binary name.
    pub fn class_type(&self, binary_name: &str) -> TypeDescriptor {
        // Interning canonicalizes the backing string for the run.
        let interned = self.names.intern(binary_name);
        TypeDescriptor::class(self.names.resolve(interned))
    }

    pub fn object_type(&self) -> TypeDescriptor {
        self.class_type("java/lang/Object")
    }

    /// The canonical shared instance of a proto.
    pub fn proto(&self, params: Vec<TypeDescriptor>, ret: TypeDescriptor) -> Arc<Proto> {
        let proto = Proto::new(params, ret);
        if let Some(existing) = self.protos.read().get(&proto) {
            return Arc::clone(existing);
        }
        let mut table = self.protos.write();
        Arc::clone(
            table
                .entry(proto.clone())
                .or_insert_with(|| Arc::new(proto)),
        )
    }

    pub fn intern_proto(&self, proto: &Proto) -> Arc<Proto> {
        self.proto(proto.params.clone(), proto.ret.clone())
    }

    pub fn method(
        &self,
        holder: TypeDescriptor,
        name: impl Into<Name>,
        params: Vec<TypeDescriptor>,
        ret: TypeDescriptor,
    ) -> MethodRef {
        MethodRef::new(holder, name, self.proto(params, ret))
    }

    /// The proto of `method` with the holder type prepended as parameter
    /// zero: the original receiver becomes an explicit argument.
    pub fn prepend_holder_to_proto(&self, method: &MethodRef) -> Arc<Proto> {
        let mut params = Vec::with_capacity(method.proto.params.len() + 1);
        params.push(method.holder.clone());
        params.extend(method.proto.params.iter().cloned());
        self.proto(params, method.proto.ret.clone())
    }

    /// Parses `Lholder;->name(params)ret` and interns the proto.
    pub fn parse_method(&self, text: &str) -> Result<MethodRef> {
        let parsed = MethodRef::parse_smali(text)?;
        Ok(MethodRef {
            holder: parsed.holder,
            name: parsed.name,
            proto: self.intern_proto(&parsed.proto),
        })
    }
}
