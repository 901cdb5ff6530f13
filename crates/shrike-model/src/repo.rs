//! The class repository.
//!
//! Owns every class definition in the compilation. During planning the set
//! is frozen: no publishes, no replacements. The synthesizer phase is the
//! only phase allowed to publish, which keeps observers and mutators from
//! racing.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::class::{ClassDef, ClassKind};
use crate::descriptor::TypeDescriptor;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("repository is frozen")]
    Frozen,
    #[error("duplicate class definition: {0}")]
    Duplicate(TypeDescriptor),
    #[error("not a program class: {0}")]
    Immutable(TypeDescriptor),
    #[error("unknown class: {0}")]
    Unknown(TypeDescriptor),
}

#[derive(Debug, Default)]
pub struct ClassRepo {
    classes: BTreeMap<TypeDescriptor, ClassDef>,
    frozen: bool,
}

impl ClassRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: &TypeDescriptor) -> Option<&ClassDef> {
        self.classes.get(ty)
    }

    pub fn contains(&self, ty: &TypeDescriptor) -> bool {
        self.classes.contains_key(ty)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Adds a definition. Fails while frozen and on duplicate descriptors.
    /// Published classes are indistinguishable from input classes afterwards.
    pub fn publish(&mut self, class: ClassDef) -> Result<(), RepoError> {
        if self.frozen {
            return Err(RepoError::Frozen);
        }
        if self.classes.contains_key(&class.ty) {
            return Err(RepoError::Duplicate(class.ty));
        }
        self.classes.insert(class.ty.clone(), class);
        Ok(())
    }

    /// Mutates a program class in place. Library and classpath definitions
    /// are immutable.
    pub fn replace<R>(
        &mut self,
        ty: &TypeDescriptor,
        mutator: impl FnOnce(&mut ClassDef) -> R,
    ) -> Result<R, RepoError> {
        if self.frozen {
            return Err(RepoError::Frozen);
        }
        let class = self
            .classes
            .get_mut(ty)
            .ok_or_else(|| RepoError::Unknown(ty.clone()))?;
        if class.kind != ClassKind::Program {
            return Err(RepoError::Immutable(ty.clone()));
        }
        Ok(mutator(class))
    }

    /// All classes in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.values()
    }

    pub fn program_classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.iter().filter(|c| c.kind == ClassKind::Program)
    }

    /// Program interfaces in descriptor order; the planner's work list.
    pub fn program_interfaces(&self) -> impl Iterator<Item = &ClassDef> {
        self.program_classes().filter(|c| c.is_interface())
    }
}
