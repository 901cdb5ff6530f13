//! The class graph data model: descriptors, protos, member references,
//! access flags, code bodies, class definitions, and the class repository.
//!
//! Everything here is value-identified by its fully qualified descriptor;
//! equality and hashing are on descriptor content. The repository exclusively
//! owns class definitions; every other component holds descriptor-based
//! references and resolves them through the repository on demand, so the
//! graph carries no strong back-edges.

pub mod class;
pub mod code;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod flags;
pub mod member;
pub mod repo;

pub use class::{checksum_from_type, ClassDef, ClassDefBuilder, ClassKind, FieldDef, MethodDef};
pub use code::{CodeBody, DebugInfo, InvokeKind, RegisterCode, RegisterInsn, StackCode, StackInsn};
pub use descriptor::{ClassName, PrimitiveType, TypeDescriptor};
pub use error::{Error, Result};
pub use factory::ItemFactory;
pub use flags::AccessFlags;
pub use member::{FieldRef, MethodRef, Proto};
pub use repo::{ClassRepo, RepoError};
