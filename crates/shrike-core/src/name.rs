//! Name types and string interning.

use lasso::{Key, Spur, ThreadedRodeo};
use smol_str::SmolStr;

/// A lightweight owned identifier (a member name, a simple class name, a
/// source-file name).
///
/// Backed by [`smol_str::SmolStr`], which stores short strings inline; member
/// names in class files are almost always short enough to avoid allocation.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Name").field(&self.0.as_str()).finish()
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A symbolic identifier for a string stored in a [`NameInterner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct InternedName(Spur);

impl InternedName {
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0.into_usize() as u32
    }
}

impl std::fmt::Debug for InternedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InternedName({})", self.to_raw())
    }
}

/// A thread-safe, append-only string interner.
///
/// Interned entries are never removed and resolve to pointer-stable string
/// slices, so concurrent readers during the parallel planning phase need no
/// coordination beyond the interner itself.
#[derive(Default)]
pub struct NameInterner {
    rodeo: ThreadedRodeo,
}

impl NameInterner {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn intern(&self, text: &str) -> InternedName {
        InternedName(self.rodeo.get_or_intern(text))
    }

    #[inline]
    pub fn resolve(&self, name: InternedName) -> &str {
        self.rodeo.resolve(&name.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}
