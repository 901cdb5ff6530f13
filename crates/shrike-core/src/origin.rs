//! Provenance tags for class definitions.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a class definition came from.
///
/// Diagnostics attach the origin of the offending class so errors point at an
/// input artifact rather than an internal descriptor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Parsed from an input file on disk.
    File(Arc<PathBuf>),
    /// Created by a compiler phase; the tag names the phase.
    Synthesized(&'static str),
    Unknown,
}

impl Origin {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Origin::File(Arc::new(path.into()))
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self, Origin::Synthesized(_))
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "{}", path.display()),
            Origin::Synthesized(tag) => write!(f, "<synthesized: {tag}>"),
            Origin::Unknown => f.write_str("<unknown>"),
        }
    }
}
