//! Shared, dependency-minimized core types used across Shrike.

pub mod cancel;
pub mod diagnostics;
pub mod name;
pub mod origin;

pub use cancel::CancellationToken;
pub use diagnostics::{
    CollectingDiagnostics, Diagnostic, DiagnosticsHandler, IgnoreDiagnostics, Severity,
};
pub use name::{InternedName, Name, NameInterner};
pub use origin::Origin;
