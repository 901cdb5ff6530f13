use shrike_model::{MethodRef, RepoError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DesugarError>;

#[derive(Debug, Error)]
pub enum DesugarError {
    /// The body contains a super-invocation that only has meaning from the
    /// declaring interface.
    #[error("one or more instructions is preventing default interface method from being desugared: {0}")]
    UnmovableDefault(MethodRef),
    #[error("code is missing for default interface method: {0}")]
    MissingDefaultCode(MethodRef),
    #[error("code is missing for private instance interface method: {0}")]
    MissingPrivateCode(MethodRef),
    #[error("native interface methods are not yet supported: {0}")]
    NativeNotSupported(MethodRef),
    #[error("companion method name collision: {0}")]
    CompanionNameCollision(MethodRef),
    #[error("retarget specification names an unknown member: {0}")]
    RetargetMemberNotFound(MethodRef),
    #[error(transparent)]
    Model(#[from] shrike_model::Error),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("run aborted")]
    Aborted,
}

impl DesugarError {
    /// Stable diagnostic code for the host diagnostics handler.
    pub fn code(&self) -> &'static str {
        match self {
            DesugarError::UnmovableDefault(_) => "desugar/unmovable-default",
            DesugarError::MissingDefaultCode(_) => "desugar/missing-default-code",
            DesugarError::MissingPrivateCode(_) => "desugar/missing-private-code",
            DesugarError::NativeNotSupported(_) => "desugar/native-unsupported",
            DesugarError::CompanionNameCollision(_) => "desugar/companion-collision",
            DesugarError::RetargetMemberNotFound(_) => "desugar/retarget-unknown-member",
            DesugarError::Model(_) => "desugar/model",
            DesugarError::Repo(_) => "desugar/repo",
            DesugarError::Aborted => "desugar/aborted",
        }
    }
}
