use thiserror::Error;

/// Errors raised while binding a cleanup to an invocable.
///
/// Both are programmer errors, reported at construction time. Nothing is ever reported at
/// reclamation time.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupError {
    /// The invocable may be aliased by the arena, so a cleanup cannot be keyed on its identity.
    #[error("cannot attach a cleanup to a shareable invocable by identity")]
    ClassificationMismatch,
    /// The invocable already has a cleanup attached to its identity.
    #[error("invocable already has a cleanup attached")]
    AlreadyManaged,
}

pub type CleanupResult<T> = Result<T, CleanupError>;
