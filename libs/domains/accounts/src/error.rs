use strum::Display;
use thiserror::Error;

use crate::domain::DomainError;

/// Flat classification of [`AccountError`], for callers that only branch on
/// the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    InvalidData,
    NotAllowed,
    NotFound,
    AlreadyExists,
    UserNotActive,
    Idempotent,
    Conflict,
    Cancelled,
    Internal,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("User is not active: {0}")]
    UserNotActive(String),

    #[error("Nothing to change: {0}")]
    Idempotent(String),

    /// Optimistic-version or uniqueness violation reported by the repository.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller cancelled the request or its deadline elapsed.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AccountResult<T> = Result<T, AccountError>;

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::InvalidData(_) => ErrorKind::InvalidData,
            AccountError::NotAllowed(_) => ErrorKind::NotAllowed,
            AccountError::NotFound(_) => ErrorKind::NotFound,
            AccountError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AccountError::UserNotActive(_) => ErrorKind::UserNotActive,
            AccountError::Idempotent(_) => ErrorKind::Idempotent,
            AccountError::Conflict(_) => ErrorKind::Conflict,
            AccountError::Cancelled(_) => ErrorKind::Cancelled,
            AccountError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AccountError::Cancelled(_) | AccountError::Conflict(_))
    }
}

/// Single translation point from entity errors to the use-case taxonomy.
impl From<DomainError> for AccountError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::InvalidData(_) => AccountError::InvalidData(message),
            DomainError::NotActive(_) => AccountError::UserNotActive(message),
            DomainError::Idempotent(_) => AccountError::Idempotent(message),
        }
    }
}
