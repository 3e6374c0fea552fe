use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the user entity and its value types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("User {0} is not active")]
    NotActive(Uuid),

    #[error("Nothing to change: {0}")]
    Idempotent(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
