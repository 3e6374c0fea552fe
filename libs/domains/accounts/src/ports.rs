//! Collaborator contracts the use cases depend on.
//!
//! Storage, code storage and credential handling live behind these traits;
//! the crate ships in-memory, Redis and Argon2 implementations, and tests
//! use the generated `Mock*` types.

use async_trait::async_trait;
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::error::AccountResult;
use crate::models::UserRecord;

/// Repository trait for account persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn id_exists(&self, id: Uuid) -> AccountResult<bool>;

    async fn email_exists(&self, email: &str) -> AccountResult<bool>;

    async fn by_id(&self, id: Uuid) -> AccountResult<Option<UserRecord>>;

    async fn by_email(&self, email: &str) -> AccountResult<Option<UserRecord>>;

    /// Allocate an identifier for a new account
    async fn next_id(&self) -> AccountResult<Uuid>;

    /// Insert or update an account.
    ///
    /// `user.version` must be exactly one above the stored version (1 for a
    /// new account); anything else, or an email already owned by another
    /// account, fails with `AccountError::Conflict`.
    async fn save(&self, user: UserRecord) -> AccountResult<()>;
}

/// Workflow a one-time code belongs to. Each kind is its own key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CodeKind {
    ConfirmEmail,
    NewEmail,
    NewPassword,
    ResetPassword,
}

/// Expiring key/value storage for one-time codes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeStore: Send + Sync {
    async fn set(&self, kind: CodeKind, key: &str, code: &str) -> AccountResult<()>;

    /// `None` when the code was never issued or has expired
    async fn get(&self, kind: CodeKind, key: &str) -> AccountResult<Option<String>>;

    async fn del(&self, kind: CodeKind, key: &str) -> AccountResult<()>;
}

/// Key for codes proving control of a not-yet-registered address.
pub fn email_key(email: &str) -> String {
    email.to_string()
}

/// Key for codes tied to an existing account and one of its addresses.
pub fn user_email_key(id: Uuid, email: &str) -> String {
    format!("{}:{}", id, email)
}

#[cfg_attr(test, mockall::automock)]
pub trait EmailValidator: Send + Sync {
    fn validate(&self, email: &str) -> AccountResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordValidator: Send + Sync {
    /// `email` is the owner's address, so the rules can forbid passwords
    /// derived from it.
    fn validate(&self, password: &str, email: &str) -> AccountResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> AccountResult<String>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordComparer: Send + Sync {
    fn compare(&self, password: &str, hash: &str) -> AccountResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}
