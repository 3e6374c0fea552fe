use uuid::Uuid;

use super::error::{DomainError, DomainResult};
use super::state::State;
use super::status::Status;

/// Account aggregate root.
///
/// Fields are private: every change goes through a mutator, and every
/// mutator requires the account to be `Active`, rejects blank values and
/// rejects writes that would not change anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    email: String,
    state: State,
    status: Status,
    password_hash: String,
    version: u64,
}

impl User {
    /// Create a freshly registered account (active, regular user, version 0).
    pub fn new(
        id: Uuid,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> DomainResult<Self> {
        let email = email.into();
        let password_hash = password_hash.into();

        ensure_id(id)?;
        ensure_email(&email)?;
        ensure_password_hash(&password_hash)?;

        Ok(Self {
            id,
            email,
            state: State::Active,
            status: Status::User,
            password_hash,
            version: 0,
        })
    }

    /// Rehydrate an account from storage. Stored accounts always have a
    /// non-zero version.
    pub fn restore(
        id: Uuid,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        state: State,
        status: Status,
        version: u64,
    ) -> DomainResult<Self> {
        let email = email.into();
        let password_hash = password_hash.into();

        ensure_id(id)?;
        ensure_email(&email)?;
        ensure_password_hash(&password_hash)?;
        if version == 0 {
            return Err(DomainError::InvalidData(
                "stored user version cannot be 0".to_string(),
            ));
        }

        Ok(Self {
            id,
            email,
            state,
            status,
            password_hash,
            version,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version the account will carry once its pending changes are saved.
    pub fn modified_version(&self) -> u64 {
        self.version + 1
    }

    pub fn set_email(&mut self, email: &str) -> DomainResult<()> {
        self.ensure_active()?;
        ensure_email(email)?;
        if self.email == email {
            return Err(DomainError::Idempotent(format!("user email is already {}", email)));
        }
        self.email = email.to_string();
        Ok(())
    }

    /// Change the lifecycle state. Only the current state is checked, so an
    /// account must be active to become frozen or deleted.
    pub fn set_state(&mut self, state: State) -> DomainResult<()> {
        self.ensure_active()?;
        if self.state == state {
            return Err(DomainError::Idempotent(format!("user state is already {}", state)));
        }
        self.state = state;
        Ok(())
    }

    pub fn set_status(&mut self, status: Status) -> DomainResult<()> {
        self.ensure_active()?;
        if self.status == status {
            return Err(DomainError::Idempotent(format!("user status is already {}", status)));
        }
        self.status = status;
        Ok(())
    }

    pub fn set_password_hash(&mut self, password_hash: &str) -> DomainResult<()> {
        self.ensure_active()?;
        ensure_password_hash(password_hash)?;
        if self.password_hash == password_hash {
            return Err(DomainError::Idempotent(
                "user password hash is unchanged".to_string(),
            ));
        }
        self.password_hash = password_hash.to_string();
        Ok(())
    }

    fn ensure_active(&self) -> DomainResult<()> {
        if !self.state.is_active() {
            return Err(DomainError::NotActive(self.id));
        }
        Ok(())
    }
}

fn ensure_id(id: Uuid) -> DomainResult<()> {
    if id.is_nil() {
        return Err(DomainError::InvalidData("user id cannot be nil".to_string()));
    }
    Ok(())
}

fn ensure_email(email: &str) -> DomainResult<()> {
    if email.is_empty() {
        return Err(DomainError::InvalidData("user email cannot be empty".to_string()));
    }
    Ok(())
}

fn ensure_password_hash(password_hash: &str) -> DomainResult<()> {
    if password_hash.is_empty() {
        return Err(DomainError::InvalidData(
            "user password hash cannot be empty".to_string(),
        ));
    }
    Ok(())
}
