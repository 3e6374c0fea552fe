//! Mapping between the stored [`UserRecord`] and the [`User`] entity.
//!
//! The entity never sees the record type; use cases go through these
//! functions in both directions.

use crate::domain::{State, Status, User};
use crate::error::AccountResult;
use crate::models::UserRecord;

/// Snapshot of the entity at its current version.
pub fn current_record(user: &User) -> UserRecord {
    record_at(user, user.version())
}

/// Snapshot of the entity at the version it will have once saved.
pub fn modified_record(user: &User) -> UserRecord {
    record_at(user, user.modified_version())
}

/// Rebuild the entity from a stored record. Malformed records surface as
/// `InvalidData`.
pub fn restore(record: &UserRecord) -> AccountResult<User> {
    let state = State::parse(&record.state)?;
    let status = Status::parse(&record.status)?;
    let user = User::restore(
        record.id,
        record.email.as_str(),
        record.password_hash.as_str(),
        state,
        status,
        record.version,
    )?;
    Ok(user)
}

fn record_at(user: &User, version: u64) -> UserRecord {
    UserRecord {
        id: user.id(),
        email: user.email().to_string(),
        state: user.state().to_string(),
        status: user.status().to_string(),
        password_hash: user.password_hash().to_string(),
        version,
    }
}
