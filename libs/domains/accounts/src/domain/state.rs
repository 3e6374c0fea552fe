use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use super::error::{DomainError, DomainResult};

/// Lifecycle phase of an account.
///
/// Only `Active` accounts may be mutated. There is no "unset" variant: a
/// blank or unknown value is rejected by [`State::parse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum State {
    #[default]
    Active,
    Frozen,
    Deleted,
}

impl State {
    pub fn parse(value: &str) -> DomainResult<Self> {
        Self::from_str(value).map_err(|_| {
            DomainError::InvalidData(format!("user state '{}' does not exist", value))
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self, State::Active)
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, State::Frozen)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, State::Deleted)
    }
}
