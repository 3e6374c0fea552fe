use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use super::error::{DomainError, DomainResult};

/// Privilege tier of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    #[default]
    User,
    Admin,
}

impl Status {
    pub fn parse(value: &str) -> DomainResult<Self> {
        Self::from_str(value).map_err(|_| {
            DomainError::InvalidData(format!("user status '{}' does not exist", value))
        })
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Status::Admin)
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Status::User)
    }
}
