use uuid::Uuid;

/// Account as the repository stores it - plain fields, state and status as
/// their storage strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub state: String,
    pub status: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub version: u64,
}

/// One-time code addressed to a mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCode {
    pub to: String,
    pub code: String,
}

impl EmailCode {
    pub fn new(to: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationCommand {
    pub email: String,
    pub password: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmEmailCommand {
    pub email: String,
}

/// Administrative edit. `None` (or an empty string) leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ChangeUserCommand {
    pub initiator_id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfirmNewEmailCommand {
    pub initiator_id: Uuid,
    pub user_id: Uuid,
    pub new_email: String,
}

#[derive(Debug, Clone)]
pub struct NewEmailCommand {
    pub initiator_id: Uuid,
    pub user_id: Uuid,
    pub new_email: String,
    pub new_email_code: String,
    pub old_email_code: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmNewPasswordCommand {
    pub initiator_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewPasswordCommand {
    pub initiator_id: Uuid,
    pub user_id: Uuid,
    pub old_password: String,
    pub new_password: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmResetPasswordCommand {
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
    pub email: String,
    pub code: String,
    pub new_password: String,
}
