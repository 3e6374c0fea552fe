//! One type per account workflow.
//!
//! Every `execute` validates first, checks ownership or policy, verifies
//! one-time codes, mutates the entity in memory and only then writes. The
//! first error aborts the workflow; nothing is persisted on a failure path.

mod change_user;
mod confirm_email;
mod confirm_new_email;
mod confirm_new_password;
mod confirm_reset_password;
mod new_email;
mod new_password;
mod registration;
mod reset_password;

pub use change_user::ChangeUserUseCase;
pub use confirm_email::ConfirmEmailUseCase;
pub use confirm_new_email::ConfirmNewEmailUseCase;
pub use confirm_new_password::ConfirmNewPasswordUseCase;
pub use confirm_reset_password::ConfirmResetPasswordUseCase;
pub use new_email::NewEmailUseCase;
pub use new_password::NewPasswordUseCase;
pub use registration::RegistrationUseCase;
pub use reset_password::ResetPasswordUseCase;

use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::UserRecord;
use crate::ports::{CodeKind, CodeStore, UserRepository};

fn ensure_owner(initiator_id: Uuid, user_id: Uuid, action: &str) -> AccountResult<()> {
    if initiator_id != user_id {
        return Err(AccountError::NotAllowed(format!(
            "user {} cannot {} of user {}",
            initiator_id, action, user_id
        )));
    }
    Ok(())
}

async fn load_user(
    ctx: &RequestContext,
    repo: &dyn UserRepository,
    id: Uuid,
) -> AccountResult<UserRecord> {
    ctx.run(repo.by_id(id))
        .await?
        .ok_or_else(|| AccountError::NotFound(format!("user {} not found", id)))
}

/// Compare `provided` with the stored code. A code that was never issued or
/// has expired is treated like a wrong one.
async fn verify_code(
    ctx: &RequestContext,
    codes: &dyn CodeStore,
    kind: CodeKind,
    key: &str,
    provided: &str,
) -> AccountResult<()> {
    match ctx.run(codes.get(kind, key)).await? {
        Some(stored) if stored == provided => Ok(()),
        _ => Err(AccountError::InvalidData(format!("wrong {} code", kind))),
    }
}

/// `Some("")` means the same as `None` for optional command fields.
fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::code_store::InMemoryCodeStore;
    use crate::error::{AccountError, AccountResult};
    use crate::models::UserRecord;
    use crate::notifications::{Notification, NotificationDispatcher};
    use crate::ports::{
        CodeGenerator, EmailValidator, PasswordComparer, PasswordHasher, PasswordValidator,
    };
    use crate::repository::InMemoryUserRepository;

    pub const PASSWORD: &str = "Old#Pass1";

    /// Reversible stand-in for Argon2 so tests stay fast.
    pub struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> AccountResult<String> {
            Ok(format!("hashed:{}", password))
        }
    }

    impl PasswordComparer for PlainHasher {
        fn compare(&self, password: &str, hash: &str) -> AccountResult<bool> {
            Ok(hash == format!("hashed:{}", password))
        }
    }

    /// Accepts anything with an '@' as an email and anything non-empty as a password.
    pub struct LenientValidator;

    impl EmailValidator for LenientValidator {
        fn validate(&self, email: &str) -> AccountResult<()> {
            if email.contains('@') {
                Ok(())
            } else {
                Err(AccountError::InvalidData(format!("bad email {}", email)))
            }
        }
    }

    impl PasswordValidator for LenientValidator {
        fn validate(&self, password: &str, _email: &str) -> AccountResult<()> {
            if password.is_empty() {
                Err(AccountError::InvalidData("empty password".into()))
            } else {
                Ok(())
            }
        }
    }

    /// Yields "000001", "000002", ...
    #[derive(Default)]
    pub struct SequenceCodes(AtomicUsize);

    impl CodeGenerator for SequenceCodes {
        fn generate(&self) -> String {
            format!("{:06}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    pub struct Harness {
        pub repo: Arc<InMemoryUserRepository>,
        pub codes: Arc<InMemoryCodeStore>,
        pub dispatcher: NotificationDispatcher,
        pub outbox: mpsc::Receiver<Notification>,
    }

    impl Harness {
        pub fn new() -> Self {
            let (dispatcher, outbox) = NotificationDispatcher::channel(16);
            Self {
                repo: Arc::new(InMemoryUserRepository::new()),
                codes: Arc::new(InMemoryCodeStore::new(Duration::from_secs(600))),
                dispatcher,
                outbox,
            }
        }

        pub async fn seed(&self, email: &str, state: &str, status: &str) -> UserRecord {
            let record = UserRecord {
                id: Uuid::now_v7(),
                email: email.to_string(),
                state: state.to_string(),
                status: status.to_string(),
                password_hash: format!("hashed:{}", PASSWORD),
                version: 3,
            };
            self.repo.insert(record.clone()).await;
            record
        }

        pub async fn stored(&self, id: Uuid) -> UserRecord {
            use crate::ports::UserRepository;
            self.repo.by_id(id).await.unwrap().unwrap()
        }
    }

    pub fn record(email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::now_v7(),
            email: email.to_string(),
            state: "active".to_string(),
            status: "user".to_string(),
            password_hash: format!("hashed:{}", PASSWORD),
            version: 3,
        }
    }
}
