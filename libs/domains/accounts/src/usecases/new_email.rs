use std::sync::Arc;

use tracing::{info, instrument};

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::NewEmailCommand;
use crate::ports::{
    CodeKind, CodeStore, EmailValidator, PasswordComparer, UserRepository, user_email_key,
};
use crate::translate::{modified_record, restore};

use super::{ensure_owner, load_user, verify_code};

/// Switch an account to a new address once both codes and the password check
/// out.
pub struct NewEmailUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    email_validator: Arc<dyn EmailValidator>,
    password_comparer: Arc<dyn PasswordComparer>,
}

impl NewEmailUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        email_validator: Arc<dyn EmailValidator>,
        password_comparer: Arc<dyn PasswordComparer>,
    ) -> Self {
        Self {
            repo,
            codes,
            email_validator,
            password_comparer,
        }
    }

    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: NewEmailCommand,
    ) -> AccountResult<()> {
        ensure_owner(command.initiator_id, command.user_id, "change the email")?;
        self.email_validator.validate(&command.new_email)?;

        if ctx.run(self.repo.email_exists(&command.new_email)).await? {
            return Err(AccountError::AlreadyExists(format!(
                "user with email {} already exists",
                command.new_email
            )));
        }

        let record = load_user(ctx, self.repo.as_ref(), command.user_id).await?;

        if !self
            .password_comparer
            .compare(&command.password, &record.password_hash)?
        {
            return Err(AccountError::InvalidData("wrong password".to_string()));
        }

        let old_key = user_email_key(record.id, &record.email);
        let new_key = user_email_key(record.id, &command.new_email);
        verify_code(
            ctx,
            self.codes.as_ref(),
            CodeKind::NewEmail,
            &new_key,
            &command.new_email_code,
        )
        .await?;
        verify_code(
            ctx,
            self.codes.as_ref(),
            CodeKind::NewEmail,
            &old_key,
            &command.old_email_code,
        )
        .await?;

        let mut user = restore(&record)?;
        user.set_email(&command.new_email)?;

        ctx.run(self.repo.save(modified_record(&user))).await?;
        ctx.run(self.codes.del(CodeKind::NewEmail, &new_key)).await?;
        ctx.run(self.codes.del(CodeKind::NewEmail, &old_key)).await?;

        info!(version = user.modified_version(), "User email changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::UserRecord;
    use crate::ports::MockUserRepository;
    use crate::usecases::testing::{Harness, LenientValidator, PASSWORD, PlainHasher, record};
    use uuid::Uuid;

    fn use_case(h: &Harness) -> NewEmailUseCase {
        NewEmailUseCase::new(
            h.repo.clone(),
            h.codes.clone(),
            Arc::new(LenientValidator),
            Arc::new(PlainHasher),
        )
    }

    fn command(user: &UserRecord) -> NewEmailCommand {
        NewEmailCommand {
            initiator_id: user.id,
            user_id: user.id,
            new_email: "new@x.com".to_string(),
            new_email_code: "222222".to_string(),
            old_email_code: "111111".to_string(),
            password: PASSWORD.to_string(),
        }
    }

    async fn issue_codes(h: &Harness, user: &UserRecord) {
        h.codes
            .set(CodeKind::NewEmail, &user_email_key(user.id, &user.email), "111111")
            .await
            .unwrap();
        h.codes
            .set(CodeKind::NewEmail, &user_email_key(user.id, "new@x.com"), "222222")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_email_changed_and_codes_consumed() {
        let h = Harness::new();
        let user = h.seed("old@x.com", "active", "user").await;
        issue_codes(&h, &user).await;

        use_case(&h).execute(&RequestContext::new(), command(&user)).await.unwrap();

        let stored = h.stored(user.id).await;
        assert_eq!(stored.email, "new@x.com");
        assert_eq!(stored.version, user.version + 1);
        assert!(h.codes.is_empty().await);
    }

    #[tokio::test]
    async fn test_swapped_codes_are_rejected() {
        let h = Harness::new();
        let user = h.seed("old@x.com", "active", "user").await;
        issue_codes(&h, &user).await;

        let mut cmd = command(&user);
        std::mem::swap(&mut cmd.new_email_code, &mut cmd.old_email_code);
        let err = use_case(&h).execute(&RequestContext::new(), cmd).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(h.stored(user.id).await, user);
        assert_eq!(h.codes.len().await, 2);
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let h = Harness::new();
        let user = h.seed("old@x.com", "active", "user").await;
        issue_codes(&h, &user).await;

        let mut cmd = command(&user);
        cmd.password = "guess".to_string();
        let err = use_case(&h).execute(&RequestContext::new(), cmd).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert_eq!(h.codes.len().await, 2);
    }

    #[tokio::test]
    async fn test_frozen_account_cannot_change_email() {
        let h = Harness::new();
        let user = h.seed("old@x.com", "frozen", "user").await;
        issue_codes(&h, &user).await;

        let err = use_case(&h)
            .execute(&RequestContext::new(), command(&user))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserNotActive);
        assert_eq!(h.codes.len().await, 2);
    }

    #[tokio::test]
    async fn test_ownership_checked_before_any_lookup() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().never();
        repo.expect_by_id().never();
        repo.expect_save().never();

        let h = Harness::new();
        let use_case = NewEmailUseCase::new(
            Arc::new(repo),
            h.codes.clone(),
            Arc::new(LenientValidator),
            Arc::new(PlainHasher),
        );

        let user = record("old@x.com");
        let mut cmd = command(&user);
        cmd.initiator_id = Uuid::now_v7();
        let err = use_case.execute(&RequestContext::new(), cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAllowed);
    }

    #[tokio::test]
    async fn test_taken_address_is_rejected() {
        let h = Harness::new();
        let user = h.seed("old@x.com", "active", "user").await;
        h.seed("new@x.com", "active", "user").await;
        issue_codes(&h, &user).await;

        let err = use_case(&h)
            .execute(&RequestContext::new(), command(&user))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }
}
