use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::User;
use crate::error::{AccountError, AccountResult};
use crate::models::RegistrationCommand;
use crate::ports::{
    CodeKind, CodeStore, EmailValidator, PasswordHasher, PasswordValidator, UserRepository,
    email_key,
};
use crate::translate::modified_record;

use super::verify_code;

/// Create an account for an address whose control was proven with a
/// confirmation code.
pub struct RegistrationUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    email_validator: Arc<dyn EmailValidator>,
    password_validator: Arc<dyn PasswordValidator>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl RegistrationUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        email_validator: Arc<dyn EmailValidator>,
        password_validator: Arc<dyn PasswordValidator>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            repo,
            codes,
            email_validator,
            password_validator,
            password_hasher,
        }
    }

    #[instrument(skip(self, ctx, command), fields(email = %command.email))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: RegistrationCommand,
    ) -> AccountResult<Uuid> {
        self.email_validator.validate(&command.email)?;

        let key = email_key(&command.email);
        verify_code(
            ctx,
            self.codes.as_ref(),
            CodeKind::ConfirmEmail,
            &key,
            &command.code,
        )
        .await?;

        if ctx.run(self.repo.email_exists(&command.email)).await? {
            return Err(AccountError::AlreadyExists(format!(
                "user with email {} already exists",
                command.email
            )));
        }

        self.password_validator
            .validate(&command.password, &command.email)?;
        let password_hash = self.password_hasher.hash(&command.password)?;

        let id = ctx.run(self.repo.next_id()).await?;
        let user = User::new(id, command.email.as_str(), password_hash)?;

        ctx.run(self.repo.save(modified_record(&user))).await?;
        ctx.run(self.codes.del(CodeKind::ConfirmEmail, &key)).await?;

        info!(user_id = %id, "User registered");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ports::{MockCodeStore, MockUserRepository};
    use crate::usecases::testing::{Harness, LenientValidator, PlainHasher};

    fn use_case(h: &Harness) -> RegistrationUseCase {
        RegistrationUseCase::new(
            h.repo.clone(),
            h.codes.clone(),
            Arc::new(LenientValidator),
            Arc::new(LenientValidator),
            Arc::new(PlainHasher),
        )
    }

    fn command(code: &str) -> RegistrationCommand {
        RegistrationCommand {
            email: "a@b.com".to_string(),
            password: "p1".to_string(),
            code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_registration_creates_active_user_and_consumes_code() {
        let h = Harness::new();
        h.codes.set(CodeKind::ConfirmEmail, "a@b.com", "123456").await.unwrap();

        let id = use_case(&h)
            .execute(&RequestContext::new(), command("123456"))
            .await
            .unwrap();

        assert!(!id.is_nil());
        let stored = h.stored(id).await;
        assert_eq!(stored.email, "a@b.com");
        assert_eq!(stored.state, "active");
        assert_eq!(stored.status, "user");
        assert_eq!(stored.password_hash, "hashed:p1");
        assert_eq!(stored.version, 1);
        assert_eq!(h.codes.get(CodeKind::ConfirmEmail, "a@b.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_wrong_code_creates_nothing_and_keeps_code() {
        let h = Harness::new();
        h.codes.set(CodeKind::ConfirmEmail, "a@b.com", "123456").await.unwrap();

        let err = use_case(&h)
            .execute(&RequestContext::new(), command("654321"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(h.repo.is_empty().await);
        assert_eq!(
            h.codes.get(CodeKind::ConfirmEmail, "a@b.com").await.unwrap().as_deref(),
            Some("123456")
        );
    }

    #[tokio::test]
    async fn test_missing_code_is_invalid_data() {
        let h = Harness::new();
        let err = use_case(&h)
            .execute(&RequestContext::new(), command("123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_code_is_looked_up_by_email_not_by_itself() {
        let h = Harness::new();
        h.codes.set(CodeKind::ConfirmEmail, "123456", "123456").await.unwrap();

        let err = use_case(&h)
            .execute(&RequestContext::new(), command("123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_existing_email_is_rejected() {
        let h = Harness::new();
        h.seed("a@b.com", "active", "user").await;
        h.codes.set(CodeKind::ConfirmEmail, "a@b.com", "123456").await.unwrap();

        let err = use_case(&h)
            .execute(&RequestContext::new(), command("123456"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(h.repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_email_and_password() {
        let h = Harness::new();
        h.codes.set(CodeKind::ConfirmEmail, "a@b.com", "123456").await.unwrap();

        let mut bad_email = command("123456");
        bad_email.email = "not-an-email".to_string();
        let err = use_case(&h).execute(&RequestContext::new(), bad_email).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let mut bad_password = command("123456");
        bad_password.password = String::new();
        let err = use_case(&h).execute(&RequestContext::new(), bad_password).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        assert!(h.repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_code() {
        let mut repo = MockUserRepository::new();
        repo.expect_email_exists().returning(|_| Ok(false));
        repo.expect_next_id().returning(|| Ok(Uuid::now_v7()));
        repo.expect_save()
            .times(1)
            .returning(|_| Err(AccountError::Conflict("taken".into())));

        let mut codes = MockCodeStore::new();
        codes
            .expect_get()
            .returning(|_, _| Ok(Some("123456".to_string())));
        codes.expect_del().never();

        let use_case = RegistrationUseCase::new(
            Arc::new(repo),
            Arc::new(codes),
            Arc::new(LenientValidator),
            Arc::new(LenientValidator),
            Arc::new(PlainHasher),
        );

        let err = use_case
            .execute(&RequestContext::new(), command("123456"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_cancelled_request_writes_nothing() {
        let h = Harness::new();
        h.codes.set(CodeKind::ConfirmEmail, "a@b.com", "123456").await.unwrap();

        let ctx = RequestContext::new();
        ctx.cancel();

        let err = use_case(&h).execute(&ctx, command("123456")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(h.repo.is_empty().await);
        assert_eq!(h.codes.len().await, 1);
    }
}
