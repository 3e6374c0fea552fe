use std::sync::Arc;

use uuid::Uuid;

use crate::config::AccountsConfig;
use crate::context::RequestContext;
use crate::domain::PolicyService;
use crate::error::AccountResult;
use crate::models::{
    ChangeUserCommand, ConfirmEmailCommand, ConfirmNewEmailCommand, ConfirmNewPasswordCommand,
    ConfirmResetPasswordCommand, NewEmailCommand, NewPasswordCommand, RegistrationCommand,
    ResetPasswordCommand,
};
use crate::notifications::NotificationDispatcher;
use crate::ports::{
    CodeGenerator, CodeStore, EmailValidator, PasswordComparer, PasswordHasher,
    PasswordValidator, UserRepository,
};
use crate::security::{
    Argon2PasswordHasher, NumericCodeGenerator, StrengthPasswordValidator, SyntaxEmailValidator,
};
use crate::usecases::{
    ChangeUserUseCase, ConfirmEmailUseCase, ConfirmNewEmailUseCase, ConfirmNewPasswordUseCase,
    ConfirmResetPasswordUseCase, NewEmailUseCase, NewPasswordUseCase, RegistrationUseCase,
    ResetPasswordUseCase,
};

/// Collaborators shared by every account workflow.
#[derive(Clone)]
pub struct AccountDeps {
    pub repository: Arc<dyn UserRepository>,
    pub codes: Arc<dyn CodeStore>,
    pub email_validator: Arc<dyn EmailValidator>,
    pub password_validator: Arc<dyn PasswordValidator>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub password_comparer: Arc<dyn PasswordComparer>,
    pub code_generator: Arc<dyn CodeGenerator>,
    pub notifications: NotificationDispatcher,
    pub policy: PolicyService,
}

impl AccountDeps {
    /// Storage and delivery from the caller, credential handling from the
    /// crate's Argon2, syntax and strength implementations.
    pub fn with_defaults(
        config: &AccountsConfig,
        repository: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        notifications: NotificationDispatcher,
    ) -> Self {
        let argon2 = Arc::new(Argon2PasswordHasher::new());
        Self {
            repository,
            codes,
            email_validator: Arc::new(SyntaxEmailValidator),
            password_validator: Arc::new(StrengthPasswordValidator::new(
                config.password_min_length,
            )),
            password_hasher: argon2.clone(),
            password_comparer: argon2,
            code_generator: Arc::new(NumericCodeGenerator::new(config.code_length)),
            notifications,
            policy: PolicyService::new(),
        }
    }
}

/// Entry point for the account workflows
#[derive(Clone)]
pub struct AccountService {
    registration: Arc<RegistrationUseCase>,
    confirm_email: Arc<ConfirmEmailUseCase>,
    change_user: Arc<ChangeUserUseCase>,
    confirm_new_email: Arc<ConfirmNewEmailUseCase>,
    new_email: Arc<NewEmailUseCase>,
    confirm_new_password: Arc<ConfirmNewPasswordUseCase>,
    new_password: Arc<NewPasswordUseCase>,
    confirm_reset_password: Arc<ConfirmResetPasswordUseCase>,
    reset_password: Arc<ResetPasswordUseCase>,
}

impl AccountService {
    pub fn new(deps: AccountDeps) -> Self {
        let AccountDeps {
            repository,
            codes,
            email_validator,
            password_validator,
            password_hasher,
            password_comparer,
            code_generator,
            notifications,
            policy,
        } = deps;

        Self {
            registration: Arc::new(RegistrationUseCase::new(
                repository.clone(),
                codes.clone(),
                email_validator.clone(),
                password_validator.clone(),
                password_hasher.clone(),
            )),
            confirm_email: Arc::new(ConfirmEmailUseCase::new(
                repository.clone(),
                codes.clone(),
                email_validator.clone(),
                code_generator.clone(),
                notifications.clone(),
            )),
            change_user: Arc::new(ChangeUserUseCase::new(
                repository.clone(),
                email_validator.clone(),
                password_validator.clone(),
                password_hasher.clone(),
                policy,
            )),
            confirm_new_email: Arc::new(ConfirmNewEmailUseCase::new(
                repository.clone(),
                codes.clone(),
                email_validator.clone(),
                code_generator.clone(),
                notifications.clone(),
            )),
            new_email: Arc::new(NewEmailUseCase::new(
                repository.clone(),
                codes.clone(),
                email_validator,
                password_comparer.clone(),
            )),
            confirm_new_password: Arc::new(ConfirmNewPasswordUseCase::new(
                repository.clone(),
                codes.clone(),
                code_generator.clone(),
                notifications.clone(),
            )),
            new_password: Arc::new(NewPasswordUseCase::new(
                repository.clone(),
                codes.clone(),
                password_validator.clone(),
                password_hasher.clone(),
                password_comparer,
            )),
            confirm_reset_password: Arc::new(ConfirmResetPasswordUseCase::new(
                repository.clone(),
                codes.clone(),
                code_generator,
                notifications,
            )),
            reset_password: Arc::new(ResetPasswordUseCase::new(
                repository,
                codes,
                password_validator,
                password_hasher,
            )),
        }
    }

    /// Register an account; returns the new id
    pub async fn register(
        &self,
        ctx: &RequestContext,
        command: RegistrationCommand,
    ) -> AccountResult<Uuid> {
        self.registration.execute(ctx, command).await
    }

    /// Send a registration code to an unregistered address
    pub async fn confirm_email(
        &self,
        ctx: &RequestContext,
        command: ConfirmEmailCommand,
    ) -> AccountResult<()> {
        self.confirm_email.execute(ctx, command).await
    }

    pub async fn change_user(
        &self,
        ctx: &RequestContext,
        command: ChangeUserCommand,
    ) -> AccountResult<()> {
        self.change_user.execute(ctx, command).await
    }

    pub async fn confirm_new_email(
        &self,
        ctx: &RequestContext,
        command: ConfirmNewEmailCommand,
    ) -> AccountResult<()> {
        self.confirm_new_email.execute(ctx, command).await
    }

    pub async fn new_email(
        &self,
        ctx: &RequestContext,
        command: NewEmailCommand,
    ) -> AccountResult<()> {
        self.new_email.execute(ctx, command).await
    }

    pub async fn confirm_new_password(
        &self,
        ctx: &RequestContext,
        command: ConfirmNewPasswordCommand,
    ) -> AccountResult<()> {
        self.confirm_new_password.execute(ctx, command).await
    }

    pub async fn new_password(
        &self,
        ctx: &RequestContext,
        command: NewPasswordCommand,
    ) -> AccountResult<()> {
        self.new_password.execute(ctx, command).await
    }

    pub async fn confirm_reset_password(
        &self,
        ctx: &RequestContext,
        command: ConfirmResetPasswordCommand,
    ) -> AccountResult<()> {
        self.confirm_reset_password.execute(ctx, command).await
    }

    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        command: ResetPasswordCommand,
    ) -> AccountResult<()> {
        self.reset_password.execute(ctx, command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_store::InMemoryCodeStore;
    use crate::error::ErrorKind;
    use crate::repository::InMemoryUserRepository;
    use std::time::Duration;

    #[tokio::test]
    async fn test_default_deps_enforce_password_strength() {
        let (dispatcher, _rx) = NotificationDispatcher::channel(4);
        let codes = Arc::new(InMemoryCodeStore::new(Duration::from_secs(60)));
        codes
            .set(crate::ports::CodeKind::ConfirmEmail, "a@b.com", "123456")
            .await
            .unwrap();

        let deps = AccountDeps::with_defaults(
            &AccountsConfig::default(),
            Arc::new(InMemoryUserRepository::new()),
            codes,
            dispatcher,
        );
        let service = AccountService::new(deps);

        let err = service
            .register(
                &RequestContext::new(),
                RegistrationCommand {
                    email: "a@b.com".to_string(),
                    password: "weak".to_string(),
                    code: "123456".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
