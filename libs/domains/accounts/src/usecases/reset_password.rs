use std::sync::Arc;

use tracing::{info, instrument};

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::ResetPasswordCommand;
use crate::ports::{
    CodeKind, CodeStore, PasswordHasher, PasswordValidator, UserRepository, user_email_key,
};
use crate::translate::{modified_record, restore};

use super::verify_code;

/// Set a new password with a reset code instead of the old password.
pub struct ResetPasswordUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    password_validator: Arc<dyn PasswordValidator>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl ResetPasswordUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        password_validator: Arc<dyn PasswordValidator>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            repo,
            codes,
            password_validator,
            password_hasher,
        }
    }

    #[instrument(skip(self, ctx, command), fields(email = %command.email))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: ResetPasswordCommand,
    ) -> AccountResult<()> {
        let record = ctx
            .run(self.repo.by_email(&command.email))
            .await?
            .ok_or_else(|| {
                AccountError::NotFound(format!("user with email {} not found", command.email))
            })?;

        self.password_validator
            .validate(&command.new_password, &record.email)?;

        let key = user_email_key(record.id, &record.email);
        verify_code(
            ctx,
            self.codes.as_ref(),
            CodeKind::ResetPassword,
            &key,
            &command.code,
        )
        .await?;

        let password_hash = self.password_hasher.hash(&command.new_password)?;
        let mut user = restore(&record)?;
        user.set_password_hash(&password_hash)?;

        ctx.run(self.codes.del(CodeKind::ResetPassword, &key)).await?;
        ctx.run(self.repo.save(modified_record(&user))).await?;

        info!(user_id = %record.id, version = user.modified_version(), "User password reset");
        Ok(())
    }
}
