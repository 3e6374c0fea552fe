use std::sync::Arc;

use tracing::{info, instrument};

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::NewPasswordCommand;
use crate::ports::{
    CodeKind, CodeStore, PasswordComparer, PasswordHasher, PasswordValidator, UserRepository,
    user_email_key,
};
use crate::translate::{modified_record, restore};

use super::{ensure_owner, load_user, verify_code};

/// Owner-initiated password change, confirmed by code and the old password.
pub struct NewPasswordUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    password_validator: Arc<dyn PasswordValidator>,
    password_hasher: Arc<dyn PasswordHasher>,
    password_comparer: Arc<dyn PasswordComparer>,
}

impl NewPasswordUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        password_validator: Arc<dyn PasswordValidator>,
        password_hasher: Arc<dyn PasswordHasher>,
        password_comparer: Arc<dyn PasswordComparer>,
    ) -> Self {
        Self {
            repo,
            codes,
            password_validator,
            password_hasher,
            password_comparer,
        }
    }

    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: NewPasswordCommand,
    ) -> AccountResult<()> {
        ensure_owner(command.initiator_id, command.user_id, "change the password")?;

        if command.new_password == command.old_password {
            return Err(AccountError::InvalidData(
                "new password must differ from the old one".to_string(),
            ));
        }

        let record = load_user(ctx, self.repo.as_ref(), command.user_id).await?;
        let key = user_email_key(record.id, &record.email);
        verify_code(
            ctx,
            self.codes.as_ref(),
            CodeKind::NewPassword,
            &key,
            &command.code,
        )
        .await?;

        if !self
            .password_comparer
            .compare(&command.old_password, &record.password_hash)?
        {
            return Err(AccountError::InvalidData("wrong password".to_string()));
        }

        self.password_validator
            .validate(&command.new_password, &record.email)?;
        let password_hash = self.password_hasher.hash(&command.new_password)?;

        let mut user = restore(&record)?;
        user.set_password_hash(&password_hash)?;

        ctx.run(self.codes.del(CodeKind::NewPassword, &key)).await?;
        ctx.run(self.repo.save(modified_record(&user))).await?;

        info!(version = user.modified_version(), "User password changed");
        Ok(())
    }
}
