use std::sync::Arc;

use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::{ConfirmResetPasswordCommand, EmailCode};
use crate::notifications::{Notification, NotificationDispatcher};
use crate::ports::{CodeGenerator, CodeKind, CodeStore, UserRepository, user_email_key};

/// Mail a reset code to the owner of a forgotten password.
pub struct ConfirmResetPasswordUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    code_generator: Arc<dyn CodeGenerator>,
    notifications: NotificationDispatcher,
}

impl ConfirmResetPasswordUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        code_generator: Arc<dyn CodeGenerator>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            repo,
            codes,
            code_generator,
            notifications,
        }
    }

    #[instrument(skip(self, ctx, command), fields(email = %command.email))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: ConfirmResetPasswordCommand,
    ) -> AccountResult<()> {
        let user = ctx
            .run(self.repo.by_email(&command.email))
            .await?
            .ok_or_else(|| {
                AccountError::NotFound(format!("user with email {} not found", command.email))
            })?;

        let code = self.code_generator.generate();
        ctx.run(self.codes.set(
            CodeKind::ResetPassword,
            &user_email_key(user.id, &user.email),
            &code,
        ))
        .await?;

        self.notifications
            .dispatch(Notification::ResetPassword(EmailCode::new(user.email, code)));
        debug!(user_id = %user.id, "Reset code issued");
        Ok(())
    }
}
