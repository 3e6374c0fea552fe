use std::sync::Arc;

use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::{ConfirmNewEmailCommand, EmailCode};
use crate::notifications::{Notification, NotificationDispatcher};
use crate::ports::{
    CodeGenerator, CodeKind, CodeStore, EmailValidator, UserRepository, user_email_key,
};

use super::{ensure_owner, load_user};

/// Send codes to both the current and the requested address before an
/// email change.
pub struct ConfirmNewEmailUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    email_validator: Arc<dyn EmailValidator>,
    code_generator: Arc<dyn CodeGenerator>,
    notifications: NotificationDispatcher,
}

impl ConfirmNewEmailUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeStore>,
        email_validator: Arc<dyn EmailValidator>,
        code_generator: Arc<dyn CodeGenerator>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            repo,
            codes,
            email_validator,
            code_generator,
            notifications,
        }
    }

    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: ConfirmNewEmailCommand,
    ) -> AccountResult<()> {
        ensure_owner(command.initiator_id, command.user_id, "change the email")?;
        self.email_validator.validate(&command.new_email)?;

        if ctx.run(self.repo.email_exists(&command.new_email)).await? {
            return Err(AccountError::AlreadyExists(format!(
                "user with email {} already exists",
                command.new_email
            )));
        }

        let user = load_user(ctx, self.repo.as_ref(), command.user_id).await?;

        let old_code = self.code_generator.generate();
        let new_code = self.code_generator.generate();
        ctx.run(self.codes.set(
            CodeKind::NewEmail,
            &user_email_key(user.id, &user.email),
            &old_code,
        ))
        .await?;
        ctx.run(self.codes.set(
            CodeKind::NewEmail,
            &user_email_key(user.id, &command.new_email),
            &new_code,
        ))
        .await?;

        self.notifications.dispatch(Notification::NewEmailConfirmation(vec![
            EmailCode::new(user.email, old_code),
            EmailCode::new(command.new_email, new_code),
        ]));
        debug!("Email change codes issued");
        Ok(())
    }
}
