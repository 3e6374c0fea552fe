use std::sync::Arc;

use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::error::AccountResult;
use crate::models::{ConfirmNewPasswordCommand, EmailCode};
use crate::notifications::{Notification, NotificationDispatcher};
use crate::ports::{CodeGenerator, CodeKind, CodeStore, UserRepository, user_email_key};

use super::{ensure_owner, load_user};

pub struct ConfirmNewPasswordUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    code_generator: Arc<dyn CodeGenerator>,
    notifications: NotificationDispatcher,
}

impl ConfirmNewPasswordUseCase {
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

    #[instrument(skip(self, ctx, command), fields(user_id = %command.user_id))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: ConfirmNewPasswordCommand,
    ) -> AccountResult<()> {
        ensure_owner(command.initiator_id, command.user_id, "change the password")?;

        let user = load_user(ctx, self.repo.as_ref(), command.user_id).await?;

        let code = self.code_generator.generate();
        ctx.run(self.codes.set(
            CodeKind::NewPassword,
            &user_email_key(user.id, &user.email),
            &code,
        ))
        .await?;

        self.notifications
            .dispatch(Notification::NewPasswordConfirmation(EmailCode::new(user.email, code)));
        debug!("Password change code issued");
        Ok(())
    }
}
