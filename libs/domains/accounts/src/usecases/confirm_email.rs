use std::sync::Arc;

use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::error::{AccountError, AccountResult};
use crate::models::{ConfirmEmailCommand, EmailCode};
use crate::notifications::{Notification, NotificationDispatcher};
use crate::ports::{CodeGenerator, CodeKind, CodeStore, EmailValidator, UserRepository, email_key};

/// Issue the code a visitor needs to register with an address.
pub struct ConfirmEmailUseCase {
    repo: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeStore>,
    email_validator: Arc<dyn EmailValidator>,
    code_generator: Arc<dyn CodeGenerator>,
    notifications: NotificationDispatcher,
}

impl ConfirmEmailUseCase {
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

    #[instrument(skip(self, ctx, command), fields(email = %command.email))]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: ConfirmEmailCommand,
    ) -> AccountResult<()> {
        self.email_validator.validate(&command.email)?;

        if ctx.run(self.repo.email_exists(&command.email)).await? {
            return Err(AccountError::AlreadyExists(format!(
                "user with email {} already exists",
                command.email
            )));
        }

        let code = self.code_generator.generate();
        ctx.run(
            self.codes
                .set(CodeKind::ConfirmEmail, &email_key(&command.email), &code),
        )
        .await?;

        self.notifications
            .dispatch(Notification::ConfirmationEmail(EmailCode::new(command.email, code)));
        debug!("Confirmation code issued");
        Ok(())
    }
}
