use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::domain::{PolicyService, State, Status};
use crate::error::{AccountError, AccountResult};
use crate::models::{ChangeUserCommand, UserRecord};
use crate::ports::{EmailValidator, PasswordHasher, PasswordValidator, UserRepository};
use crate::translate::{modified_record, restore};

use super::{load_user, provided};

/// Administrative edit of another account's email, state, status or password.
///
/// Only an active admin may call it. Fields are applied in the order email,
/// state, status, password, all before the single save, so one bad field
/// leaves the account as it was.
pub struct ChangeUserUseCase {
    repo: Arc<dyn UserRepository>,
    email_validator: Arc<dyn EmailValidator>,
    password_validator: Arc<dyn PasswordValidator>,
    password_hasher: Arc<dyn PasswordHasher>,
    policy: PolicyService,
}

impl ChangeUserUseCase {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        email_validator: Arc<dyn EmailValidator>,
        password_validator: Arc<dyn PasswordValidator>,
        password_hasher: Arc<dyn PasswordHasher>,
        policy: PolicyService,
    ) -> Self {
        Self {
            repo,
            email_validator,
            password_validator,
            password_hasher,
            policy,
        }
    }

    #[instrument(
        skip(self, ctx, command),
        fields(initiator_id = %command.initiator_id, user_id = %command.user_id)
    )]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        command: ChangeUserCommand,
    ) -> AccountResult<()> {
        let initiator = restore(&self.existing(ctx, command.initiator_id).await?)?;
        if !self.policy.can_edit_others(&initiator) {
            return Err(AccountError::NotAllowed(format!(
                "user {} cannot edit other users",
                command.initiator_id
            )));
        }

        let mut user = restore(&self.existing(ctx, command.user_id).await?)?;

        let email = provided(&command.email);
        let state = provided(&command.state);
        let status = provided(&command.status);
        let password = provided(&command.password);

        if email.is_none() && state.is_none() && status.is_none() && password.is_none() {
            return Err(AccountError::Idempotent(format!(
                "nothing to change for user {}",
                command.user_id
            )));
        }

        if let Some(email) = email {
            self.email_validator.validate(email)?;
            if let Some(owner) = ctx.run(self.repo.by_email(email)).await?
                && owner.id != user.id()
            {
                return Err(AccountError::AlreadyExists(format!(
                    "user with email {} already exists",
                    email
                )));
            }
            user.set_email(email)?;
        }

        // A state change away from active locks every field after it
        if let Some(state) = state {
            user.set_state(State::parse(state)?)?;
        }

        if let Some(status) = status {
            user.set_status(Status::parse(status)?)?;
        }

        if let Some(password) = password {
            self.password_validator.validate(password, user.email())?;
            let password_hash = self.password_hasher.hash(password)?;
            user.set_password_hash(&password_hash)?;
        }

        ctx.run(self.repo.save(modified_record(&user))).await?;

        info!(version = user.modified_version(), "User changed by admin");
        Ok(())
    }

    async fn existing(&self, ctx: &RequestContext, id: Uuid) -> AccountResult<UserRecord> {
        if !ctx.run(self.repo.id_exists(id)).await? {
            return Err(AccountError::NotFound(format!("user {} not found", id)));
        }
        load_user(ctx, self.repo.as_ref(), id).await
    }
}
