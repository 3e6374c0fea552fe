use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult};
use crate::models::UserRecord;
use crate::ports::UserRepository;

/// In-memory implementation of UserRepository (for development/testing)
///
/// Enforces the same optimistic-version contract a database adapter would:
/// `save` succeeds only when the incoming version is one above the stored one.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a record as-is, bypassing version checks.
    pub async fn insert(&self, user: UserRecord) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn id_exists(&self, id: Uuid) -> AccountResult<bool> {
        let users = self.users.read().await;
        Ok(users.contains_key(&id))
    }

    async fn email_exists(&self, email: &str) -> AccountResult<bool> {
        let users = self.users.read().await;
        let exists = users
            .values()
            .any(|u| u.email.to_lowercase() == email.to_lowercase());
        Ok(exists)
    }

    async fn by_id(&self, id: Uuid) -> AccountResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn by_email(&self, email: &str) -> AccountResult<Option<UserRecord>> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|u| u.email.to_lowercase() == email.to_lowercase())
            .cloned();
        Ok(user)
    }

    async fn next_id(&self) -> AccountResult<Uuid> {
        Ok(Uuid::now_v7())
    }

    async fn save(&self, user: UserRecord) -> AccountResult<()> {
        let mut users = self.users.write().await;

        let expected = users.get(&user.id).map_or(1, |stored| stored.version + 1);
        if user.version != expected {
            return Err(AccountError::Conflict(format!(
                "user {} version {} does not follow stored version {}",
                user.id,
                user.version,
                expected - 1
            )));
        }

        // Check for duplicate email (excluding current user)
        let email_taken = users.values().any(|u| {
            u.id != user.id && u.email.to_lowercase() == user.email.to_lowercase()
        });
        if email_taken {
            return Err(AccountError::Conflict(format!(
                "email '{}' belongs to another user",
                user.email
            )));
        }

        tracing::info!(user_id = %user.id, version = user.version, "Saved user");
        users.insert(user.id, user);
        Ok(())
    }
}
