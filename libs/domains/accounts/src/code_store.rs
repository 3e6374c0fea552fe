use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::AccountResult;
use crate::ports::{CodeKind, CodeStore};

/// In-memory code store with per-entry expiry (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryCodeStore {
    codes: Arc<RwLock<HashMap<(CodeKind, String), (String, Instant)>>>,
    ttl: Duration,
}

impl InMemoryCodeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.codes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.codes.read().await.is_empty()
    }
}

#[async_trait]
impl CodeStore for InMemoryCodeStore {
    async fn set(&self, kind: CodeKind, key: &str, code: &str) -> AccountResult<()> {
        let now = Instant::now();
        let mut codes = self.codes.write().await;
        // Codes that expire unread are dropped on the next write
        codes.retain(|_, (_, expires_at)| now < *expires_at);
        codes.insert((kind, key.to_string()), (code.to_string(), now + self.ttl));
        Ok(())
    }

    async fn get(&self, kind: CodeKind, key: &str) -> AccountResult<Option<String>> {
        let mut codes = self.codes.write().await;
        let entry = (kind, key.to_string());
        let found = codes
            .get(&entry)
            .map(|(code, expires_at)| (code.clone(), Instant::now() < *expires_at));
        match found {
            Some((code, true)) => Ok(Some(code)),
            Some((_, false)) => {
                codes.remove(&entry);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn del(&self, kind: CodeKind, key: &str) -> AccountResult<()> {
        let mut codes = self.codes.write().await;
        codes.remove(&(kind, key.to_string()));
        Ok(())
    }
}

#[cfg(feature = "redis-store")]
pub use self::redis_store::RedisCodeStore;

#[cfg(feature = "redis-store")]
mod redis_store {
    use super::*;
    use crate::error::AccountError;
    use redis::AsyncCommands;
    use redis::aio::ConnectionManager;
    use tracing::info;

    /// Redis-backed code store. Entries expire through `SET EX`.
    #[derive(Clone)]
    pub struct RedisCodeStore {
        redis: ConnectionManager,
        ttl: Duration,
    }

    impl RedisCodeStore {
        pub fn new(redis: ConnectionManager, ttl: Duration) -> Self {
            Self { redis, ttl }
        }

        /// Connect to `url` and verify the connection with PING.
        pub async fn connect(url: &str, ttl: Duration) -> AccountResult<Self> {
            info!("Connecting code store to Redis");

            let client = redis::Client::open(url).map_err(redis_error)?;
            let manager = ConnectionManager::new(client).await.map_err(redis_error)?;

            let mut conn = manager.clone();
            let _: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(redis_error)?;

            Ok(Self::new(manager, ttl))
        }

        fn ttl_secs(&self) -> u64 {
            self.ttl.as_secs().max(1)
        }
    }

    pub(super) fn namespaced(kind: CodeKind, key: &str) -> String {
        format!("accounts:code:{}:{}", kind, key)
    }

    fn redis_error(e: redis::RedisError) -> AccountError {
        AccountError::Internal(format!("Redis error: {}", e))
    }

    #[async_trait]
    impl CodeStore for RedisCodeStore {
        async fn set(&self, kind: CodeKind, key: &str, code: &str) -> AccountResult<()> {
            let mut conn = self.redis.clone();
            conn.set_ex::<_, _, ()>(namespaced(kind, key), code, self.ttl_secs())
                .await
                .map_err(redis_error)
        }

        async fn get(&self, kind: CodeKind, key: &str) -> AccountResult<Option<String>> {
            let mut conn = self.redis.clone();
            conn.get::<_, Option<String>>(namespaced(kind, key))
                .await
                .map_err(redis_error)
        }

        async fn del(&self, kind: CodeKind, key: &str) -> AccountResult<()> {
            let mut conn = self.redis.clone();
            conn.del::<_, ()>(namespaced(kind, key))
                .await
                .map_err(redis_error)
        }
    }
}
