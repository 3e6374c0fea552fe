use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AccountError, AccountResult};

/// Cancellation and deadline carried by every use-case call.
///
/// Use cases pass each repository and code-store future through
/// [`RequestContext::run`]; when the token fires or the deadline passes the
/// future is dropped and the call fails with [`AccountError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing token, e.g. a server-wide shutdown token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Drive `fut` unless the request is cancelled or out of time first.
    pub async fn run<T, F>(&self, fut: F) -> AccountResult<T>
    where
        F: Future<Output = AccountResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(cancelled());
        }

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(cancelled()),
                    _ = tokio::time::sleep_until(deadline) => {
                        Err(AccountError::Cancelled("deadline exceeded".to_string()))
                    }
                    result = fut => result,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(cancelled()),
                    result = fut => result,
                }
            }
        }
    }
}

fn cancelled() -> AccountError {
    AccountError::Cancelled("request was cancelled".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = RequestContext::new();
        let value = ctx.run(async { Ok::<_, AccountError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_polls_the_future() {
        let ctx = RequestContext::new();
        ctx.cancel();

        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();
        let result = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, AccountError>(())
            })
            .await;

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_slow_calls() {
        let ctx = RequestContext::new().with_timeout(Duration::from_secs(1));

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, AccountError>(())
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.is_transient());
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancellation_mid_flight() {
        let ctx = RequestContext::new();
        let token = ctx.token().clone();

        let handle = tokio::spawn(async move {
            ctx.run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, AccountError>(())
            })
            .await
        });
        token.cancel();

        let result = handle.await.unwrap();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Cancelled);
    }
}
