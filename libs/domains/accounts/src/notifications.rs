//! Best-effort delivery of one-time codes.
//!
//! Use cases hand a [`Notification`] to the [`NotificationDispatcher`] and
//! return immediately. A [`NotificationWorker`] drains the bounded queue in
//! the background and calls the [`AccountMailer`]. Nothing is retried and no
//! failure travels back to the use case: a full queue or a mailer error is
//! logged and the notification is dropped.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use strum::IntoStaticStr;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::EmailCode;

#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Notification {
    /// Code proving control of an address before registration
    ConfirmationEmail(EmailCode),
    /// One code for the current address and one for the requested address
    NewEmailConfirmation(Vec<EmailCode>),
    NewPasswordConfirmation(EmailCode),
    ResetPassword(EmailCode),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    pub fn recipients(&self) -> Vec<&str> {
        match self {
            Notification::ConfirmationEmail(code)
            | Notification::NewPasswordConfirmation(code)
            | Notification::ResetPassword(code) => vec![code.to.as_str()],
            Notification::NewEmailConfirmation(codes) => {
                codes.iter().map(|c| c.to.as_str()).collect()
            }
        }
    }
}

/// Outbound channel for account emails, one method per workflow.
#[async_trait]
pub trait AccountMailer: Send + Sync {
    async fn send_confirmation_email(&self, code: &EmailCode) -> Result<()>;

    async fn send_new_email_confirmation(&self, codes: &[EmailCode]) -> Result<()>;

    async fn send_new_password_confirmation(&self, code: &EmailCode) -> Result<()>;

    async fn send_reset_password(&self, code: &EmailCode) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Producer half of the notification queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Create a dispatcher and the receiver a [`NotificationWorker`] drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a notification without waiting. Returns whether it was queued.
    pub fn dispatch(&self, notification: Notification) -> bool {
        let kind = notification.kind();
        match self.tx.try_send(notification) {
            Ok(()) => {
                debug!(kind, "Notification queued");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(kind, "Notification queue is full, dropping notification");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(kind, "Notification worker is gone, dropping notification");
                false
            }
        }
    }
}

/// Background consumer of the notification queue.
pub struct NotificationWorker {
    rx: mpsc::Receiver<Notification>,
    mailer: Arc<dyn AccountMailer>,
}

impl NotificationWorker {
    pub fn new(rx: mpsc::Receiver<Notification>, mailer: Arc<dyn AccountMailer>) -> Self {
        Self { rx, mailer }
    }

    /// Deliver queued notifications until shutdown is signalled or every
    /// dispatcher has been dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(mailer = self.mailer.name(), "Starting notification worker");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Received shutdown signal, stopping notification worker");
                        break;
                    }
                }
                next = self.rx.recv() => match next {
                    Some(notification) => self.deliver(notification).await,
                    None => {
                        info!("Notification queue closed, stopping notification worker");
                        break;
                    }
                },
            }
        }
    }

    async fn deliver(&self, notification: Notification) {
        let result = match &notification {
            Notification::ConfirmationEmail(code) => {
                self.mailer.send_confirmation_email(code).await
            }
            Notification::NewEmailConfirmation(codes) => {
                self.mailer.send_new_email_confirmation(codes).await
            }
            Notification::NewPasswordConfirmation(code) => {
                self.mailer.send_new_password_confirmation(code).await
            }
            Notification::ResetPassword(code) => self.mailer.send_reset_password(code).await,
        };

        match result {
            Ok(()) => debug!(kind = notification.kind(), "Notification delivered"),
            Err(e) => warn!(
                error = %e,
                kind = notification.kind(),
                recipients = ?notification.recipients(),
                "Failed to deliver notification"
            ),
        }
    }
}

/// Start a worker on the current runtime and return its dispatcher.
pub fn spawn_worker(
    capacity: usize,
    mailer: Arc<dyn AccountMailer>,
    shutdown: watch::Receiver<bool>,
) -> (NotificationDispatcher, JoinHandle<()>) {
    let (dispatcher, rx) = NotificationDispatcher::channel(capacity);
    let worker = NotificationWorker::new(rx, mailer);
    let handle = tokio::spawn(worker.run(shutdown));
    (dispatcher, handle)
}

/// Mailer that only logs deliveries. Codes are never written to the log.
#[derive(Debug, Default, Clone)]
pub struct TracingMailer;

#[async_trait]
impl AccountMailer for TracingMailer {
    async fn send_confirmation_email(&self, code: &EmailCode) -> Result<()> {
        info!(to = %code.to, "Sending registration confirmation code");
        Ok(())
    }

    async fn send_new_email_confirmation(&self, codes: &[EmailCode]) -> Result<()> {
        for code in codes {
            info!(to = %code.to, "Sending email change confirmation code");
        }
        Ok(())
    }

    async fn send_new_password_confirmation(&self, code: &EmailCode) -> Result<()> {
        info!(to = %code.to, "Sending password change confirmation code");
        Ok(())
    }

    async fn send_reset_password(&self, code: &EmailCode) -> Result<()> {
        info!(to = %code.to, "Sending password reset code");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Mailer that captures every delivery, optionally failing instead.
#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Notification>>>,
    failure_message: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failure_message: Some(message.into()),
        }
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Most recent code delivered to `email`, if any.
    pub async fn last_code_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().await;
        sent.iter()
            .rev()
            .flat_map(|n| match n {
                Notification::ConfirmationEmail(code)
                | Notification::NewPasswordConfirmation(code)
                | Notification::ResetPassword(code) => vec![code.clone()],
                Notification::NewEmailConfirmation(codes) => codes.clone(),
            })
            .find(|c| c.to == email)
            .map(|c| c.code)
    }

    async fn record(&self, notification: Notification) -> Result<()> {
        if let Some(message) = &self.failure_message {
            return Err(eyre::eyre!(message.clone()));
        }
        self.sent.lock().await.push(notification);
        Ok(())
    }
}

#[async_trait]
impl AccountMailer for RecordingMailer {
    async fn send_confirmation_email(&self, code: &EmailCode) -> Result<()> {
        self.record(Notification::ConfirmationEmail(code.clone())).await
    }

    async fn send_new_email_confirmation(&self, codes: &[EmailCode]) -> Result<()> {
        self.record(Notification::NewEmailConfirmation(codes.to_vec())).await
    }

    async fn send_new_password_confirmation(&self, code: &EmailCode) -> Result<()> {
        self.record(Notification::NewPasswordConfirmation(code.clone())).await
    }

    async fn send_reset_password(&self, code: &EmailCode) -> Result<()> {
        self.record(Notification::ResetPassword(code.clone())).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
