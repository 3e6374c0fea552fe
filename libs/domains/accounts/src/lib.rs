//! Accounts Domain
//!
//! Lifecycle of user accounts: registration with an emailed code, owner
//! initiated email and password changes, password reset, and administrative
//! edits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  AccountService  │  ← one method per workflow
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │    Use cases     │  ← validation, ownership/policy, codes, one save
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐      ┌───────────────────────┐
//! │   Domain (User)  │      │ Ports (repo, codes,   │
//! │ state/status/ver │      │ hashing, validation)  │
//! └──────────────────┘      └───────────────────────┘
//! ```
//!
//! Emails leave through a bounded queue drained by a background worker, so a
//! slow or failing mailer never fails a request.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use domain_accounts::{
//!     AccountDeps, AccountService, AccountsConfig, InMemoryCodeStore, InMemoryUserRepository,
//!     TracingMailer, notifications::spawn_worker,
//! };
//! use tokio::sync::watch;
//!
//! # async fn run() {
//! let config = AccountsConfig::default();
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//! let (dispatcher, _worker) =
//!     spawn_worker(config.notification_queue, Arc::new(TracingMailer), shutdown_rx);
//!
//! let deps = AccountDeps::with_defaults(
//!     &config,
//!     Arc::new(InMemoryUserRepository::new()),
//!     Arc::new(InMemoryCodeStore::new(config.code_ttl)),
//!     dispatcher,
//! );
//! let service = AccountService::new(deps);
//! # }
//! ```

pub mod code_store;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod models;
pub mod notifications;
pub mod ports;
pub mod repository;
pub mod security;
pub mod service;
pub mod telemetry;
pub mod translate;
pub mod usecases;

// Re-export commonly used types
pub use code_store::InMemoryCodeStore;
#[cfg(feature = "redis-store")]
pub use code_store::RedisCodeStore;
pub use config::{AccountsConfig, ConfigError, FromEnv, RedisCodeStoreConfig};
pub use context::RequestContext;
pub use domain::{DomainError, PolicyService, State, Status, User};
pub use error::{AccountError, AccountResult, ErrorKind};
pub use models::*;
pub use notifications::{
    AccountMailer, Notification, NotificationDispatcher, NotificationWorker, RecordingMailer,
    TracingMailer,
};
pub use ports::{CodeKind, CodeStore, UserRepository};
pub use repository::InMemoryUserRepository;
pub use service::{AccountDeps, AccountService};
