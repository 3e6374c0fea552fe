//! Account entity, its value types and the authorization policy.
//!
//! Nothing in here knows about storage, codes or notifications.

pub mod error;
pub mod policy;
pub mod state;
pub mod status;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use policy::PolicyService;
pub use state::State;
pub use status::Status;
pub use user::User;
