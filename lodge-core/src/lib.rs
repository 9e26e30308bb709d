pub mod identity;
pub mod policy;
pub mod repository;

pub use identity::{Actor, Role};
pub use policy::{AccessPolicy, Action, Ownership, Resource, ResourceKind, Verdict, VisibilityScope};
pub use repository::{StoreError, StoreResult};

use lodge_shared::BookingStatus;

/// Every core operation fails with exactly one of these kinds.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid booking transition from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => CoreError::NotFound(what),
            StoreError::Backend(msg) => CoreError::InternalError(msg),
        }
    }
}
