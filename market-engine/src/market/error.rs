//! Engine error taxonomy
//!
//! Every failure is raised at the point of violation; a failed stock
//! reservation or transition is never downgraded into a partial success.
//! The surrounding surface (UI, API handler) turns these into
//! human-readable messages and decides whether to retry
//! [`EngineError::TransactionConflict`].

use super::storage::StoreError;
use crate::pricing::PricingError;
use shared::models::OrderStatus;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Local precondition failure, raised before any I/O
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested quantity exceeds available listing stock
    #[error("Insufficient stock: only {available} available, requested {requested}")]
    InsufficientStock { available: f64, requested: f64 },

    /// Target status is not reachable from the current status
    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Actor lacks the role/ownership required for the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The atomic write lost a race and bounded retries were exhausted
    #[error("Transaction conflict: please try again")]
    TransactionConflict,

    /// Referenced document does not exist
    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<PricingError> for EngineError {
    fn from(err: PricingError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

impl EngineError {
    /// Whether this error is a retriable version conflict
    pub(crate) fn is_conflict(&self) -> bool {
        matches!(
            self,
            EngineError::Storage(StoreError::VersionConflict { .. })
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
