//! Error types for the Lot actor.

use store_actor::StoreError;
use thiserror::Error;

/// Errors that can occur during lot operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LotError {
    /// The requested lot was not found.
    #[error("Lot not found: {0}")]
    NotFound(String),

    /// A conditional write lost: the lot was modified after the stamp the
    /// caller based its write on.
    #[error("Lot was modified since the write this operation was based on")]
    Superseded,

    /// An error occurred while communicating with the store actor.
    #[error("Store communication error: {0}")]
    StoreCommunicationError(String),
}

impl From<StoreError> for LotError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => LotError::NotFound(id),
            StoreError::Superseded { .. } => LotError::Superseded,
            other => LotError::StoreCommunicationError(other.to_string()),
        }
    }
}
