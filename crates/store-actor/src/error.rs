//! # Store Errors
//!
//! This module defines the common error types used throughout the store layer.
//! By centralizing error definitions, we ensure consistent error handling across
//! all store actors and clients.

use chrono::{DateTime, Utc};

/// Errors that can occur within the store layer itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Conditional write failed: document last written at {actual}, caller expected {expected}")]
    Superseded {
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },
    #[error("Document error: {0}")]
    DocumentError(Box<dyn std::error::Error + Send + Sync>),
}
