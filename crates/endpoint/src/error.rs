//! Error types for the endpoint crate.

use thiserror::Error;

use crate::types::RelationId;

/// Result type alias for endpoint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Endpoint error types.
///
/// Queries over possibly-absent relation state never error; these variants
/// cover wiring mistakes and the single-relation precondition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A second relation joined while one is already installed.
    #[error("relation conflict: {existing} already joined, refusing {incoming}")]
    RelationConflict {
        existing: RelationId,
        incoming: RelationId,
    },

    /// An endpoint name was registered twice on the same dispatcher.
    #[error("endpoint '{0}' is already registered")]
    EndpointAlreadyRegistered(String),

    /// An endpoint name failed validation.
    #[error("invalid endpoint name: {reason}")]
    InvalidEndpointName { reason: String },

    /// A flag watch channel closed while waiting on it.
    #[error("flag channel closed")]
    ChannelClosed,
}

impl Error {
    /// Create a relation conflict error.
    pub fn relation_conflict(existing: RelationId, incoming: RelationId) -> Self {
        Self::RelationConflict { existing, incoming }
    }

    /// Create an invalid endpoint name error.
    pub fn invalid_endpoint_name(reason: impl Into<String>) -> Self {
        Self::InvalidEndpointName {
            reason: reason.into(),
        }
    }
}
