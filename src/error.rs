//! Error types for Cheemera.
//!
//! All errors are strongly typed using thiserror. Reasoning-service
//! failures are `TransportError`s; the session layer absorbs them rather
//! than propagating them past the tab that issued the query.

use thiserror::Error;

/// Validation errors raised while accepting external input.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Belief id '{belief_unique_id}' appears more than once in belief set '{belief_set}'")]
    DuplicateBeliefId {
        belief_set: String,
        belief_unique_id: String,
    },

    #[error("Belief set listing contains '{file_name}' more than once")]
    DuplicateFileName {
        file_name: String,
    },

    #[error("Invalid belief set listing: {message}")]
    InvalidListing {
        message: String,
    },

    #[error("Invalid service url '{url}': {reason}")]
    InvalidServiceUrl {
        url: String,
        reason: String,
    },
}

/// Failures talking to the reasoning service (directly or through the proxy).
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Reasoning service unreachable: {message}")]
    Unreachable {
        message: String,
    },

    #[error("Reasoning service request timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Reasoning service rejected the request with status {status}")]
    Rejected {
        status: u16,
    },

    #[error("Malformed explore result: {message}")]
    MalformedResponse {
        message: String,
    },

    #[error("Failed to serialize explore request: {message}")]
    SerializationFailed {
        message: String,
    },
}

/// Failures handing a query to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Every queue slot is taken.
    #[error("Query queue is full (capacity: {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The workers are gone.
    #[error("Query dispatcher has shut down")]
    Disconnected,
}

/// Top-level error type for Cheemera.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheemeraError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl CheemeraError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if this is a dispatch error.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if repeating the same request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Transport(e) => e.is_retryable(),
            Self::Dispatch(e) => matches!(e, DispatchError::QueueFull { .. }),
        }
    }
}

impl TransportError {
    /// Returns true if repeating the same request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::Rejected { status } => *status >= 500,
            Self::MalformedResponse { .. } | Self::SerializationFailed { .. } => false,
        }
    }

    /// HTTP status reported by the service, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Cheemera operations.
pub type CheemeraResult<T> = Result<T, CheemeraError>;
