//! # Error Types
//!
//! Errors raised while handing a serialized transaction to a remote endpoint.

use crate::entities::EndpointHandle;
use thiserror::Error;

/// Errors a transport reports when it cannot accept a transaction.
///
/// A transport error always means that no bytes reached the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint is dead or was never registered.
    #[error("Endpoint unreachable: {target}")]
    Unreachable { target: EndpointHandle },

    /// The endpoint is alive but its inbox is full.
    #[error("Endpoint {target} inbox full")]
    Backpressure { target: EndpointHandle },

    /// The transport itself has shut down.
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    /// Returns true if the endpoint can no longer accept transactions.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Unreachable { .. } | TransportError::Closed)
    }
}
