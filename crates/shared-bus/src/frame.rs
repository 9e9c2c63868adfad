//! # Frames
//!
//! The unit the transport moves: one serialized transaction body addressed
//! at one endpoint.

use shared_types::EndpointHandle;

/// A serialized transaction in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Endpoint the frame was delivered to.
    pub target: EndpointHandle,
    /// Opaque serialized body.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame for `target`.
    #[must_use]
    pub fn new(target: EndpointHandle, payload: Vec<u8>) -> Self {
        Self { target, payload }
    }

    /// Size of the body in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
