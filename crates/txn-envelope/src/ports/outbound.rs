//! Outbound (Driven) ports.
//!
//! The sending side needs exactly one thing from the outside world: a way to
//! move a serialized body to an endpoint.

use async_trait::async_trait;
use shared_types::{EndpointHandle, TransportError};

/// Channel that delivers serialized transactions (Driven Port)
///
/// A successful `send` means the endpoint's inbox holds the body. A failed
/// `send` means nothing was delivered. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `body` to `target`.
    async fn send(&self, target: EndpointHandle, body: Vec<u8>) -> Result<(), TransportError>;

    /// Returns true if `target` can currently accept transactions.
    ///
    /// Advisory only: the endpoint may die between this check and `send`.
    fn is_reachable(&self, target: EndpointHandle) -> bool;
}

/// Mock transport for testing.
#[cfg(test)]
pub struct MockTransport {
    dead: std::collections::HashSet<EndpointHandle>,
    sent: std::sync::Mutex<Vec<(EndpointHandle, Vec<u8>)>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            dead: std::collections::HashSet::new(),
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_dead(mut self, target: EndpointHandle) -> Self {
        self.dead.insert(target);
        self
    }

    pub fn sent(&self) -> Vec<(EndpointHandle, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, target: EndpointHandle, body: Vec<u8>) -> Result<(), TransportError> {
        if self.dead.contains(&target) {
            return Err(TransportError::Unreachable { target });
        }
        self.sent.lock().unwrap().push((target, body));
        Ok(())
    }

    fn is_reachable(&self, target: EndpointHandle) -> bool {
        !self.dead.contains(&target)
    }
}
