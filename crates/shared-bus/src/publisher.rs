//! # Frame Publisher
//!
//! Defines the sending side of the transport.

use crate::frame::Frame;
use crate::subscriber::EndpointInbox;
use crate::DEFAULT_INBOX_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{EndpointHandle, TransportError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Trait for delivering frames to endpoints.
///
/// A successful delivery means the frame sits in the endpoint's inbox. A
/// failed delivery means the endpoint saw nothing.
#[async_trait]
pub trait FramePublisher: Send + Sync {
    /// Deliver `payload` to `target`, waiting for inbox capacity if needed.
    async fn deliver(&self, target: EndpointHandle, payload: Vec<u8>)
        -> Result<(), TransportError>;

    /// Returns true if `target` can currently accept frames.
    fn is_alive(&self, target: EndpointHandle) -> bool;
}

/// In-memory implementation of the transport.
///
/// Each endpoint is backed by a bounded `tokio::sync::mpsc` channel, which
/// keeps per-endpoint delivery order.
pub struct InMemoryTransport {
    /// Live endpoints and their inbox senders.
    endpoints: RwLock<HashMap<EndpointHandle, mpsc::Sender<Frame>>>,

    /// Frames accepted by an inbox.
    frames_delivered: AtomicU64,

    /// Frames refused (dead endpoint, full inbox, closed transport).
    frames_rejected: AtomicU64,

    /// Set once `close` has been called.
    closed: AtomicBool,

    /// Per-endpoint inbox capacity.
    capacity: usize,
}

impl InMemoryTransport {
    /// Create a new transport with default inbox capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }

    /// Create a new transport with the given per-endpoint inbox capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            frames_delivered: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            capacity: capacity.max(1),
        }
    }

    /// Register a new endpoint and return its handle and inbox.
    pub fn register_endpoint(&self) -> (EndpointHandle, EndpointInbox) {
        let handle = EndpointHandle::generate();
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.endpoints.write().insert(handle, sender);

        info!(endpoint = %handle, capacity = self.capacity, "Endpoint registered");

        (handle, EndpointInbox::new(handle, receiver))
    }

    /// Mark an endpoint dead. Frames already queued stay in its inbox.
    ///
    /// Returns true if the endpoint was alive.
    pub fn kill_endpoint(&self, target: EndpointHandle) -> bool {
        let removed = self.endpoints.write().remove(&target).is_some();
        if removed {
            info!(endpoint = %target, "Endpoint killed");
        }
        removed
    }

    /// Shut the transport down. Every endpoint becomes unreachable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let dropped = {
            let mut endpoints = self.endpoints.write();
            let count = endpoints.len();
            endpoints.clear();
            count
        };
        info!(endpoints = dropped, "Transport closed");
    }

    /// Deliver without waiting. A full inbox fails with `Backpressure`.
    pub fn try_deliver(
        &self,
        target: EndpointHandle,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        let sender = self.sender_for(target)?;
        let bytes = payload.len();

        match sender.try_send(Frame::new(target, payload)) {
            Ok(()) => {
                self.record_delivered(target, bytes);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.frames_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(endpoint = %target, "Frame rejected (inbox full)");
                Err(TransportError::Backpressure { target })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(self.reap(target)),
        }
    }

    /// Number of live endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints
            .read()
            .values()
            .filter(|sender| !sender.is_closed())
            .count()
    }

    /// Total frames accepted by an inbox.
    #[must_use]
    pub fn frames_delivered(&self) -> u64 {
        self.frames_delivered.load(Ordering::Relaxed)
    }

    /// Total frames refused.
    #[must_use]
    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected.load(Ordering::Relaxed)
    }

    /// Per-endpoint inbox capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn sender_for(&self, target: EndpointHandle) -> Result<mpsc::Sender<Frame>, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            self.frames_rejected.fetch_add(1, Ordering::Relaxed);
            return Err(TransportError::Closed);
        }

        let sender = self.endpoints.read().get(&target).cloned();
        match sender {
            Some(sender) if !sender.is_closed() => Ok(sender),
            Some(_) => Err(self.reap(target)),
            None => {
                self.frames_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(endpoint = %target, "Frame rejected (unknown endpoint)");
                Err(TransportError::Unreachable { target })
            }
        }
    }

    /// Forget an endpoint whose inbox has been dropped.
    fn reap(&self, target: EndpointHandle) -> TransportError {
        self.endpoints.write().remove(&target);
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
        warn!(endpoint = %target, "Frame rejected (endpoint dead)");
        TransportError::Unreachable { target }
    }

    fn record_delivered(&self, target: EndpointHandle, bytes: usize) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
        debug!(endpoint = %target, bytes, "Frame delivered");
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FramePublisher for InMemoryTransport {
    async fn deliver(
        &self,
        target: EndpointHandle,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        let sender = self.sender_for(target)?;
        let bytes = payload.len();

        match sender.send(Frame::new(target, payload)).await {
            Ok(()) => {
                self.record_delivered(target, bytes);
                Ok(())
            }
            Err(_) => Err(self.reap(target)),
        }
    }

    fn is_alive(&self, target: EndpointHandle) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        self.endpoints
            .read()
            .get(&target)
            .is_some_and(|sender| !sender.is_closed())
    }
}
