//! # Endpoint Inbox
//!
//! Defines the receiving side of the transport.

use crate::frame::Frame;
use shared_types::EndpointHandle;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from inbox operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InboxError {
    /// Every sender is gone and the queue is drained.
    #[error("Inbox closed")]
    Closed,
}

/// The receiving end of one endpoint.
///
/// Dropping the inbox makes the endpoint dead: later deliveries fail.
pub struct EndpointInbox {
    /// Endpoint this inbox belongs to.
    handle: EndpointHandle,

    /// Queue of delivered frames.
    receiver: mpsc::Receiver<Frame>,
}

impl EndpointInbox {
    pub(crate) fn new(handle: EndpointHandle, receiver: mpsc::Receiver<Frame>) -> Self {
        Self { handle, receiver }
    }

    /// Handle of the endpoint this inbox serves.
    #[must_use]
    pub fn handle(&self) -> EndpointHandle {
        self.handle
    }

    /// Receive the next frame.
    ///
    /// # Returns
    ///
    /// - `Some(frame)` - The next delivered frame
    /// - `None` - The endpoint was killed (or the transport closed) and the
    ///   queue is drained
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Try to receive the next frame without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))` - A frame was available
    /// - `Ok(None)` - No frame available right now
    /// - `Err(InboxError::Closed)` - No frame will ever arrive
    pub fn try_recv(&mut self) -> Result<Option<Frame>, InboxError> {
        match self.receiver.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(InboxError::Closed),
        }
    }

    /// Stop accepting new frames. Already queued frames can still be read.
    pub fn close(&mut self) {
        debug!(endpoint = %self.handle, "Inbox closed by owner");
        self.receiver.close();
    }
}

impl Stream for EndpointInbox {
    type Item = Frame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for EndpointInbox {
    fn drop(&mut self) {
        debug!(endpoint = %self.handle, "Inbox dropped");
    }
}
