//! Bus Transport Adapter
//!
//! Implements the [`Transport`] port on top of a shared-bus
//! [`FramePublisher`]. One transaction body travels as one frame.

use crate::metrics::Metrics;
use crate::ports::Transport;
use async_trait::async_trait;
use shared_bus::FramePublisher;
use shared_types::{EndpointHandle, TransportError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends serialized transactions over the shared bus.
pub struct BusTransportAdapter {
    /// Reference to the bus
    bus: Arc<dyn FramePublisher>,
    /// Send counters
    metrics: Arc<Metrics>,
}

impl BusTransportAdapter {
    /// Create a new adapter with its own metrics.
    pub fn new(bus: Arc<dyn FramePublisher>) -> Self {
        Self {
            bus,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Share a metrics collector with other adapters.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Counters recorded by this adapter.
    #[must_use]
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

#[async_trait]
impl Transport for BusTransportAdapter {
    async fn send(&self, target: EndpointHandle, body: Vec<u8>) -> Result<(), TransportError> {
        let bytes = body.len();
        match self.bus.deliver(target, body).await {
            Ok(()) => {
                self.metrics.record_scheduled(bytes);
                debug!(target_endpoint = %target, bytes, "Frame handed to bus");
                Ok(())
            }
            Err(e) => {
                self.metrics.record_schedule_failure();
                warn!(target_endpoint = %target, error = %e, "Bus refused frame");
                Err(e)
            }
        }
    }

    fn is_reachable(&self, target: EndpointHandle) -> bool {
        self.bus.is_alive(target)
    }
}
