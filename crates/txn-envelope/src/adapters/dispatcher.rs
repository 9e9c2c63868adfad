//! Transaction Dispatcher
//!
//! The receiving end of the channel. Owns the handler the items act on and
//! the registry that turns tags back into items.
//!
//! Per received body:
//! 1. Decode against the registry
//! 2. Run the prepare pass
//! 3. Run the execute pass
//!
//! A failure at any step affects that body only. The run loop logs it and
//! moves on to the next frame.

use crate::codec::ItemRegistry;
use crate::domain::{ClientTransaction, ExecutionReport, Scheduled};
use crate::error::{DispatchError, TransactionError};
use crate::metrics::Metrics;
use crate::ports::TransactionApi;
use futures::StreamExt;
use shared_bus::EndpointInbox;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Decodes and applies transactions against handler `H`.
pub struct TransactionDispatcher<H: ?Sized + 'static> {
    registry: ItemRegistry<H>,
    handler: Box<H>,
    metrics: Arc<Metrics>,
}

impl<H: ?Sized + 'static> TransactionDispatcher<H> {
    /// Create a dispatcher with its own metrics.
    pub fn new(registry: ItemRegistry<H>, handler: Box<H>) -> Self {
        Self {
            registry,
            handler,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Share a metrics collector with other adapters.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The handler items act on.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Give the handler back, e.g. after the inbox closed.
    #[must_use]
    pub fn into_handler(self) -> Box<H> {
        self.handler
    }

    /// Counters recorded by this dispatcher.
    #[must_use]
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    fn record_failure(&self, error: &TransactionError) {
        self.metrics.record_item_failure();
        warn!(error = %error, "Transaction aborted");
    }

    /// Drain `inbox` until the endpoint dies, dispatching every frame in
    /// arrival order.
    ///
    /// This should be spawned as a background task. Returns the dispatcher
    /// so the caller can inspect the handler afterwards.
    pub async fn run(mut self, mut inbox: EndpointInbox) -> Self
    where
        H: Send,
    {
        let endpoint = inbox.handle();
        info!(%endpoint, "[TransactionDispatcher] Started listening for transactions");

        loop {
            match inbox.next().await {
                Some(frame) => {
                    if let Err(e) = self.dispatch(&frame.payload) {
                        error!(%endpoint, error = %e, "Error dispatching transaction");
                    }
                }
                None => {
                    warn!(%endpoint, "[TransactionDispatcher] Inbox closed, shutting down");
                    break;
                }
            }
        }

        self
    }
}

impl<H: ?Sized + 'static> TransactionApi for TransactionDispatcher<H> {
    fn dispatch(&mut self, body: &[u8]) -> Result<ExecutionReport, DispatchError> {
        let txn = match ClientTransaction::<H, Scheduled>::decode(body, &self.registry) {
            Ok(txn) => {
                self.metrics.record_decode(true);
                txn
            }
            Err(e) => {
                self.metrics.record_decode(false);
                return Err(e.into());
            }
        };

        let units = txn.item_count() + usize::from(txn.final_state().is_some());
        debug!(
            target_endpoint = %txn.target(),
            items = txn.item_count(),
            bytes = body.len(),
            "Transaction received"
        );

        let prepared = txn.prepare(&mut *self.handler).map_err(|e| {
            self.record_failure(&e);
            e
        })?;
        self.metrics.record_prepared(units);

        let report = prepared.execute(&mut *self.handler).map_err(|e| {
            self.record_failure(&e);
            e
        })?;
        self.metrics.record_executed(units);

        Ok(report)
    }
}
