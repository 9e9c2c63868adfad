//! Metrics for transaction scheduling and dispatch
//!
//! ## Usage
//!
//! ```ignore
//! use txn_envelope::metrics::Metrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let transport = BusTransportAdapter::new(bus).with_metrics(metrics.clone());
//! let dispatcher = TransactionDispatcher::new(registry, handler).with_metrics(metrics.clone());
//!
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for both sides of the channel.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Bodies accepted by the transport
    pub envelopes_scheduled: AtomicU64,
    /// Bodies the transport refused
    pub schedule_failures: AtomicU64,
    /// Bodies decoded on the receiving side
    pub envelopes_decoded: AtomicU64,
    /// Bodies that failed to decode
    pub decode_failures: AtomicU64,
    /// Units prepared (items and final states)
    pub items_prepared: AtomicU64,
    /// Units executed (items and final states)
    pub items_executed: AtomicU64,
    /// Passes aborted by an item failure
    pub item_failures: AtomicU64,
    /// Total bytes handed to the transport
    pub bytes_scheduled: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful send of `bytes`
    pub fn record_scheduled(&self, bytes: usize) {
        self.envelopes_scheduled.fetch_add(1, Ordering::Relaxed);
        self.bytes_scheduled.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Record a refused send
    pub fn record_schedule_failure(&self) {
        self.schedule_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decode attempt
    pub fn record_decode(&self, ok: bool) {
        if ok {
            self.envelopes_decoded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.decode_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a completed prepare pass over `units` units
    pub fn record_prepared(&self, units: usize) {
        self.items_prepared.fetch_add(units as u64, Ordering::Relaxed);
    }

    /// Record a completed execute pass over `units` units
    pub fn record_executed(&self, units: usize) {
        self.items_executed.fetch_add(units as u64, Ordering::Relaxed);
    }

    /// Record a transaction aborted by an item failure
    pub fn record_item_failure(&self) {
        self.item_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            envelopes_scheduled: self.envelopes_scheduled.load(Ordering::Relaxed),
            schedule_failures: self.schedule_failures.load(Ordering::Relaxed),
            envelopes_decoded: self.envelopes_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            items_prepared: self.items_prepared.load(Ordering::Relaxed),
            items_executed: self.items_executed.load(Ordering::Relaxed),
            item_failures: self.item_failures.load(Ordering::Relaxed),
            bytes_scheduled: self.bytes_scheduled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`Metrics`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub envelopes_scheduled: u64,
    pub schedule_failures: u64,
    pub envelopes_decoded: u64,
    pub decode_failures: u64,
    pub items_prepared: u64,
    pub items_executed: u64,
    pub item_failures: u64,
    pub bytes_scheduled: u64,
}
