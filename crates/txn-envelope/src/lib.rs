//! # Transaction Envelope
//!
//! Batches ordered, serializable items together with one privileged
//! final-state request, ships the batch to a remote endpoint, and applies it
//! there in two passes: every unit is prepared, then every unit is executed.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `ClientTransaction`: The envelope, with a type-state lifecycle
//!   - `TransactionItem` / `FinalStateRequest`: The two-step item contract
//!   - `WireItem`: Tag + serde, the serialization half of an item kind
//!
//! - **Codec Layer** (`codec/`): Wire format
//!   - `WireWriter` / `WireReader`: Bounds-checked field encoding
//!   - `ItemRegistry`: Tag-to-decoder tables
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `TransactionApi`: Driving port (receiving side)
//!   - `Transport`: Driven port (sending side)
//!
//! - **Adapters Layer** (`adapters/`): Shared-bus connections
//!   - `BusTransportAdapter`: `Transport` over a `FramePublisher`
//!   - `TransactionDispatcher`: Drains an endpoint inbox
//!
//! ## Ordering
//!
//! - Items run in insertion order, the final-state request always last
//! - The whole prepare pass completes before the execute pass begins
//! - Nothing is promised across separate transactions
//!
//! ## Usage Example
//!
//! ```ignore
//! use txn_envelope::{BusTransportAdapter, ClientTransaction};
//! use shared_bus::InMemoryTransport;
//! use std::sync::Arc;
//!
//! let bus = Arc::new(InMemoryTransport::new());
//! let (endpoint, inbox) = bus.register_endpoint();
//! let transport = BusTransportAdapter::new(bus.clone());
//!
//! let mut txn = ClientTransaction::<dyn ActivityHandler>::new(endpoint, None);
//! txn.add_item(ConfigurationChanged { density: 2 })?;
//! txn.set_final_state(ResumeRequest);
//!
//! match txn.schedule(&transport).await {
//!     Ok(receipt) => println!("sent {} bytes", receipt.bytes),
//!     Err(e) => {
//!         // Nothing was delivered; the transaction comes back intact
//!         let txn = e.into_transaction();
//!     }
//! }
//!
//! // Receiving side
//! let dispatcher = TransactionDispatcher::new(registry, Box::new(activity));
//! tokio::spawn(dispatcher.run(inbox));
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;

// Re-export main types
pub use adapters::{BusTransportAdapter, TransactionDispatcher};
pub use codec::{ItemRegistry, WireReader, WireWriter};
pub use config::{EnvelopeConfig, EnvelopeConfigBuilder, DEFAULT_MAX_ENVELOPE_BYTES, DEFAULT_MAX_ITEMS};
pub use domain::{
    BoxedFinalState, BoxedItem, Building, ClientTransaction, ExecutionReport, FinalStateRequest,
    ItemCodec, ItemPosition, LifecycleState, Phase, Prepared, ScheduleReceipt, Scheduled,
    TargetState, TransactionItem, WireItem,
};
pub use error::{
    BuildError, ConfigError, DecodeError, DispatchError, EncodeError, ItemError, RegistryError,
    ScheduleError, ScheduleFailure, TagKind, TransactionError,
};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{TransactionApi, Transport};

// Handles used throughout the public API
pub use shared_types::{EndpointHandle, ScopeToken, TransportError};
