//! # Shared Bus - In-Memory Endpoint Transport
//!
//! Moves serialized transactions from a controller to the endpoint that will
//! execute them.
//!
//! ## Model
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Controller  │                    │   Endpoint   │
//! │              │    deliver()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Transport   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘    inbox.recv()
//! ```
//!
//! ## Liveness
//!
//! - Each endpoint owns exactly one `EndpointInbox`.
//! - Dropping the inbox, or calling `kill_endpoint`, makes the endpoint dead.
//! - Delivery to a dead endpoint fails with `TransportError::Unreachable`
//!   and delivers nothing.
//! - Frames to one endpoint arrive in delivery order. Nothing is promised
//!   across endpoints.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod frame;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use frame::Frame;
pub use publisher::{FramePublisher, InMemoryTransport};
pub use subscriber::{EndpointInbox, InboxError};

/// Default number of frames buffered per endpoint before backpressure.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;
