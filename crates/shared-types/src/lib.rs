//! # Shared Types Crate
//!
//! Opaque remote references and transport errors used on both sides of a
//! transaction channel.
//!
//! ## Design Principles
//!
//! - **Opaque Handles**: `EndpointHandle` and `ScopeToken` are capability-like
//!   references. They carry no behaviour of their own; liveness is answered by
//!   the transport that issued them.
//! - **Fixed Wire Width**: Every handle is exactly 16 bytes on the wire.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
