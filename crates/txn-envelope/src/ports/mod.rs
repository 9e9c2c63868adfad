//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API the receiving side exposes
//! - Driven Ports (outbound) - the transport the sending side depends on

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionApi;
pub use outbound::Transport;
