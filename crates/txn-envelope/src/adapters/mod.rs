//! Adapters Layer
//!
//! Connects the domain to the shared bus.
//!
//! ## Adapters
//!
//! - `BusTransportAdapter` - Sending side: implements `Transport` over a `FramePublisher`
//! - `TransactionDispatcher` - Receiving side: drains an `EndpointInbox` and drives each transaction

pub mod bus_transport;
pub mod dispatcher;

pub use bus_transport::BusTransportAdapter;
pub use dispatcher::TransactionDispatcher;
