//! Inbound Ports (Driving Ports)
//!
//! The API an endpoint exposes to whatever feeds it serialized transactions.

use crate::domain::ExecutionReport;
use crate::error::DispatchError;

/// Receiving-side entry point (Driving Port)
///
/// Implementations decode `body`, run the prepare pass and then the execute
/// pass against their handler. A failure affects only this transaction.
pub trait TransactionApi {
    /// Decode and apply one serialized transaction.
    fn dispatch(&mut self, body: &[u8]) -> Result<ExecutionReport, DispatchError>;
}
