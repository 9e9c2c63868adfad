//! Domain layer: items, the transaction envelope and its lifecycle.
//!
//! Pure logic, no I/O. Scheduling reaches the outside world only through the
//! [`Transport`](crate::ports::Transport) port.

pub mod item;
pub mod lifecycle;
pub mod transaction;

pub use item::{FinalStateRequest, ItemCodec, TargetState, TransactionItem, WireItem};
pub use lifecycle::{Building, ItemPosition, LifecycleState, Phase, Prepared, Scheduled};
pub use transaction::{
    BoxedFinalState, BoxedItem, ClientTransaction, ExecutionReport, ScheduleReceipt,
};
