//! # Type-State Lifecycle
//!
//! Each lifecycle state of a transaction is a distinct type parameter on
//! `ClientTransaction`. Transitions consume `self` and return the next
//! state, so a transaction cannot be prepared twice, executed before it is
//! prepared, or edited after it was scheduled:
//!
//! ```text
//!  sender                         │ receiver
//!                                 │
//! [Building] ──schedule──→ bytes ─┼─→ decode ──→ [Scheduled]
//!     ↑                           │                  │
//!     └──── ScheduleError ────────┤               prepare
//!                                 │                  ↓
//!                                 │              [Prepared] ──execute──→ ExecutionReport
//! ```
//!
//! `Executed → Done` is the drop of the report.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STATE MARKERS (Zero-Sized Types)
// =============================================================================

/// Marker: the controller is still adding items.
#[derive(Debug, Clone, Copy)]
pub struct Building;

/// Marker: reconstructed on the receiver, waiting for `prepare`.
#[derive(Debug, Clone, Copy)]
pub struct Scheduled;

/// Marker: every unit has been prepared, waiting for `execute`.
#[derive(Debug, Clone, Copy)]
pub struct Prepared;

/// Name of a lifecycle state, for logs.
pub trait LifecycleState {
    const NAME: &'static str;
}

impl LifecycleState for Building {
    const NAME: &'static str = "building";
}

impl LifecycleState for Scheduled {
    const NAME: &'static str = "scheduled";
}

impl LifecycleState for Prepared {
    const NAME: &'static str = "prepared";
}

// =============================================================================
// TRAVERSAL
// =============================================================================

/// One of the two protocol passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Prepare,
    Execute,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Prepare => f.write_str("prepare"),
            Phase::Execute => f.write_str("execute"),
        }
    }
}

/// Where a unit sits in the traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemPosition {
    /// Ordinary item at this insertion index.
    Item(usize),
    /// The final-state request, always visited last.
    FinalState,
}

impl fmt::Display for ItemPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemPosition::Item(index) => write!(f, "item #{index}"),
            ItemPosition::FinalState => f.write_str("final state"),
        }
    }
}
