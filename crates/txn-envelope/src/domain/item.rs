//! # Transaction Items
//!
//! An item is a stateless description of one operation the remote endpoint
//! should perform. The set of item kinds is open: any crate can add one by
//! implementing [`WireItem`] (tag + serde) and [`TransactionItem`] (the
//! two-step contract), then registering it with an
//! [`ItemRegistry`](crate::codec::ItemRegistry).
//!
//! ## Contract
//!
//! - `prepare` runs before anything becomes visible. It may resolve
//!   references or check preconditions, but must not apply the effect.
//! - `execute` applies the effect.
//!
//! All side effects go through the handler `H`, which is owned by the
//! receiving side. The scope token, when present, narrows the effect to one
//! object owned by the endpoint.

use crate::codec;
use crate::error::{EncodeError, ItemError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::ScopeToken;
use std::any::Any;
use std::fmt;

/// Serialization half of an item kind.
///
/// `TAG` is the discriminant written on the wire in front of the payload.
/// It must be unique among the kinds registered for the same position.
pub trait WireItem: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    const TAG: &'static str;
}

/// Object-safe view of a [`WireItem`].
///
/// Implemented for every `WireItem`; item authors never implement it by hand.
pub trait ItemCodec: fmt::Debug + Send + Sync {
    /// Wire discriminant of this item.
    fn tag(&self) -> &'static str;

    /// Serialize the item's payload (without its tag).
    fn encode_payload(&self) -> Result<Vec<u8>, EncodeError>;

    /// Access the concrete item, e.g. to compare decoded content.
    fn as_any(&self) -> &dyn Any;
}

impl<T: WireItem> ItemCodec for T {
    fn tag(&self) -> &'static str {
        T::TAG
    }

    fn encode_payload(&self) -> Result<Vec<u8>, EncodeError> {
        codec::encode_payload(T::TAG, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A single unit of deferred work driven against handler `H`.
pub trait TransactionItem<H: ?Sized>: ItemCodec {
    /// Work that must happen before any effect becomes visible.
    ///
    /// Defaults to nothing.
    fn prepare(&self, _handler: &mut H, _scope: Option<&ScopeToken>) -> Result<(), ItemError> {
        Ok(())
    }

    /// Apply the item's effect.
    fn execute(&self, handler: &mut H, scope: Option<&ScopeToken>) -> Result<(), ItemError>;
}

/// The privileged, always-last item: the state the endpoint must end up in.
pub trait FinalStateRequest<H: ?Sized>: TransactionItem<H> {
    /// The terminal state this request drives the endpoint into.
    fn target_state(&self) -> TargetState;
}

/// Opaque code naming a terminal state.
///
/// Its meaning belongs to the item author; the envelope only reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetState(pub u32);

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}
