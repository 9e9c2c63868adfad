//! # Item Registry
//!
//! Maps wire discriminants to decoders. The set of item kinds is open, but
//! the receiving side must know every kind it will ever decode: an unknown
//! tag is a hard decode error.
//!
//! ## Usage
//!
//! ```ignore
//! let mut registry = ItemRegistry::<dyn ActivityHandler>::new();
//! registry
//!     .register_item::<ConfigurationChanged>()?
//!     .register_item::<NewIntent>()?
//!     .register_final_state::<ResumeRequest>()?;
//!
//! let txn = ClientTransaction::decode(&bytes, &registry)?;
//! ```

use crate::codec::decode_payload;
use crate::config::{EnvelopeConfig, Limits};
use crate::domain::{FinalStateRequest, TransactionItem, WireItem};
use crate::error::{DecodeError, RegistryError, TagKind};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

type ItemDecoder<H> = fn(&[u8]) -> Result<Box<dyn TransactionItem<H>>, DecodeError>;
type FinalStateDecoder<H> = fn(&[u8]) -> Result<Box<dyn FinalStateRequest<H>>, DecodeError>;

fn decode_item_as<T, H>(payload: &[u8]) -> Result<Box<dyn TransactionItem<H>>, DecodeError>
where
    H: ?Sized,
    T: WireItem + TransactionItem<H>,
{
    let item: T = decode_payload(T::TAG, payload)?;
    Ok(Box::new(item))
}

fn decode_final_state_as<T, H>(payload: &[u8]) -> Result<Box<dyn FinalStateRequest<H>>, DecodeError>
where
    H: ?Sized,
    T: WireItem + FinalStateRequest<H>,
{
    let request: T = decode_payload(T::TAG, payload)?;
    Ok(Box::new(request))
}

/// Discriminant-to-decoder tables for items driven against handler `H`.
///
/// Items and final-state requests live in separate tables because they
/// occupy separate positions in the body.
pub struct ItemRegistry<H: ?Sized> {
    items: HashMap<&'static str, ItemDecoder<H>>,
    final_states: HashMap<&'static str, FinalStateDecoder<H>>,
    limits: Limits,
}

impl<H: ?Sized> ItemRegistry<H> {
    /// Create an empty registry with default decode limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&EnvelopeConfig::default())
    }

    /// Create an empty registry that decodes under `config`'s limits.
    #[must_use]
    pub fn with_config(config: &EnvelopeConfig) -> Self {
        Self {
            items: HashMap::new(),
            final_states: HashMap::new(),
            limits: Limits::from(config),
        }
    }

    /// Register an ordinary item kind.
    pub fn register_item<T>(&mut self) -> Result<&mut Self, RegistryError>
    where
        T: WireItem + TransactionItem<H>,
    {
        check_tag(T::TAG)?;
        if self.items.contains_key(T::TAG) {
            return Err(RegistryError::DuplicateTag {
                kind: TagKind::Item,
                tag: T::TAG,
            });
        }
        self.items.insert(T::TAG, decode_item_as::<T, H>);
        debug!(tag = T::TAG, "Item kind registered");
        Ok(self)
    }

    /// Register a final-state request kind.
    pub fn register_final_state<T>(&mut self) -> Result<&mut Self, RegistryError>
    where
        T: WireItem + FinalStateRequest<H>,
    {
        check_tag(T::TAG)?;
        if self.final_states.contains_key(T::TAG) {
            return Err(RegistryError::DuplicateTag {
                kind: TagKind::FinalState,
                tag: T::TAG,
            });
        }
        self.final_states.insert(T::TAG, decode_final_state_as::<T, H>);
        debug!(tag = T::TAG, "Final-state kind registered");
        Ok(self)
    }

    /// Returns true if `tag` names a registered item kind.
    #[must_use]
    pub fn has_item(&self, tag: &str) -> bool {
        self.items.contains_key(tag)
    }

    /// Returns true if `tag` names a registered final-state kind.
    #[must_use]
    pub fn has_final_state(&self, tag: &str) -> bool {
        self.final_states.contains_key(tag)
    }

    /// Total number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.final_states.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn limits(&self) -> Limits {
        self.limits
    }

    pub(crate) fn decode_item(
        &self,
        tag: &str,
        payload: &[u8],
    ) -> Result<Box<dyn TransactionItem<H>>, DecodeError> {
        let decoder = self.items.get(tag).ok_or_else(|| DecodeError::UnknownTag {
            kind: TagKind::Item,
            tag: tag.to_string(),
        })?;
        decoder(payload)
    }

    pub(crate) fn decode_final_state(
        &self,
        tag: &str,
        payload: &[u8],
    ) -> Result<Box<dyn FinalStateRequest<H>>, DecodeError> {
        let decoder = self
            .final_states
            .get(tag)
            .ok_or_else(|| DecodeError::UnknownTag {
                kind: TagKind::FinalState,
                tag: tag.to_string(),
            })?;
        decoder(payload)
    }
}

impl<H: ?Sized> Default for ItemRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for ItemRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<_> = self.items.keys().collect();
        let mut final_states: Vec<_> = self.final_states.keys().collect();
        items.sort();
        final_states.sort();
        f.debug_struct("ItemRegistry")
            .field("items", &items)
            .field("final_states", &final_states)
            .finish()
    }
}

fn check_tag(tag: &'static str) -> Result<(), RegistryError> {
    if tag.is_empty() {
        return Err(RegistryError::EmptyTag);
    }
    if tag.len() > u16::MAX as usize {
        return Err(RegistryError::TagTooLong { len: tag.len() });
    }
    Ok(())
}
