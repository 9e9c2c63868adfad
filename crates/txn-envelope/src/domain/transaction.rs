//! # Client Transaction
//!
//! The envelope: an ordered sequence of items, an optional final-state
//! request, the endpoint that will run them, and an optional scope token.
//!
//! ## Ordering
//!
//! Both passes visit every item in insertion order and only then the
//! final-state request. The whole prepare pass completes before the execute
//! pass starts, so the last thing applied is always the terminal state.
//!
//! ## Failure Policy
//!
//! Fail-fast. The first unit whose `prepare` or `execute` returns an error
//! ends the pass; later items and the final state are not visited. Nothing is
//! rolled back.

use crate::codec::{ItemRegistry, WireReader, WireWriter};
use crate::config::{EnvelopeConfig, Limits};
use crate::domain::item::{FinalStateRequest, TargetState, TransactionItem};
use crate::domain::lifecycle::{Building, ItemPosition, LifecycleState, Phase, Prepared, Scheduled};
use crate::error::{
    BuildError, DecodeError, EncodeError, ScheduleError, ScheduleFailure, TransactionError,
};
use crate::ports::Transport;
use shared_types::{EndpointHandle, ScopeToken};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace, warn};

/// Boxed ordinary item.
pub type BoxedItem<H> = Box<dyn TransactionItem<H>>;

/// Boxed final-state request.
pub type BoxedFinalState<H> = Box<dyn FinalStateRequest<H>>;

/// A batch of items bound for one endpoint.
///
/// `S` is the lifecycle state (see [`lifecycle`](crate::domain::lifecycle)).
pub struct ClientTransaction<H: ?Sized, S = Building> {
    /// `None` until the first item is added. Preserved as-is on the wire.
    items: Option<Vec<BoxedItem<H>>>,
    final_state: Option<BoxedFinalState<H>>,
    target: EndpointHandle,
    scope: Option<ScopeToken>,
    limits: Limits,
    _state: PhantomData<S>,
}

/// What `schedule` handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReceipt {
    pub target: EndpointHandle,
    pub bytes: usize,
    pub item_count: usize,
    pub final_state: Option<TargetState>,
}

/// Outcome of a completed execute pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub target: EndpointHandle,
    pub scope: Option<ScopeToken>,
    pub items_executed: usize,
    pub final_state: Option<TargetState>,
}

// =============================================================================
// ACCESSORS (every state)
// =============================================================================

impl<H: ?Sized, S> ClientTransaction<H, S> {
    /// Endpoint that will execute the transaction.
    #[must_use]
    pub fn target(&self) -> EndpointHandle {
        self.target
    }

    /// Scope the transaction is narrowed to, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&ScopeToken> {
        self.scope.as_ref()
    }

    /// Ordinary items; `None` if no item was ever added.
    #[must_use]
    pub fn items(&self) -> Option<&[BoxedItem<H>]> {
        self.items.as_deref()
    }

    /// Number of ordinary items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    /// The final-state request, if set.
    #[must_use]
    pub fn final_state(&self) -> Option<&dyn FinalStateRequest<H>> {
        self.final_state.as_deref()
    }

    /// Returns true if there is nothing to prepare or execute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0 && self.final_state.is_none()
    }

    /// Serialize the transaction body.
    ///
    /// Encoding never changes the transaction, so it is available in every
    /// state (a receiver may forward what it decoded).
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = WireWriter::new();

        writer.put_handle(self.target.as_bytes());

        writer.put_flag(self.scope.is_some());
        if let Some(scope) = &self.scope {
            writer.put_handle(scope.as_bytes());
        }

        match &self.final_state {
            Some(request) => {
                writer.put_tag(request.tag())?;
                writer.put_payload(&request.encode_payload()?)?;
            }
            None => writer.put_absent_tag(),
        }

        writer.put_flag(self.items.is_some());
        if let Some(items) = &self.items {
            // add_item keeps the count under max_items, which fits in u32
            let count = u32::try_from(items.len()).map_err(|_| EncodeError::EnvelopeTooLarge {
                size: items.len(),
                max: u32::MAX as usize,
            })?;
            writer.put_u32(count);
            for item in items {
                writer.put_tag(item.tag())?;
                writer.put_payload(&item.encode_payload()?)?;
            }
        }

        writer.finish(self.limits.max_envelope_bytes)
    }

    fn transition<T>(self) -> ClientTransaction<H, T> {
        ClientTransaction {
            items: self.items,
            final_state: self.final_state,
            target: self.target,
            scope: self.scope,
            limits: self.limits,
            _state: PhantomData,
        }
    }

    /// Visit every unit in order, stopping at the first failure.
    fn run_pass(&self, phase: Phase, handler: &mut H) -> Result<(), TransactionError> {
        let scope = self.scope.as_ref();

        for (index, item) in self.items.iter().flatten().enumerate() {
            trace!(target_endpoint = %self.target, %phase, index, tag = item.tag(), "Visiting item");
            let result = match phase {
                Phase::Prepare => item.prepare(handler, scope),
                Phase::Execute => item.execute(handler, scope),
            };
            result.map_err(|source| TransactionError::ItemFailed {
                phase,
                position: ItemPosition::Item(index),
                tag: item.tag(),
                source,
            })?;
        }

        if let Some(request) = &self.final_state {
            trace!(target_endpoint = %self.target, %phase, tag = request.tag(), "Visiting final state");
            let result = match phase {
                Phase::Prepare => request.prepare(handler, scope),
                Phase::Execute => request.execute(handler, scope),
            };
            result.map_err(|source| TransactionError::ItemFailed {
                phase,
                position: ItemPosition::FinalState,
                tag: request.tag(),
                source,
            })?;
        }

        Ok(())
    }
}

// =============================================================================
// BUILDING STATE (controller side)
// =============================================================================

impl<H: ?Sized> ClientTransaction<H, Building> {
    /// Start a transaction for `target`, optionally narrowed to `scope`.
    #[must_use]
    pub fn new(target: EndpointHandle, scope: Option<ScopeToken>) -> Self {
        Self::with_config(target, scope, &EnvelopeConfig::default())
    }

    /// Start a transaction that obeys `config`'s limits.
    #[must_use]
    pub fn with_config(
        target: EndpointHandle,
        scope: Option<ScopeToken>,
        config: &EnvelopeConfig,
    ) -> Self {
        Self {
            items: None,
            final_state: None,
            target,
            scope,
            limits: Limits::from(config),
            _state: PhantomData,
        }
    }

    /// Append an item to the end of the sequence.
    pub fn add_item<I>(&mut self, item: I) -> Result<(), BuildError>
    where
        I: TransactionItem<H> + 'static,
    {
        self.add_boxed_item(Box::new(item))
    }

    /// Append an already boxed item to the end of the sequence.
    pub fn add_boxed_item(&mut self, item: BoxedItem<H>) -> Result<(), BuildError> {
        let max = self.limits.max_items;
        if self.item_count() >= max {
            return Err(BuildError::TooManyItems { max });
        }
        self.items.get_or_insert_with(Vec::new).push(item);
        Ok(())
    }

    /// Set the final-state request, replacing any previous one.
    pub fn set_final_state<F>(&mut self, request: F)
    where
        F: FinalStateRequest<H> + 'static,
    {
        self.set_boxed_final_state(Box::new(request));
    }

    /// Set an already boxed final-state request, replacing any previous one.
    pub fn set_boxed_final_state(&mut self, request: BoxedFinalState<H>) {
        if let Some(previous) = self.final_state.replace(request) {
            debug!(target_endpoint = %self.target, replaced = previous.tag(), "Final state replaced");
        }
    }

    /// Serialize the transaction and hand it to `transport`.
    ///
    /// Consumes the transaction: once handed over it can no longer change.
    /// On failure nothing was delivered and the transaction comes back
    /// unchanged inside the error. No retry is attempted.
    pub async fn schedule<T>(self, transport: &T) -> Result<ScheduleReceipt, ScheduleError<H>>
    where
        T: Transport + ?Sized,
    {
        let body = match self.encode() {
            Ok(body) => body,
            Err(e) => {
                warn!(target_endpoint = %self.target, error = %e, "Failed to encode transaction");
                return Err(ScheduleError::new(ScheduleFailure::Encode(e), self));
            }
        };

        let receipt = ScheduleReceipt {
            target: self.target,
            bytes: body.len(),
            item_count: self.item_count(),
            final_state: self.final_state.as_ref().map(|r| r.target_state()),
        };

        match transport.send(self.target, body).await {
            Ok(()) => {
                debug!(
                    target_endpoint = %receipt.target,
                    items = receipt.item_count,
                    bytes = receipt.bytes,
                    "Transaction scheduled"
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!(target_endpoint = %self.target, error = %e, "Failed to schedule transaction");
                Err(ScheduleError::new(ScheduleFailure::Transport(e), self))
            }
        }
    }
}

/// Smallest encoded item: tag length, one tag byte, payload length.
const MIN_ITEM_WIRE_LEN: usize = 2 + 1 + 4;

// =============================================================================
// SCHEDULED STATE (receiver side)
// =============================================================================

impl<H: ?Sized> ClientTransaction<H, Scheduled> {
    /// Reconstruct a transaction from its serialized body.
    ///
    /// Every item and final-state tag must be registered in `registry`.
    pub fn decode(bytes: &[u8], registry: &ItemRegistry<H>) -> Result<Self, DecodeError> {
        let limits = registry.limits();
        if bytes.len() > limits.max_envelope_bytes {
            return Err(DecodeError::LengthLimit {
                len: bytes.len(),
                max: limits.max_envelope_bytes,
            });
        }

        let mut reader = WireReader::new(bytes);

        let target = EndpointHandle::from_bytes(reader.get_handle()?);

        let scope = if reader.get_flag()? {
            Some(ScopeToken::from_bytes(reader.get_handle()?))
        } else {
            None
        };

        let final_state = match reader.get_tag()? {
            Some(tag) => {
                let payload = reader.get_payload(limits.max_envelope_bytes)?;
                Some(registry.decode_final_state(tag, payload)?)
            }
            None => None,
        };

        let items = if reader.get_flag()? {
            let count = reader.get_u32()? as usize;
            if count > limits.max_items {
                return Err(DecodeError::TooManyItems {
                    count,
                    max: limits.max_items,
                });
            }
            // The declared count is untrusted; only reserve what the body can hold
            let mut items = Vec::with_capacity(count.min(reader.remaining() / MIN_ITEM_WIRE_LEN));
            for _ in 0..count {
                let tag = reader.get_tag()?.ok_or(DecodeError::InvalidTag {
                    offset: reader.position(),
                })?;
                let payload = reader.get_payload(limits.max_envelope_bytes)?;
                items.push(registry.decode_item(tag, payload)?);
            }
            Some(items)
        } else {
            None
        };

        reader.finish()?;

        Ok(Self {
            items,
            final_state,
            target,
            scope,
            limits,
            _state: PhantomData,
        })
    }

    /// Run the prepare pass: every item in order, then the final state.
    pub fn prepare(self, handler: &mut H) -> Result<ClientTransaction<H, Prepared>, TransactionError> {
        self.run_pass(Phase::Prepare, handler)?;
        debug!(target_endpoint = %self.target, items = self.item_count(), "Transaction prepared");
        Ok(self.transition())
    }
}

// =============================================================================
// PREPARED STATE (receiver side)
// =============================================================================

impl<H: ?Sized> ClientTransaction<H, Prepared> {
    /// Run the execute pass: every item in order, then the final state.
    ///
    /// Consumes the transaction; the report is all that remains.
    pub fn execute(self, handler: &mut H) -> Result<ExecutionReport, TransactionError> {
        self.run_pass(Phase::Execute, handler)?;

        let report = ExecutionReport {
            target: self.target,
            scope: self.scope,
            items_executed: self.item_count(),
            final_state: self.final_state.as_ref().map(|r| r.target_state()),
        };
        debug!(
            target_endpoint = %report.target,
            items = report.items_executed,
            final_state = ?report.final_state,
            "Transaction executed"
        );
        Ok(report)
    }
}

impl<H: ?Sized, S: LifecycleState> fmt::Debug for ClientTransaction<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientTransaction")
            .field("state", &S::NAME)
            .field("target", &self.target)
            .field("scope", &self.scope)
            .field("final_state", &self.final_state)
            .field("items", &self.items)
            .finish()
    }
}
