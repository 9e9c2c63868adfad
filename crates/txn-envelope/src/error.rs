//! Error types for the transaction envelope

use crate::domain::{Building, ClientTransaction, ItemPosition, Phase};
use shared_types::TransportError;
use std::fmt;
use thiserror::Error;

/// Failure raised by a single item's `prepare` or `execute`.
///
/// What an item does is up to its author; this type only carries the reason
/// back to whoever drove the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Handler rejected item: {0}")]
    Handler(String),
}

/// Errors from driving a transaction through prepare/execute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// An item failed; the rest of the pass was skipped.
    #[error("{phase} failed at {position} ({tag}): {source}")]
    ItemFailed {
        phase: Phase,
        position: ItemPosition,
        tag: &'static str,
        #[source]
        source: ItemError,
    },
}

/// Errors while building a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Too many items: limit is {max}")]
    TooManyItems { max: usize },
}

/// Errors while serializing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Failed to encode payload for {tag}: {reason}")]
    Payload { tag: &'static str, reason: String },

    #[error("Tag too long: {len} bytes")]
    TagTooLong { len: usize },

    #[error("Empty tag on a present item or final state")]
    EmptyTag,

    #[error("Envelope too large: {size} > {max} bytes")]
    EnvelopeTooLarge { size: usize, max: usize },
}

/// Errors while reconstructing a transaction from bytes.
///
/// A decode error only ever affects the transaction being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unexpected end of input at offset {offset}: needed {needed} more bytes")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("Invalid presence flag {value:#04x} at offset {offset}")]
    InvalidFlag { offset: usize, value: u8 },

    #[error("Tag at offset {offset} is not valid UTF-8")]
    InvalidTag { offset: usize },

    #[error("Unknown {kind} tag: {tag}")]
    UnknownTag { kind: TagKind, tag: String },

    #[error("Length {len} exceeds limit {max}")]
    LengthLimit { len: usize, max: usize },

    #[error("Too many items: {count} > {max}")]
    TooManyItems { count: usize, max: usize },

    #[error("{count} trailing bytes after envelope")]
    TrailingBytes { count: usize },

    #[error("Failed to decode payload for {tag}: {reason}")]
    Payload { tag: String, reason: String },
}

/// Which registry table a tag was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Item,
    FinalState,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Item => f.write_str("item"),
            TagKind::FinalState => f.write_str("final-state"),
        }
    }
}

/// Errors while registering item codecs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tag must not be empty")]
    EmptyTag,

    #[error("Tag too long: {len} bytes")]
    TagTooLong { len: usize },

    #[error("Duplicate {kind} tag: {tag}")]
    DuplicateTag { kind: TagKind, tag: &'static str },
}

/// Errors from configuration loading and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from dispatching a received envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

/// Why a schedule attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleFailure {
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// A failed `schedule`.
///
/// Nothing was delivered. The transaction is handed back untouched.
pub struct ScheduleError<H: ?Sized> {
    failure: ScheduleFailure,
    transaction: Box<ClientTransaction<H, Building>>,
}

impl<H: ?Sized> ScheduleError<H> {
    pub(crate) fn new(failure: ScheduleFailure, transaction: ClientTransaction<H, Building>) -> Self {
        Self {
            failure,
            transaction: Box::new(transaction),
        }
    }

    /// Why scheduling failed.
    #[must_use]
    pub fn failure(&self) -> &ScheduleFailure {
        &self.failure
    }

    /// The transport error, if the failure came from the transport.
    #[must_use]
    pub fn transport_error(&self) -> Option<&TransportError> {
        match &self.failure {
            ScheduleFailure::Transport(e) => Some(e),
            ScheduleFailure::Encode(_) => None,
        }
    }

    /// Borrow the transaction that failed to schedule.
    #[must_use]
    pub fn transaction(&self) -> &ClientTransaction<H, Building> {
        &self.transaction
    }

    /// Take the transaction back, e.g. to retry.
    #[must_use]
    pub fn into_transaction(self) -> ClientTransaction<H, Building> {
        *self.transaction
    }

    /// Split into the failure and the transaction.
    #[must_use]
    pub fn into_parts(self) -> (ScheduleFailure, ClientTransaction<H, Building>) {
        (self.failure, *self.transaction)
    }
}

impl<H: ?Sized> fmt::Debug for ScheduleError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleError")
            .field("failure", &self.failure)
            .field("target", &self.transaction.target())
            .finish()
    }
}

impl<H: ?Sized> fmt::Display for ScheduleError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to schedule transaction to {}: {}",
            self.transaction.target(),
            self.failure
        )
    }
}

impl<H: ?Sized> std::error::Error for ScheduleError<H> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}
