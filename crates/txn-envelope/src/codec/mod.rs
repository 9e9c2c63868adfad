//! Wire codec
//!
//! Field layout of a serialized transaction body, in order:
//!
//! | # | Field | Encoding |
//! |---|-------|----------|
//! | 1 | target | 16 raw bytes |
//! | 2 | scope present | 1 byte, `0` or `1` |
//! | 3 | scope | 16 raw bytes, only if present |
//! | 4 | final state | tag (`u16` len + UTF-8, len `0` = absent), then payload (`u32` len + bytes) |
//! | 5 | items present | 1 byte, `0` or `1` |
//! | 6 | items | `u32` count, then per item: tag + payload, only if present |
//!
//! Integers are little-endian. Payloads are bincode.

pub mod registry;
pub mod wire;

pub use registry::ItemRegistry;
pub use wire::{WireReader, WireWriter};

use crate::error::{DecodeError, EncodeError};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn payload_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

pub(crate) fn encode_payload<T: Serialize>(tag: &'static str, value: &T) -> Result<Vec<u8>, EncodeError> {
    payload_options()
        .serialize(value)
        .map_err(|e| EncodeError::Payload {
            tag,
            reason: e.to_string(),
        })
}

pub(crate) fn decode_payload<T: DeserializeOwned>(tag: &str, bytes: &[u8]) -> Result<T, DecodeError> {
    payload_options()
        .deserialize(bytes)
        .map_err(|e| DecodeError::Payload {
            tag: tag.to_string(),
            reason: e.to_string(),
        })
}
