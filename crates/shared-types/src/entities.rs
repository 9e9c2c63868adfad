//! # Remote References
//!
//! Opaque handles naming remote objects.
//!
//! - `EndpointHandle`: the destination process/object of a transaction.
//! - `ScopeToken`: a sub-object owned by an endpoint that a transaction is
//!   narrowed to.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Width of every handle on the wire, in bytes.
pub const HANDLE_LEN: usize = 16;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh, random handle.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Rebuild a handle from its wire bytes.
            #[must_use]
            pub fn from_bytes(bytes: [u8; HANDLE_LEN]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            /// The wire bytes of this handle.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; HANDLE_LEN] {
                self.0.as_bytes()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0.simple())
            }
        }
    };
}

opaque_handle!(
    /// Reference to the remote endpoint that executes a transaction.
    ///
    /// Required at transaction construction and never changes afterwards.
    EndpointHandle,
    "endpoint"
);

opaque_handle!(
    /// Optional reference narrowing a transaction to one object owned by
    /// the endpoint. When absent, the transaction targets the endpoint as a
    /// whole.
    ScopeToken,
    "scope"
);
