//! # Transaction Envelope Test Suite
//!
//! Unified test crate for flows that cross crate boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Controller → bus → dispatcher → handler
//!     ├── fixtures.rs   # Activity host, items, registry
//!     └── flows.rs      # End-to-end scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p txn-tests
//!
//! # By category
//! cargo test -p txn-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
