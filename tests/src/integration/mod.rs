//! # Integration Tests
//!
//! Controller and endpoint wired together over the in-memory bus.

pub mod fixtures;
pub mod flows;
