//! Domain model for stock observations.
//!
//! # Invariants
//! - An `Observation` is an absolute quantity snapshot, never a delta.
//! - Stored observations are immutable; the ledger only grows.

pub mod observation;
