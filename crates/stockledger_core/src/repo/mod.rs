//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the append/scan contract of the ledger store.
//! - Keep SQLite query details out of service and projection code.
//!
//! # Invariants
//! - Writes only accept validated `ObservationDraft` values.
//! - Reads reject invalid persisted rows instead of masking them.

pub mod ledger_repo;
