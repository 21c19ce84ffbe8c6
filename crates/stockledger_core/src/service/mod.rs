//! Core use-case services.
//!
//! # Responsibility
//! - Expose the ledger's external operations to CLI and other callers.
//! - Keep callers decoupled from storage details.

pub mod stock_service;
