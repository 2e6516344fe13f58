//! Ledger CSV Module
//!
//! Handles persistence of the application ledger, including:
//! - Header layout detection (legacy and canonical schemas)
//! - Atomic whole-file rewrites
//! - Single-write appends
//! - Raw text access for the dashboard mirror

mod store;

pub use store::{Ledger, LedgerStore};
