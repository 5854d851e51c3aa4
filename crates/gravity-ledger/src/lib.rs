//! gravity-ledger
//!
//! HTTP client for the ledger (consensus) node a Gravity validator runs next
//! to. Two reads are supported:
//!   GET {endpoint}/status                               — validator status
//!   GET {endpoint}/abci_query?path="validatorDetails"   — validator details
//!
//! The details document is double-encoded: the ABCI response carries it as a
//! base64 byte string which is parsed as JSON a second time.

pub mod client;
pub mod envelope;

pub use client::{LedgerClient, LedgerConfig};
