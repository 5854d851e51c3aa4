//! gravity-node library half: the ledger → store sync loop, shared by the
//! binary and its tests.

pub mod sync;
