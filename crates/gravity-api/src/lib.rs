//! gravity-api
//!
//! Read-only HTTP/JSON front end over the Gravity store.
//!
//! Routes (all GET):
//!   /hello                       — echo request headers
//!   /nebulas/all                 — every nebula
//!   /nebulas/exact?address=      — one nebula or null
//!   /nodes/all                   — every node, IP joined in
//!   /nodes/exact?address=        — one node by address or null
//!   /nodes/key?public_key=       — one node by public key or null
//!   /nodes/ips                   — public key → IP map
//!   /nodes/rewards?public_key=   — rewards, optionally for one node
//!   /nodes/history?public_key=   — action history, optionally for one node
//!   /datafeeds/all               — every datafeed
//!   /stats/common                — network-wide counters
//!
//! Reads never fail the request: a store error is logged and answered with
//! 200, the empty value, and an `x-store-degraded: true` header.

pub mod routes;
pub mod server;
pub mod types;

pub use server::{ApiHandle, ApiServer, ApiState};
pub use routes::router;
pub use types::STORE_DEGRADED_HEADER;
