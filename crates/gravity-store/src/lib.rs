//! gravity-store
//!
//! Persistence gateway over the relational store. Owns every persisted
//! entity: nodes, nebulas, datafeeds, the node IP map, rewards, action
//! history and the common-stats singleton, plus the materialized-view
//! snapshots of the tracked tables.

pub mod db;
pub mod schema;

pub use db::StoreDb;
