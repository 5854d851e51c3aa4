use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validator::{ValidatorDetails, ValidatorStatus};

/// Unix timestamp (seconds, UTC).
pub type Timestamp = i64;

// ── Node ─────────────────────────────────────────────────────────────────────

/// A validator node known to the network. Unique by `public_key`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Node {
    pub public_key: String,
    pub address: String,
    pub name: String,
    pub description: String,
    pub score: i64,
    pub deposit_chain: String,
    pub deposit_amount: i64,
    pub joined_at: Timestamp,
    pub locked_until: Timestamp,
    pub avatar_url: String,
    pub website: String,
    pub voting_power: i64,
    pub latest_block_height: i64,
    pub catching_up: bool,
    pub updated_at: Timestamp,
    /// Joined from `node_ip_map`; absent when the node has no mapping.
    #[sqlx(default)]
    pub ip_address: Option<String>,
}

impl Node {
    /// Build the ledger-sourced part of a node record. Fields the ledger does
    /// not report (score, deposit, lock) are left at zero.
    pub fn from_validator(
        public_key: &str,
        details: &ValidatorDetails,
        status: &ValidatorStatus,
        now: Timestamp,
    ) -> Self {
        Self {
            public_key: public_key.to_string(),
            address: status.validator_info.address.clone(),
            name: details.name.clone(),
            description: details.description.clone(),
            joined_at: details.joined_at,
            avatar_url: details.avatar_url.clone(),
            website: details.website.clone(),
            voting_power: status.validator_info.voting_power(),
            latest_block_height: status.sync_info.height(),
            catching_up: status.sync_info.catching_up,
            updated_at: now,
            ..Default::default()
        }
    }
}

// ── Nebula ───────────────────────────────────────────────────────────────────

/// An oracle / data-source registration, keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Nebula {
    pub address: String,
    pub name: String,
    pub status: i64,
    pub score: i64,
    pub description: String,
    pub subscription_fee: i64,
    pub nodes_using: i64,
    pub regularity: i64,
    pub extractor_type: String,
}

// ── Datafeed ─────────────────────────────────────────────────────────────────

/// A datafeed definition (extractor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Extractor {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub datafeed_type: String,
    pub tags: String,
    pub source_url: String,
}

// ── Stats ────────────────────────────────────────────────────────────────────

/// Network-wide aggregate counters. One row; zero-valued when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CommonStats {
    pub nodes_count: i64,
    pub nebulas_count: i64,
    pub datafeeds_count: i64,
    pub total_rewards: i64,
    pub updated_at: Timestamp,
}

// ── IP map / rewards / history ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NodeIPMapRecord {
    pub public_key: String,
    pub ip_address: String,
}

/// A reward paid to a node for serving a nebula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NodeReward {
    pub id: i64,
    pub public_key: String,
    pub nebula_address: String,
    pub amount: i64,
    pub paid_at: Timestamp,
}

/// One entry in a node's action history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NodeAction {
    pub id: i64,
    pub public_key: String,
    pub action: String,
    pub message: String,
    pub occurred_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{PubKey, SyncInfo, ValidatorInfo};

    #[test]
    fn node_from_validator_maps_fields() {
        let details = ValidatorDetails {
            name: "alpha".into(),
            description: "first validator".into(),
            joined_at: 1_600_000_000,
            avatar_url: "https://example.org/a.png".into(),
            website: "https://example.org".into(),
        };
        let status = ValidatorStatus {
            sync_info: SyncInfo {
                latest_block_height: "77".into(),
                catching_up: true,
                ..Default::default()
            },
            validator_info: ValidatorInfo {
                address: "addr1".into(),
                pub_key: PubKey { key_type: String::new(), value: "pk1".into() },
                voting_power: "5".into(),
            },
            ..Default::default()
        };

        let node = Node::from_validator("pk1", &details, &status, 42);
        assert_eq!(node.public_key, "pk1");
        assert_eq!(node.address, "addr1");
        assert_eq!(node.name, "alpha");
        assert_eq!(node.joined_at, 1_600_000_000);
        assert_eq!(node.voting_power, 5);
        assert_eq!(node.latest_block_height, 77);
        assert!(node.catching_up);
        assert_eq!(node.updated_at, 42);
        assert_eq!(node.score, 0);
        assert!(node.ip_address.is_none());
    }
}
