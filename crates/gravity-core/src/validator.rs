use serde::{Deserialize, Serialize};

// ── Ledger /status ───────────────────────────────────────────────────────────

/// Snapshot returned by the ledger node's `/status` endpoint.
///
/// Only used as reconciliation input; never persisted as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorStatus {
    #[serde(default)]
    pub node_info: NodeInfo,
    #[serde(default)]
    pub sync_info: SyncInfo,
    pub validator_info: ValidatorInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub listen_addr: String,
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
}

/// Heights arrive as decimal strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncInfo {
    #[serde(default)]
    pub latest_block_hash: String,
    #[serde(default)]
    pub latest_block_height: String,
    #[serde(default)]
    pub latest_block_time: String,
    #[serde(default)]
    pub catching_up: bool,
}

impl SyncInfo {
    pub fn height(&self) -> i64 {
        self.latest_block_height.parse().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorInfo {
    #[serde(default)]
    pub address: String,
    pub pub_key: PubKey,
    #[serde(default)]
    pub voting_power: String,
}

impl ValidatorInfo {
    pub fn voting_power(&self) -> i64 {
        self.voting_power.parse().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PubKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    pub value: String,
}

impl ValidatorStatus {
    /// Key the node row is reconciled under.
    pub fn public_key(&self) -> &str {
        &self.validator_info.pub_key.value
    }
}

// ── Ledger abci_query "validatorDetails" ─────────────────────────────────────

/// Operator-supplied profile of a validator, stored on the ledger as a JSON
/// document inside an ABCI query response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub joined_at: i64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub website: String,
}
