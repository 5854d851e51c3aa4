/// ─── Gravity Node API Constants ─────────────────────────────────────────────
///
/// Table names, the materialized-view naming rule and the ledger query paths.

// ── Tables ───────────────────────────────────────────────────────────────────

pub const NODES_TABLE: &str = "nodes";
pub const NEBULAS_TABLE: &str = "nebulas";
pub const DATAFEEDS_TABLE: &str = "datafeeds";
pub const COMMON_STATS_TABLE: &str = "common_stats";
pub const NODE_IP_MAP_TABLE: &str = "node_ip_map";
pub const NODE_REWARDS_TABLE: &str = "node_rewards";
pub const NODE_ACTIONS_TABLE: &str = "node_actions";

/// Tables that carry a `<table>_materialized_view` snapshot.
pub const TRACKED_TABLES: [&str; 5] = [
    NODES_TABLE,
    NEBULAS_TABLE,
    DATAFEEDS_TABLE,
    COMMON_STATS_TABLE,
    NODE_IP_MAP_TABLE,
];

pub const MATERIALIZED_VIEW_POSTFIX: &str = "_materialized_view";

/// `nodes` → `nodes_materialized_view`.
pub fn materialized_view_name(table: &str) -> String {
    format!("{table}{MATERIALIZED_VIEW_POSTFIX}")
}

/// Primary key of the single `common_stats` row.
pub const COMMON_STATS_ROW_ID: i64 = 1;

// ── Ledger ───────────────────────────────────────────────────────────────────

pub const LEDGER_STATUS_PATH: &str = "status";

/// ABCI query path for the validator details document. The quotes are part
/// of the query string the ledger expects.
pub const LEDGER_VALIDATOR_DETAILS_PATH: &str = "abci_query?path=\"validatorDetails\"";

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_API_PORT: u16 = 8090;
pub const DEFAULT_MOCKUP_DATAFEEDS: usize = 250;
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
