use gravity_core::constants::{materialized_view_name, TRACKED_TABLES};

/// Base tables. Every statement is idempotent.
pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS nodes (
        public_key          TEXT PRIMARY KEY NOT NULL,
        address             TEXT NOT NULL DEFAULT '',
        name                TEXT NOT NULL DEFAULT '',
        description         TEXT NOT NULL DEFAULT '',
        score               INTEGER NOT NULL DEFAULT 0,
        deposit_chain       TEXT NOT NULL DEFAULT '',
        deposit_amount      INTEGER NOT NULL DEFAULT 0,
        joined_at           INTEGER NOT NULL DEFAULT 0,
        locked_until        INTEGER NOT NULL DEFAULT 0,
        avatar_url          TEXT NOT NULL DEFAULT '',
        website             TEXT NOT NULL DEFAULT '',
        voting_power        INTEGER NOT NULL DEFAULT 0,
        latest_block_height INTEGER NOT NULL DEFAULT 0,
        catching_up         BOOLEAN NOT NULL DEFAULT 0,
        updated_at          INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS nodes_address_idx ON nodes (address)",
    "CREATE TABLE IF NOT EXISTS nebulas (
        address          TEXT PRIMARY KEY NOT NULL,
        name             TEXT NOT NULL DEFAULT '',
        status           INTEGER NOT NULL DEFAULT 0,
        score            INTEGER NOT NULL DEFAULT 0,
        description      TEXT NOT NULL DEFAULT '',
        subscription_fee INTEGER NOT NULL DEFAULT 0,
        nodes_using      INTEGER NOT NULL DEFAULT 0,
        regularity       INTEGER NOT NULL DEFAULT 0,
        extractor_type   TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS datafeeds (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL DEFAULT '',
        description   TEXT NOT NULL DEFAULT '',
        datafeed_type TEXT NOT NULL DEFAULT '',
        tags          TEXT NOT NULL DEFAULT '',
        source_url    TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS common_stats (
        id              INTEGER PRIMARY KEY NOT NULL,
        nodes_count     INTEGER NOT NULL DEFAULT 0,
        nebulas_count   INTEGER NOT NULL DEFAULT 0,
        datafeeds_count INTEGER NOT NULL DEFAULT 0,
        total_rewards   INTEGER NOT NULL DEFAULT 0,
        updated_at      INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS node_ip_map (
        public_key TEXT PRIMARY KEY NOT NULL,
        ip_address TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS node_rewards (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        public_key     TEXT NOT NULL,
        nebula_address TEXT NOT NULL DEFAULT '',
        amount         INTEGER NOT NULL DEFAULT 0,
        paid_at        INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS node_rewards_key_idx ON node_rewards (public_key)",
    "CREATE TABLE IF NOT EXISTS node_actions (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        public_key  TEXT NOT NULL,
        action      TEXT NOT NULL DEFAULT '',
        message     TEXT NOT NULL DEFAULT '',
        occurred_at INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS node_actions_key_idx ON node_actions (public_key)",
];

/// SQLite has no materialized views: each view is a snapshot table with the
/// base table's columns, rebuilt on refresh.
pub fn create_view_statements() -> Vec<String> {
    TRACKED_TABLES
        .iter()
        .map(|table| {
            format!(
                "CREATE TABLE IF NOT EXISTS {} AS SELECT * FROM {table} WHERE 0",
                materialized_view_name(table)
            )
        })
        .collect()
}

/// Statements rebuilding one view, run inside a single transaction.
pub fn refresh_view_statements(table: &str) -> [String; 2] {
    let view = materialized_view_name(table);
    [
        format!("DELETE FROM {view}"),
        format!("INSERT INTO {view} SELECT * FROM {table}"),
    ]
}
