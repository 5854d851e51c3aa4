use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, error, info};

use gravity_core::constants::{materialized_view_name, COMMON_STATS_ROW_ID, TRACKED_TABLES};
use gravity_core::error::GravityError;
use gravity_core::model::{
    CommonStats, Extractor, Nebula, Node, NodeAction, NodeIPMapRecord, NodeReward,
};
use gravity_core::validator::{ValidatorDetails, ValidatorStatus};

use crate::schema::{create_view_statements, refresh_view_statements, CREATE_TABLES};

/// Node rows always come back with the IP joined in from `node_ip_map`.
const SELECT_NODES: &str = "SELECT n.*, m.ip_address AS ip_address
    FROM nodes n
    LEFT JOIN node_ip_map m ON m.public_key = n.public_key";

/// Persistent store backed by SQLite through a sqlx pool.
///
/// Tables:
///   nodes         — public_key → validator profile + sync metadata
///   nebulas       — address    → oracle registration
///   datafeeds     — id         → extractor definition
///   common_stats  — id = 1     → network-wide counters
///   node_ip_map   — public_key → ip_address
///   node_rewards  — id         → reward paid to a node
///   node_actions  — id         → node action history entry
///
/// The pool is safe to share between request handlers; wrap the `StoreDb`
/// in an `Arc` and clone that.
pub struct StoreDb {
    pool: SqlitePool,
}

/// Log a failed read and fall back to the empty value. The `try_*`
/// variants exist for callers that need to tell the two apart.
fn or_logged<T: Default>(method: &str, result: Result<T, GravityError>) -> T {
    result.unwrap_or_else(|e| {
        error!(method, error = %e, "store read failed; returning empty result");
        T::default()
    })
}

impl StoreDb {
    /// Open (or create) the database at `url`, e.g. `sqlite://gravity.db`,
    /// and make sure the schema exists.
    pub async fn open(url: &str) -> Result<Self, GravityError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| GravityError::Config(format!("invalid database url {url}: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        info!(%url, "store opened");
        Ok(db)
    }

    /// A private in-memory database. Pinned to one connection that is never
    /// recycled, since each SQLite memory connection is its own database.
    pub async fn open_in_memory() -> Result<Self, GravityError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), GravityError> {
        for stmt in CREATE_TABLES {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        for stmt in create_view_statements() {
            sqlx::query(&stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ── Nodes ────────────────────────────────────────────────────────────────

    /// Insert or update the node keyed by `public_key` from ledger data in a
    /// single statement. Columns the ledger does not report (score, deposit,
    /// lock) keep their stored values on update.
    pub async fn upsert_node(
        &self,
        public_key: &str,
        details: &ValidatorDetails,
        status: &ValidatorStatus,
    ) -> Result<Node, GravityError> {
        let now = chrono::Utc::now().timestamp();
        let node = Node::from_validator(public_key, details, status, now);

        sqlx::query(
            "INSERT INTO nodes (
                public_key, address, name, description, score, deposit_chain,
                deposit_amount, joined_at, locked_until, avatar_url, website,
                voting_power, latest_block_height, catching_up, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(public_key) DO UPDATE SET
                address             = excluded.address,
                name                = excluded.name,
                description         = excluded.description,
                joined_at           = excluded.joined_at,
                avatar_url          = excluded.avatar_url,
                website             = excluded.website,
                voting_power        = excluded.voting_power,
                latest_block_height = excluded.latest_block_height,
                catching_up         = excluded.catching_up,
                updated_at          = excluded.updated_at",
        )
        .bind(&node.public_key)
        .bind(&node.address)
        .bind(&node.name)
        .bind(&node.description)
        .bind(node.score)
        .bind(&node.deposit_chain)
        .bind(node.deposit_amount)
        .bind(node.joined_at)
        .bind(node.locked_until)
        .bind(&node.avatar_url)
        .bind(&node.website)
        .bind(node.voting_power)
        .bind(node.latest_block_height)
        .bind(node.catching_up)
        .bind(node.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(public_key, "node upserted");

        self.find_node_by_public_key(public_key)
            .await?
            .ok_or_else(|| GravityError::NotFound(format!("node {public_key} after upsert")))
    }

    /// Plain insert; a duplicate public key is a store error.
    pub async fn insert_node(&self, node: &Node) -> Result<(), GravityError> {
        sqlx::query(
            "INSERT INTO nodes (
                public_key, address, name, description, score, deposit_chain,
                deposit_amount, joined_at, locked_until, avatar_url, website,
                voting_power, latest_block_height, catching_up, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&node.public_key)
        .bind(&node.address)
        .bind(&node.name)
        .bind(&node.description)
        .bind(node.score)
        .bind(&node.deposit_chain)
        .bind(node.deposit_amount)
        .bind(node.joined_at)
        .bind(node.locked_until)
        .bind(&node.avatar_url)
        .bind(&node.website)
        .bind(node.voting_power)
        .bind(node.latest_block_height)
        .bind(node.catching_up)
        .bind(node.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn try_list_nodes(&self) -> Result<Vec<Node>, GravityError> {
        let sql = format!("{SELECT_NODES} ORDER BY n.public_key");
        Ok(sqlx::query_as::<_, Node>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn list_nodes(&self) -> Vec<Node> {
        or_logged("list_nodes", self.try_list_nodes().await)
    }

    pub async fn find_node_by_public_key(
        &self,
        public_key: &str,
    ) -> Result<Option<Node>, GravityError> {
        let sql = format!("{SELECT_NODES} WHERE n.public_key = ?");
        Ok(sqlx::query_as::<_, Node>(&sql)
            .bind(public_key)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Several nodes may share an address; the first by public key wins.
    pub async fn find_node_by_address(&self, address: &str) -> Result<Option<Node>, GravityError> {
        let sql = format!("{SELECT_NODES} WHERE n.address = ? ORDER BY n.public_key LIMIT 1");
        Ok(sqlx::query_as::<_, Node>(&sql)
            .bind(address)
            .fetch_optional(&self.pool)
            .await?)
    }

    // ── Nebulas ──────────────────────────────────────────────────────────────

    pub async fn insert_nebula(&self, nebula: &Nebula) -> Result<(), GravityError> {
        sqlx::query(
            "INSERT INTO nebulas (
                address, name, status, score, description,
                subscription_fee, nodes_using, regularity, extractor_type
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&nebula.address)
        .bind(&nebula.name)
        .bind(nebula.status)
        .bind(nebula.score)
        .bind(&nebula.description)
        .bind(nebula.subscription_fee)
        .bind(nebula.nodes_using)
        .bind(nebula.regularity)
        .bind(&nebula.extractor_type)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn try_list_nebulas(&self) -> Result<Vec<Nebula>, GravityError> {
        Ok(sqlx::query_as::<_, Nebula>("SELECT * FROM nebulas ORDER BY address")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_nebulas(&self) -> Vec<Nebula> {
        or_logged("list_nebulas", self.try_list_nebulas().await)
    }

    pub async fn find_nebula_by_address(
        &self,
        address: &str,
    ) -> Result<Option<Nebula>, GravityError> {
        Ok(sqlx::query_as::<_, Nebula>("SELECT * FROM nebulas WHERE address = ?")
            .bind(address)
            .fetch_optional(&self.pool)
            .await?)
    }

    // ── Datafeeds ────────────────────────────────────────────────────────────

    /// Insert a datafeed; `id` is assigned by the store and returned.
    pub async fn insert_datafeed(&self, feed: &Extractor) -> Result<i64, GravityError> {
        let result = sqlx::query(
            "INSERT INTO datafeeds (name, description, datafeed_type, tags, source_url)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&feed.name)
        .bind(&feed.description)
        .bind(&feed.datafeed_type)
        .bind(&feed.tags)
        .bind(&feed.source_url)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn try_list_datafeeds(&self) -> Result<Vec<Extractor>, GravityError> {
        Ok(sqlx::query_as::<_, Extractor>("SELECT * FROM datafeeds ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn list_datafeeds(&self) -> Vec<Extractor> {
        or_logged("list_datafeeds", self.try_list_datafeeds().await)
    }

    // ── Node IP map ──────────────────────────────────────────────────────────

    /// Map a public key to an IP, replacing any previous mapping.
    pub async fn insert_node_ip(&self, record: &NodeIPMapRecord) -> Result<(), GravityError> {
        sqlx::query(
            "INSERT INTO node_ip_map (public_key, ip_address) VALUES (?, ?)
             ON CONFLICT(public_key) DO UPDATE SET ip_address = excluded.ip_address",
        )
        .bind(&record.public_key)
        .bind(&record.ip_address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn try_list_node_ips(&self) -> Result<Vec<NodeIPMapRecord>, GravityError> {
        Ok(
            sqlx::query_as::<_, NodeIPMapRecord>("SELECT * FROM node_ip_map ORDER BY public_key")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn list_node_ips(&self) -> Vec<NodeIPMapRecord> {
        or_logged("list_node_ips", self.try_list_node_ips().await)
    }

    // ── Rewards / action history ─────────────────────────────────────────────

    pub async fn insert_node_reward(&self, reward: &NodeReward) -> Result<i64, GravityError> {
        let result = sqlx::query(
            "INSERT INTO node_rewards (public_key, nebula_address, amount, paid_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&reward.public_key)
        .bind(&reward.nebula_address)
        .bind(reward.amount)
        .bind(reward.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All rewards, or only those paid to `public_key`.
    pub async fn try_list_node_rewards(
        &self,
        public_key: Option<&str>,
    ) -> Result<Vec<NodeReward>, GravityError> {
        Ok(sqlx::query_as::<_, NodeReward>(
            "SELECT * FROM node_rewards WHERE (?1 IS NULL OR public_key = ?1) ORDER BY id",
        )
        .bind(public_key)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_node_rewards(&self, public_key: Option<&str>) -> Vec<NodeReward> {
        or_logged("list_node_rewards", self.try_list_node_rewards(public_key).await)
    }

    pub async fn insert_node_action(&self, action: &NodeAction) -> Result<i64, GravityError> {
        let result = sqlx::query(
            "INSERT INTO node_actions (public_key, action, message, occurred_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&action.public_key)
        .bind(&action.action)
        .bind(&action.message)
        .bind(action.occurred_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Action history, newest first.
    pub async fn try_list_node_actions(
        &self,
        public_key: Option<&str>,
    ) -> Result<Vec<NodeAction>, GravityError> {
        Ok(sqlx::query_as::<_, NodeAction>(
            "SELECT * FROM node_actions WHERE (?1 IS NULL OR public_key = ?1)
             ORDER BY occurred_at DESC, id DESC",
        )
        .bind(public_key)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_node_actions(&self, public_key: Option<&str>) -> Vec<NodeAction> {
        or_logged("list_node_actions", self.try_list_node_actions(public_key).await)
    }

    // ── Common stats ─────────────────────────────────────────────────────────

    /// The stats row, zero-valued when it has never been written.
    pub async fn try_common_stats(&self) -> Result<CommonStats, GravityError> {
        let stats = sqlx::query_as::<_, CommonStats>("SELECT * FROM common_stats WHERE id = ?")
            .bind(COMMON_STATS_ROW_ID)
            .fetch_optional(&self.pool)
            .await?;
        Ok(stats.unwrap_or_default())
    }

    pub async fn common_stats(&self) -> CommonStats {
        or_logged("common_stats", self.try_common_stats().await)
    }

    /// Recompute the stats row from the current table contents.
    pub async fn refresh_common_stats(&self) -> Result<CommonStats, GravityError> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO common_stats (
                id, nodes_count, nebulas_count, datafeeds_count, total_rewards, updated_at
            ) VALUES (
                ?,
                (SELECT COUNT(*) FROM nodes),
                (SELECT COUNT(*) FROM nebulas),
                (SELECT COUNT(*) FROM datafeeds),
                (SELECT COALESCE(SUM(amount), 0) FROM node_rewards),
                ?
            )
            ON CONFLICT(id) DO UPDATE SET
                nodes_count     = excluded.nodes_count,
                nebulas_count   = excluded.nebulas_count,
                datafeeds_count = excluded.datafeeds_count,
                total_rewards   = excluded.total_rewards,
                updated_at      = excluded.updated_at",
        )
        .bind(COMMON_STATS_ROW_ID)
        .bind(now)
        .execute(&self.pool)
        .await?;
        self.try_common_stats().await
    }

    // ── Materialized views ───────────────────────────────────────────────────

    async fn refresh_view(&self, table: &str) -> Result<(), GravityError> {
        let mut tx = self.pool.begin().await?;
        for stmt in refresh_view_statements(table) {
            sqlx::query(&stmt).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Rebuild every tracked view. A failing view is logged and skipped;
    /// returns how many views were refreshed.
    pub async fn refresh_materialized_views(&self) -> usize {
        let mut refreshed = 0;
        for table in TRACKED_TABLES {
            match self.refresh_view(table).await {
                Ok(()) => refreshed += 1,
                Err(e) => error!(
                    view = %materialized_view_name(table),
                    error = %e,
                    "materialized view refresh failed"
                ),
            }
        }
        debug!(refreshed, "materialized views refreshed");
        refreshed
    }

    /// Row count of a tracked view.
    pub async fn view_row_count(&self, table: &str) -> Result<i64, GravityError> {
        if !TRACKED_TABLES.contains(&table) {
            return Err(GravityError::NotFound(format!("no view for table {table}")));
        }
        let sql = format!("SELECT COUNT(*) FROM {}", materialized_view_name(table));
        Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?)
    }
}
