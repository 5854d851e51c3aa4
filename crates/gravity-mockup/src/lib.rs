//! gravity-mockup
//!
//! Fills a `StoreDb` with synthetic network data for demos and local
//! development: nebulas, nodes with IP mappings, reward and action history,
//! and datafeed definitions. Generation is deterministic for a given seed.
//!
//! Seeding runs either inline (`seed_mockup`) or as a one-shot background
//! task (`spawn_seeding`) whose handle can be awaited for the report.

pub mod params;

pub use params::MockupParams;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use gravity_core::error::GravityError;
use gravity_core::model::{Extractor, Nebula, Node, NodeAction, NodeIPMapRecord, NodeReward};
use gravity_store::StoreDb;

const PAIRS: [&str; 8] = [
    "ETH/USD", "BTC/USD", "WAVES/USD", "SOL/USD", "ATOM/USD", "DOT/USD", "LINK/USD", "XTZ/USD",
];
const CHAINS: [&str; 3] = ["Ethereum", "Waves", "Binance"];
const EXTRACTOR_TYPES: [&str; 3] = ["price", "weather", "event"];
const ACTIONS: [&str; 4] = ["joined", "deposit", "vote", "heartbeat"];

/// What a mockup fill wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub nebulas: usize,
    pub nodes: usize,
    pub node_ips: usize,
    pub rewards: usize,
    pub actions: usize,
    pub datafeeds: usize,
    /// Rows the store rejected (logged individually).
    pub failed: usize,
    pub views_refreshed: usize,
}

/// Generated rows, before they touch the store.
#[derive(Debug, Clone, Default)]
pub struct Mockup {
    pub nebulas: Vec<Nebula>,
    pub nodes: Vec<Node>,
    pub node_ips: Vec<NodeIPMapRecord>,
    pub rewards: Vec<NodeReward>,
    pub actions: Vec<NodeAction>,
    pub datafeeds: Vec<Extractor>,
}

fn hex_key(rng: &mut StdRng) -> String {
    format!("{:032x}{:032x}", rng.gen::<u128>(), rng.gen::<u128>())
}

fn address(rng: &mut StdRng) -> String {
    format!("0x{:040x}", rng.gen::<u128>())
}

/// Build the full mockup data set for `params`.
pub fn generate(params: &MockupParams, now: i64) -> Mockup {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut mockup = Mockup::default();

    for i in 0..params.nebulas {
        let pair = PAIRS[i % PAIRS.len()];
        mockup.nebulas.push(Nebula {
            address: address(&mut rng),
            name: format!("{pair} #{i}"),
            status: rng.gen_range(0..3),
            score: rng.gen_range(0..=100),
            description: format!("{pair} price oracle"),
            subscription_fee: rng.gen_range(1..=50) * 1_000,
            nodes_using: rng.gen_range(3..=params.nodes.max(3) as i64),
            regularity: rng.gen_range(1..=60),
            extractor_type: EXTRACTOR_TYPES[i % EXTRACTOR_TYPES.len()].to_string(),
        });
    }

    for i in 0..params.nodes {
        let public_key = hex_key(&mut rng);
        let joined_at = now - rng.gen_range(86_400..86_400 * 365);
        mockup.nodes.push(Node {
            public_key: public_key.clone(),
            address: address(&mut rng),
            name: format!("Node #{i}"),
            description: format!("Mockup validator {i}"),
            score: rng.gen_range(0..=100),
            deposit_chain: CHAINS.choose(&mut rng).copied().unwrap_or_default().to_string(),
            deposit_amount: rng.gen_range(1..=100) * 10_000,
            joined_at,
            locked_until: joined_at + 86_400 * rng.gen_range(30..365),
            voting_power: rng.gen_range(1..=100),
            updated_at: now,
            ..Default::default()
        });
        mockup.node_ips.push(NodeIPMapRecord {
            public_key: public_key.clone(),
            ip_address: format!(
                "10.{}.{}.{}",
                rng.gen_range(0..=255u8),
                rng.gen_range(0..=255u8),
                rng.gen_range(1..=254u8)
            ),
        });

        for e in 0..params.events_per_node {
            let at = joined_at + (e as i64 + 1) * 3_600;
            if let Some(nebula) = mockup.nebulas.choose(&mut rng) {
                mockup.rewards.push(NodeReward {
                    public_key: public_key.clone(),
                    nebula_address: nebula.address.clone(),
                    amount: rng.gen_range(1..=1_000),
                    paid_at: at,
                    ..Default::default()
                });
            }
            let action = ACTIONS[e % ACTIONS.len()];
            mockup.actions.push(NodeAction {
                public_key: public_key.clone(),
                action: action.to_string(),
                message: format!("{action} at height {}", rng.gen_range(1..1_000_000)),
                occurred_at: at,
                ..Default::default()
            });
        }
    }

    for i in 0..params.datafeeds {
        let kind = EXTRACTOR_TYPES[i % EXTRACTOR_TYPES.len()];
        let pair = PAIRS[i % PAIRS.len()];
        mockup.datafeeds.push(Extractor {
            name: format!("{kind}-feed-{i}"),
            description: format!("{pair} {kind} extractor"),
            datafeed_type: kind.to_string(),
            tags: format!("{kind},{}", pair.to_lowercase()),
            source_url: format!("https://feeds.example.org/{kind}/{i}"),
            ..Default::default()
        });
    }

    mockup
}

/// Count a write, logging it when the store rejects the row.
fn tally<T>(what: &str, ok: &mut usize, failed: &mut usize, result: Result<T, GravityError>) {
    match result {
        Ok(_) => *ok += 1,
        Err(e) => {
            warn!(what, error = %e, "mockup insert failed");
            *failed += 1;
        }
    }
}

/// Write a generated mockup into `db`, then refresh stats and views.
/// Individual row failures are logged and counted, not fatal.
pub async fn seed_mockup(db: &StoreDb, params: &MockupParams) -> SeedReport {
    info!(
        nebulas = params.nebulas,
        nodes = params.nodes,
        datafeeds = params.datafeeds,
        "mockup: seeding store"
    );
    let mockup = generate(params, chrono::Utc::now().timestamp());
    let mut report = SeedReport::default();

    for nebula in &mockup.nebulas {
        let r = db.insert_nebula(nebula).await;
        tally("nebula", &mut report.nebulas, &mut report.failed, r);
    }
    for node in &mockup.nodes {
        let r = db.insert_node(node).await;
        tally("node", &mut report.nodes, &mut report.failed, r);
    }
    for record in &mockup.node_ips {
        let r = db.insert_node_ip(record).await;
        tally("node_ip", &mut report.node_ips, &mut report.failed, r);
    }
    for reward in &mockup.rewards {
        let r = db.insert_node_reward(reward).await;
        tally("node_reward", &mut report.rewards, &mut report.failed, r);
    }
    for action in &mockup.actions {
        let r = db.insert_node_action(action).await;
        tally("node_action", &mut report.actions, &mut report.failed, r);
    }
    for feed in &mockup.datafeeds {
        let r = db.insert_datafeed(feed).await;
        tally("datafeed", &mut report.datafeeds, &mut report.failed, r);
    }

    if let Err(e) = db.refresh_common_stats().await {
        warn!(error = %e, "mockup: common stats refresh failed");
    }
    report.views_refreshed = db.refresh_materialized_views().await;

    info!(
        nodes = report.nodes,
        nebulas = report.nebulas,
        datafeeds = report.datafeeds,
        failed = report.failed,
        "mockup: seeding complete"
    );
    report
}

/// Handle to a background seeding task. Await it for the report, or drop it
/// and let the task finish on its own.
pub struct SeedHandle {
    inner: JoinHandle<SeedReport>,
}

impl SeedHandle {
    pub async fn wait(self) -> Result<SeedReport, GravityError> {
        self.inner
            .await
            .map_err(|e| GravityError::Other(format!("seeding task failed: {e}")))
    }
}

/// Run `seed_mockup` once on the tokio runtime.
pub fn spawn_seeding(db: Arc<StoreDb>, params: MockupParams) -> SeedHandle {
    let inner = tokio::spawn(async move { seed_mockup(&db, &params).await });
    SeedHandle { inner }
}
