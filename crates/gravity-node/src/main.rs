//! gravity-node: the Gravity node API binary.
//!
//! Startup sequence:
//!   1. Open (or create) the store and its schema
//!   2. Optionally kick off a one-shot mockup fill (`--fill`)
//!   3. Optionally start the ledger sync loop (`--ledger-endpoint`)
//!   4. Serve the read-only HTTP API until interrupted

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use gravity_api::{ApiServer, ApiState};
use gravity_core::constants::{DEFAULT_API_PORT, DEFAULT_MOCKUP_DATAFEEDS, DEFAULT_SYNC_INTERVAL_SECS};
use gravity_ledger::{LedgerClient, LedgerConfig};
use gravity_mockup::{spawn_seeding, MockupParams};
use gravity_node::sync;
use gravity_store::StoreDb;

#[derive(Parser, Debug)]
#[command(
    name = "gravity-node",
    version,
    about = "Gravity node API: validator network metadata over HTTP"
)]
struct Args {
    /// HTTP listen port.
    #[arg(long, default_value_t = DEFAULT_API_PORT)]
    port: u16,

    /// HTTP listen address.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Anything other than "0" fills the store with mockup data at startup.
    #[arg(long, default_value = "0")]
    fill: String,

    /// Number of mockup datafeeds written by `--fill`.
    #[arg(long, default_value_t = DEFAULT_MOCKUP_DATAFEEDS)]
    datafeeds: usize,

    /// Store location.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://gravity.db")]
    database_url: String,

    /// Ledger node RPC base URL. Sync is disabled when unset.
    #[arg(long)]
    ledger_endpoint: Option<String>,

    /// Seconds between ledger sync rounds.
    #[arg(long, default_value_t = DEFAULT_SYNC_INTERVAL_SECS)]
    sync_interval_secs: u64,

    /// Per-request ledger timeout in seconds. Unset means wait indefinitely.
    #[arg(long)]
    ledger_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gravity=debug")),
        )
        .init();

    let args = Args::parse();
    info!("Gravity node API starting");

    // ── Store ─────────────────────────────────────────────────────────────────
    let db = Arc::new(
        StoreDb::open(&args.database_url)
            .await
            .with_context(|| format!("opening store at {}", args.database_url))?,
    );

    // ── Mockup fill ───────────────────────────────────────────────────────────
    if args.fill != "0" {
        let params = MockupParams {
            datafeeds: args.datafeeds,
            ..MockupParams::default()
        };
        let seeding = spawn_seeding(Arc::clone(&db), params);
        tokio::spawn(async move {
            match seeding.wait().await {
                Ok(report) => info!(
                    nodes = report.nodes,
                    nebulas = report.nebulas,
                    failed = report.failed,
                    "mockup fill finished"
                ),
                Err(e) => warn!(error = %e, "mockup fill did not finish"),
            }
        });
    }

    // ── Ledger sync ───────────────────────────────────────────────────────────
    if let Some(endpoint) = args.ledger_endpoint.clone() {
        anyhow::ensure!(args.sync_interval_secs > 0, "--sync-interval-secs must be positive");
        let ledger = LedgerClient::from_config(&LedgerConfig {
            endpoint,
            timeout: args.ledger_timeout_secs.map(Duration::from_secs),
        })
        .context("configuring ledger client")?;
        tokio::spawn(sync::run(
            ledger,
            Arc::clone(&db),
            Duration::from_secs(args.sync_interval_secs),
        ));
    } else {
        info!("no --ledger-endpoint given, ledger sync disabled");
    }

    // ── HTTP API ──────────────────────────────────────────────────────────────
    let addr = SocketAddr::new(args.host, args.port);
    let api = ApiServer::new(Arc::new(ApiState { db: Arc::clone(&db) }))
        .start(addr)
        .await
        .with_context(|| format!("starting API server on {addr}"))?;

    info!(addr = %api.local_addr, "node ready");
    tokio::select! {
        _ = api.stopped() => warn!("API server exited"),
        _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
    }

    db.close().await;
    Ok(())
}
