//! End-to-end smoke test for gravity-node.
//!
//! Starts the real binary against a fresh SQLite file (and, where needed, a
//! throwaway ledger node served from the test), then checks the HTTP API.
//!
//! Run with:
//!   cargo test -p gravity-node --test smoke

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gravity_core::model::Node;
use gravity_store::StoreDb;

// ── Node lifecycle ────────────────────────────────────────────────────────────

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

/// Find a free TCP port on loopback.
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn fresh_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gravity_e2e_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn database_url(dir: &std::path::Path) -> String {
    format!("sqlite://{}", dir.join("gravity.db").display())
}

fn start_node(data_dir: PathBuf, port: u16, extra: &[&str]) -> NodeGuard {
    let db_url = database_url(&data_dir);
    let port = port.to_string();
    let mut args = vec![
        "--host", "127.0.0.1",
        "--port", port.as_str(),
        "--database-url", db_url.as_str(),
    ];
    args.extend_from_slice(extra);

    let child = Command::new(env!("CARGO_BIN_EXE_gravity-node"))
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn gravity-node");
    NodeGuard { child, data_dir }
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

async fn get_json(client: &reqwest::Client, url: &str) -> serde_json::Value {
    let resp = client
        .get(url)
        .send()
        .await
        .unwrap_or_else(|e| panic!("GET {url} failed: {e}"));
    assert!(resp.status().is_success(), "GET {url}: {}", resp.status());
    resp.json().await.expect("parse JSON body")
}

/// Poll until the API answers or the timeout elapses.
async fn wait_for_api(client: &reqwest::Client, base: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(resp) = client.get(format!("{base}/stats/common")).send().await {
            if resp.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    false
}

/// Poll `url` until `done` accepts the body or the timeout elapses.
async fn wait_for(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    done: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    let deadline = Instant::now() + timeout;
    loop {
        let body = get_json(client, url).await;
        if done(&body) || Instant::now() >= deadline {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

// ── Fake ledger ───────────────────────────────────────────────────────────────

async fn serve_ledger(public_key: &'static str) -> String {
    let status = format!(
        r#"{{"jsonrpc":"2.0","id":-1,"result":{{
            "node_info":{{"moniker":"ledger-0"}},
            "sync_info":{{"latest_block_height":"4242","catching_up":false}},
            "validator_info":{{"address":"LEDGERADDR","pub_key":{{"type":"tendermint/PubKeyEd25519","value":"{public_key}"}},"voting_power":"100"}}}}}}"#
    );
    let details = format!(
        r#"{{"jsonrpc":"2.0","id":-1,"result":{{"response":{{"code":0,"value":"{}"}}}}}}"#,
        BASE64.encode(r#"{"name":"ledger validator","description":"synced","joined_at":1600000000}"#)
    );
    let router = Router::new()
        .route("/status", get(move || {
            let body = status.clone();
            async move { body }
        }))
        .route("/abci_query", get(move || {
            let body = details.clone();
            async move { body }
        }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn smoke_empty_store_then_lookup() {
    let data_dir = fresh_dir("lookup");
    let db_url = database_url(&data_dir);
    let port = free_port();
    let base = format!("http://127.0.0.1:{port}");
    let _guard = start_node(data_dir, port, &[]);

    let http = reqwest::Client::new();
    assert!(
        wait_for_api(&http, &base, Duration::from_secs(20)).await,
        "API did not come up"
    );

    // ── Empty store ───────────────────────────────────────────────────────────
    let resp = http.get(format!("{base}/nodes/all")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "[]");

    // ── One node written behind the API's back ────────────────────────────────
    let db = StoreDb::open(&db_url).await.unwrap();
    db.insert_node(&Node {
        public_key: "pk1".into(),
        address: "addr1".into(),
        ..Default::default()
    })
    .await
    .unwrap();
    db.close().await;

    let found = get_json(&http, &format!("{base}/nodes/key?public_key=pk1")).await;
    assert_eq!(found["public_key"], "pk1");
    assert_eq!(found["address"], "addr1");

    let absent = get_json(&http, &format!("{base}/nodes/key?public_key=pk2")).await;
    assert!(absent.is_null());

    let all = get_json(&http, &format!("{base}/nodes/all")).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn smoke_ledger_sync_populates_node() {
    let ledger_url = serve_ledger("pk-ledger").await;
    let data_dir = fresh_dir("sync");
    let port = free_port();
    let base = format!("http://127.0.0.1:{port}");
    let _guard = start_node(
        data_dir,
        port,
        &["--ledger-endpoint", ledger_url.as_str(), "--sync-interval-secs", "1"],
    );

    let http = reqwest::Client::new();
    assert!(wait_for_api(&http, &base, Duration::from_secs(20)).await);

    let node = wait_for(
        &http,
        &format!("{base}/nodes/key?public_key=pk-ledger"),
        Duration::from_secs(20),
        |body| !body.is_null(),
    )
    .await;
    assert_eq!(node["name"], "ledger validator");
    assert_eq!(node["address"], "LEDGERADDR");
    assert_eq!(node["latest_block_height"], 4242);

    let all = get_json(&http, &format!("{base}/nodes/all")).await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn smoke_fill_seeds_mockup_data() {
    let data_dir = fresh_dir("fill");
    let port = free_port();
    let base = format!("http://127.0.0.1:{port}");
    let _guard = start_node(data_dir, port, &["--fill", "1", "--datafeeds", "20"]);

    let http = reqwest::Client::new();
    assert!(wait_for_api(&http, &base, Duration::from_secs(20)).await);

    let stats = wait_for(
        &http,
        &format!("{base}/stats/common"),
        Duration::from_secs(30),
        |body| body["datafeeds_count"] == 20,
    )
    .await;
    assert_eq!(stats["datafeeds_count"], 20);
    assert!(stats["nodes_count"].as_i64().unwrap() > 0);

    let feeds = get_json(&http, &format!("{base}/datafeeds/all")).await;
    assert_eq!(feeds.as_array().unwrap().len(), 20);
}
