use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use gravity_core::error::GravityError;
use gravity_core::model::Node;
use gravity_ledger::LedgerClient;
use gravity_store::StoreDb;

/// Pull the local validator's status and details from the ledger and
/// reconcile them into the `nodes` table.
///
/// Both fetches happen before any write, so a transport or decode failure
/// leaves the store untouched. Views are refreshed after a successful upsert.
pub async fn reconcile_once(ledger: &LedgerClient, db: &StoreDb) -> Result<Node, GravityError> {
    let status = ledger.fetch_validator_status().await?;
    let details = ledger.fetch_validator_details().await?;

    let public_key = status.public_key().to_string();
    if public_key.is_empty() {
        return Err(GravityError::Decode("validator status has an empty public key".into()));
    }

    let node = db.upsert_node(&public_key, &details, &status).await?;
    let views = db.refresh_materialized_views().await;
    debug!(public_key = %node.public_key, views, "validator reconciled");
    Ok(node)
}

/// Reconcile every `interval`, forever. A failed round is logged and the
/// next tick tries again from scratch.
pub async fn run(ledger: LedgerClient, db: Arc<StoreDb>, interval: Duration) {
    info!(endpoint = %ledger.endpoint(), ?interval, "ledger sync started");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match reconcile_once(&ledger, &db).await {
            Ok(node) => info!(
                public_key = %node.public_key,
                height = node.latest_block_height,
                "ledger sync round complete"
            ),
            Err(e) => warn!(error = %e, "ledger sync round failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    fn status_body(public_key: &str, height: u64) -> String {
        format!(
            r#"{{"jsonrpc":"2.0","id":-1,"result":{{
                "sync_info":{{"latest_block_height":"{height}","catching_up":false}},
                "validator_info":{{"address":"ADDR","pub_key":{{"type":"tendermint/PubKeyEd25519","value":"{public_key}"}},"voting_power":"7"}}}}}}"#
        )
    }

    fn details_body(payload: &str) -> String {
        format!(
            r#"{{"jsonrpc":"2.0","id":-1,"result":{{"response":{{"code":0,"value":"{}"}}}}}}"#,
            BASE64.encode(payload)
        )
    }

    async fn ledger(status: String, details: String) -> LedgerClient {
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
        LedgerClient::new(&format!("http://{addr}"))
    }

    #[tokio::test]
    async fn reconcile_writes_node_and_views() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let ledger = ledger(
            status_body("pk1", 55),
            details_body(r#"{"name":"alpha","description":"first"}"#),
        )
        .await;

        let node = reconcile_once(&ledger, &db).await.unwrap();
        assert_eq!(node.public_key, "pk1");
        assert_eq!(node.name, "alpha");
        assert_eq!(node.latest_block_height, 55);
        assert_eq!(db.view_row_count("nodes").await.unwrap(), 1);

        // second round is an update, not a second row
        reconcile_once(&ledger, &db).await.unwrap();
        assert_eq!(db.list_nodes().await.len(), 1);
    }

    #[tokio::test]
    async fn bad_details_payload_persists_nothing() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let ledger = ledger(status_body("pk1", 1), details_body("{\"name\": [")).await;

        let err = reconcile_once(&ledger, &db).await.unwrap_err();
        assert!(matches!(err, GravityError::Decode(_)));
        assert!(db.list_nodes().await.is_empty());
    }

    #[tokio::test]
    async fn empty_public_key_is_rejected() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let ledger = ledger(status_body("", 1), details_body(r#"{"name":"x"}"#)).await;

        assert!(matches!(
            reconcile_once(&ledger, &db).await,
            Err(GravityError::Decode(_))
        ));
        assert!(db.list_nodes().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_ledger_is_transport_error() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let addr = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap()
        };
        let ledger = LedgerClient::new(&format!("http://{addr}"));

        assert!(matches!(
            reconcile_once(&ledger, &db).await,
            Err(GravityError::Transport(_))
        ));
    }
}
