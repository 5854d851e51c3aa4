use std::time::Duration;

use tracing::debug;

use gravity_core::constants::{LEDGER_STATUS_PATH, LEDGER_VALIDATOR_DETAILS_PATH};
use gravity_core::error::GravityError;
use gravity_core::validator::{ValidatorDetails, ValidatorStatus};

use crate::envelope::{decode_status, decode_validator_details};

/// Configuration for the ledger client.
#[derive(Debug, Clone, Default)]
pub struct LedgerConfig {
    /// Base URL of the ledger node RPC (e.g. "http://127.0.0.1:26657").
    pub endpoint: String,
    /// Per-request timeout. `None` waits on the ledger indefinitely.
    pub timeout: Option<Duration>,
}

/// HTTP client for a ledger node.
///
/// Every call is a single GET with no retry; callers decide what to do with
/// a failure.
pub struct LedgerClient {
    endpoint: String,
    client: reqwest::Client,
}

impl LedgerClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self, GravityError> {
        if config.endpoint.is_empty() {
            return Err(GravityError::Config("ledger endpoint is empty".into()));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GravityError::Config(format!("building ledger client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET `{endpoint}/{path}` and return the raw body.
    async fn get(&self, path: &str) -> Result<Vec<u8>, GravityError> {
        let url = format!("{}/{}", self.endpoint, path);
        debug!(%url, "ledger request");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GravityError::Transport(format!("GET {url}: {e}")))?;

        let body = resp
            .bytes()
            .await
            .map_err(|e| GravityError::Transport(format!("reading body of {url}: {e}")))?;
        Ok(body.to_vec())
    }

    /// Fetch the validator status snapshot.
    pub async fn fetch_validator_status(&self) -> Result<ValidatorStatus, GravityError> {
        let body = self.get(LEDGER_STATUS_PATH).await?;
        decode_status(&body)
    }

    /// Fetch the validator details document.
    pub async fn fetch_validator_details(&self) -> Result<ValidatorDetails, GravityError> {
        let body = self.get(LEDGER_VALIDATOR_DETAILS_PATH).await?;
        decode_validator_details(&body)
    }
}
