use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use gravity_core::error::GravityError;
use gravity_core::validator::{ValidatorDetails, ValidatorStatus};

/// JSON-RPC envelope the ledger wraps every response in.
#[derive(Debug, Deserialize)]
pub struct RpcEnvelope<T> {
    pub result: T,
}

/// `result` of an `abci_query` call.
#[derive(Debug, Deserialize)]
pub struct AbciQueryResult {
    pub response: AbciResponse,
}

#[derive(Debug, Deserialize)]
pub struct AbciResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    /// Base64 of the stored value; null when the key is unset.
    #[serde(default)]
    pub value: Option<String>,
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T, GravityError> {
    serde_json::from_slice(bytes).map_err(|e| GravityError::Decode(format!("{what}: {e}")))
}

/// Decode a `/status` body.
pub fn decode_status(body: &[u8]) -> Result<ValidatorStatus, GravityError> {
    let envelope: RpcEnvelope<ValidatorStatus> = decode_json(body, "status envelope")?;
    Ok(envelope.result)
}

/// Decode an `abci_query?path="validatorDetails"` body: envelope first, then
/// the base64 payload, then the JSON document inside it.
pub fn decode_validator_details(body: &[u8]) -> Result<ValidatorDetails, GravityError> {
    let envelope: RpcEnvelope<AbciQueryResult> = decode_json(body, "abci_query envelope")?;
    let response = envelope.result.response;

    if response.code != 0 {
        return Err(GravityError::Decode(format!(
            "abci_query returned code {}: {}",
            response.code, response.log
        )));
    }

    let encoded = response
        .value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GravityError::Decode("abci_query response has no value".into()))?;

    let raw = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| GravityError::Decode(format!("validator details base64: {e}")))?;

    decode_json(&raw, "validator details payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abci_body(value: &str) -> String {
        format!(
            r#"{{"jsonrpc":"2.0","id":-1,"result":{{"response":{{"code":0,"log":"","value":"{value}","height":"12"}}}}}}"#
        )
    }

    #[test]
    fn status_envelope_unwrapped() {
        let body = r#"{"jsonrpc":"2.0","id":-1,"result":{
            "sync_info":{"latest_block_height":"9","catching_up":false},
            "validator_info":{"address":"A1","pub_key":{"type":"tendermint/PubKeyEd25519","value":"pk1"},"voting_power":"3"}}}"#;
        let status = decode_status(body.as_bytes()).unwrap();
        assert_eq!(status.public_key(), "pk1");
        assert_eq!(status.sync_info.height(), 9);
    }

    #[test]
    fn status_without_envelope_is_decode_error() {
        let body = r#"{"validator_info":{"pub_key":{"value":"pk1"}}}"#;
        assert!(matches!(decode_status(body.as_bytes()), Err(GravityError::Decode(_))));
    }

    #[test]
    fn details_decoded_through_both_layers() {
        let inner = r#"{"name":"alpha","description":"d","joined_at":1600000000}"#;
        let body = abci_body(&BASE64.encode(inner));
        let details = decode_validator_details(body.as_bytes()).unwrap();
        assert_eq!(details.name, "alpha");
        assert_eq!(details.joined_at, 1_600_000_000);
    }

    #[test]
    fn malformed_inner_payload_is_decode_error() {
        let body = abci_body(&BASE64.encode("{not json"));
        let err = decode_validator_details(body.as_bytes()).unwrap_err();
        assert!(matches!(err, GravityError::Decode(ref m) if m.contains("payload")));
    }

    #[test]
    fn invalid_base64_is_decode_error() {
        let body = abci_body("***");
        assert!(matches!(
            decode_validator_details(body.as_bytes()),
            Err(GravityError::Decode(_))
        ));
    }

    #[test]
    fn missing_value_is_decode_error() {
        let body = r#"{"result":{"response":{"code":0,"value":null}}}"#;
        assert!(matches!(
            decode_validator_details(body.as_bytes()),
            Err(GravityError::Decode(_))
        ));
    }

    #[test]
    fn non_zero_code_is_decode_error() {
        let body = r#"{"result":{"response":{"code":1,"log":"unknown path"}}}"#;
        let err = decode_validator_details(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unknown path"));
    }
}
