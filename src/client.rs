//! HTTP JSON-RPC orchestration (component E): talks to a single chain
//! endpoint, assembles and signs transactions, and submits them.

use std::time::Duration;

use serde_json::{json, Value as Json};
use tracing::{debug, info, instrument};

use crate::abi::{Abi, AbiProvider};
use crate::error::{Error, Result};
use crate::hashing::sha256;
use crate::keys::Keychain;
use crate::signer;
use crate::transaction::{Action, PermissionLevel, Transaction, TransactionHeader};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EXPIRATION_SECS: i64 = 30;

/// Response shape of `/v1/chain/get_info`, restricted to the fields
/// spec.md §3 names: the TaPoS header (§4.5) is built from the chain's
/// last-irreversible block, not its head block.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChainInfo {
    pub chain_id: String,
    pub last_irreversible_block_num: u64,
    pub last_irreversible_block_id: String,
    pub last_irreversible_block_time: String,
}

/// A signed transaction ready for `push_transaction`, and the result of
/// submitting it.
#[derive(Debug, Clone)]
pub struct PushTransactionResult {
    pub transaction_id: String,
    pub raw_response: Json,
}

/// One authorization entry for [`Client::push_transaction`].
#[derive(Debug, Clone)]
pub struct Authorization {
    pub actor: String,
    pub permission: String,
}

/// A connection to a single Antelope chain HTTP endpoint.
///
/// Holds an owned [`Keychain`] so callers can `add_key` once and issue
/// many transactions; nothing else is cached, including ABIs (spec.md §5:
/// fetched fresh on every `push_transaction`).
pub struct Client {
    endpoint: String,
    http: reqwest::blocking::Client,
    keychain: Keychain,
}

impl Client {
    /// Connects to `endpoint`, stripping a trailing slash if present.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// As [`Client::new`], with an explicit request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        let endpoint = endpoint.strip_suffix('/').map(str::to_string).unwrap_or(endpoint);
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::TransportError)?;
        Ok(Self { endpoint, http, keychain: Keychain::new() })
    }

    /// Adds a signing key for `actor@permission`.
    pub fn add_key(&self, authorization: &str, wif: &str) -> Result<()> {
        self.keychain.add_key(authorization, wif)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    #[instrument(skip(self))]
    fn post(&self, path: &str, body: &Json) -> Result<Json> {
        let response = self.http.post(self.url(path)).json(body).send()?;
        let value: Json = response.json()?;
        if value.get("error").is_some() {
            return Err(Error::RpcError(value));
        }
        Ok(value)
    }

    /// `/v1/chain/get_info`.
    #[instrument(skip(self))]
    pub fn get_info(&self) -> Result<ChainInfo> {
        let value = self.post("/v1/chain/get_info", &json!({}))?;
        Ok(serde_json::from_value(value)?)
    }

    /// `/v1/chain/get_abi` for `account`.
    #[instrument(skip(self))]
    pub fn get_abi(&self, account: &str) -> Result<Abi> {
        let value = self.post("/v1/chain/get_abi", &json!({ "account_name": account }))?;
        Ok(serde_json::from_value(value)?)
    }

    /// `/v1/chain/get_table_rows`.
    #[instrument(skip(self, extra))]
    pub fn get_table_rows(
        &self,
        account: &str,
        table: &str,
        scope: &str,
        extra: Json,
    ) -> Result<Json> {
        let mut body = json!({
            "code": account,
            "table": table,
            "scope": scope,
            "json": true,
        });
        if let (Json::Object(base), Json::Object(overrides)) = (&mut body, extra) {
            base.extend(overrides);
        }
        self.post("/v1/chain/get_table_rows", &body)
    }

    /// Builds, signs, and submits a transaction carrying one action.
    ///
    /// Follows spec.md §4.5: fetch chain info, derive `ref_block_num`/
    /// `ref_block_prefix` from the last-irreversible block, set `expiration`
    /// to `expiration_secs` seconds past `last_irreversible_block_time`,
    /// pack the transaction, sign its digest, and POST the envelope to
    /// `/v1/chain/push_transaction`.
    #[instrument(skip(self, data, authorization))]
    pub fn push_transaction(
        &self,
        account: &str,
        action: &str,
        data: Json,
        authorization: Vec<Authorization>,
        expiration_secs: Option<i64>,
    ) -> Result<PushTransactionResult> {
        let info = self.get_info()?;
        info!(
            last_irreversible_block_num = info.last_irreversible_block_num,
            "fetched chain info"
        );

        // TaPoS fields are derived from the last-irreversible block, not the
        // head block, per spec.md §4.5.
        let ref_block_num = (info.last_irreversible_block_num & 0xffff) as u16;
        let ref_block_prefix = ref_block_prefix_from_id(&info.last_irreversible_block_id)?;

        let lib_time = parse_iso8601_utc(&info.last_irreversible_block_time)?;
        let expiration = lib_time + chrono::Duration::seconds(expiration_secs.unwrap_or(DEFAULT_EXPIRATION_SECS));
        let expiration = expiration.format("%Y-%m-%dT%H:%M:%S").to_string();

        let tx = Transaction {
            header: TransactionHeader {
                expiration,
                ref_block_num,
                ref_block_prefix,
                max_net_usage_words: 0,
                max_cpu_usage_ms: 0,
                delay_sec: 0,
            },
            actions: vec![Action {
                account: account.to_string(),
                name: action.to_string(),
                authorization: authorization
                    .iter()
                    .map(|a| PermissionLevel { actor: a.actor.clone(), permission: a.permission.clone() })
                    .collect(),
                data,
            }],
        };

        let packed = tx.pack(self)?;
        debug!(packed_len = packed.len(), "packed transaction");

        // digest = sha256(chain_id || packed_trx || context_free_data_digest);
        // context_free_data_digest is 32 zero bytes since no context-free
        // actions are ever emitted.
        let mut digest_input = hex::decode(&info.chain_id)?;
        digest_input.extend_from_slice(&packed);
        digest_input.extend_from_slice(&[0u8; 32]);
        let digest = sha256(&digest_input);

        let mut signatures = Vec::new();
        for auth in &authorization {
            let authorization_key = format!("{}@{}", auth.actor, auth.permission);
            let private_key = self.keychain.private_key(&authorization_key)?;
            let signature = signer::sign(&digest, private_key.secret_bytes())?;
            signatures.push(signature.to_sig_k1_string());
        }

        let envelope = json!({
            "signatures": signatures,
            "compression": "none",
            "packed_context_free_data": "",
            "packed_trx": hex::encode(&packed),
        });

        let response = self.post("/v1/chain/push_transaction", &envelope)?;
        let transaction_id = response
            .get("transaction_id")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(PushTransactionResult { transaction_id, raw_response: response })
    }
}

impl AbiProvider for Client {
    fn abi_for(&self, account: &str) -> Result<Abi> {
        self.get_abi(account)
    }
}

/// `ref_block_prefix` is the little-endian `u32` word at byte offset 8 of
/// the block id, per spec.md §4.5.
fn ref_block_prefix_from_id(block_id: &str) -> Result<u32> {
    let bytes = hex::decode(block_id)?;
    let word: [u8; 4] = bytes
        .get(8..12)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::UnsupportedType("block id too short".to_string()))?;
    Ok(u32::from_le_bytes(word))
}

/// Parses a node's ISO-8601 UTC timestamp, accepting both the fractional-
/// seconds form nodes commonly emit (`"...T00:00:00.500"`) and a bare
/// whole-seconds form.
fn parse_iso8601_utc(s: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&chrono::Utc));
    }
    let naive = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| Error::InvalidTimestamp(s.to_string()))?;
    Ok(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash_from_endpoint() {
        let client = Client::new("http://localhost:8888/").unwrap();
        assert_eq!(client.url("/v1/chain/get_info"), "http://localhost:8888/v1/chain/get_info");
    }

    #[test]
    fn derives_ref_block_prefix_from_block_id() {
        let id = "000000010000000000112233aabbccddeeff0011223344556677889900aabbcc";
        let prefix = ref_block_prefix_from_id(id).unwrap();
        assert_eq!(prefix, u32::from_le_bytes([0x00, 0x11, 0x22, 0x33]));
    }
}
